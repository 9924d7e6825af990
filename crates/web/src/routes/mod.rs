//! HTTP routes
//!
//! ## Route Structure
//!
//! Sidecar-facing:
//! - `GET /` and `GET /healthz` - liveness
//! - `GET /dapr/config` - actor type registration descriptor
//! - `PUT /actors/{actorType}/{id}/method/{method}` - actor method call
//! - `PUT /actors/{actorType}/{id}/method/{marker}/{method}` - timer or reminder delivery
//! - `POST|DELETE /actors/{actorType}/{id}` - activation bookkeeping / deactivation
//!
//! Test-driver-facing:
//! - `GET|POST|DELETE|PATCH /test/{actorType}/{id}/{callType}/{method}` - actor client proxy
//! - `GET|DELETE /test/logs` - journal snapshot / reset
//! - `GET /test/metadata` - sidecar metadata proxy
//! - `POST /test/shutdown`, `POST /test/shutdownsidecar` - sidecar shutdown proxy
//! - `GET|POST /test/env/{envName}` - environment overrides

use axum::{
    Router,
    routing::{get, post, put},
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::middleware::{cors_layer, request_id_middleware};
use crate::state::AppState;

pub mod actors;
pub mod health;
pub mod test_driver;

/// Create the app router with middleware.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::index))
        .route("/healthz", get(health::healthz))
        .route("/dapr/config", get(health::actor_config))
        .route(
            "/actors/{actor_type}/{id}/method/{method}",
            put(actors::invoke_method),
        )
        .route(
            "/actors/{actor_type}/{id}/method/{marker}/{method}",
            put(actors::invoke_callback),
        )
        .route(
            "/actors/{actor_type}/{id}",
            post(actors::activate).delete(actors::deactivate),
        )
        .route(
            "/test/{actor_type}/{id}/{call_type}/{method}",
            get(test_driver::call_actor)
                .post(test_driver::call_actor)
                .delete(test_driver::call_actor)
                .patch(test_driver::call_actor),
        )
        .route(
            "/test/logs",
            get(test_driver::get_logs).delete(test_driver::reset_logs),
        )
        .route("/test/metadata", get(test_driver::metadata))
        .route(
            "/test/env/{env_name}",
            get(test_driver::get_env).post(test_driver::set_env),
        )
        .route("/test/shutdown", post(test_driver::shutdown))
        .route("/test/shutdownsidecar", post(test_driver::shutdown_sidecar))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(axum::middleware::from_fn(request_id_middleware))
                .layer(cors_layer()),
        )
}
