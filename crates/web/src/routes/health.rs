//! Liveness and discovery endpoints: GET /, GET /healthz, GET /dapr/config

use axum::{extract::State, http::StatusCode, response::Json};
use tracing::info;

use crate::config::ActorTypeConfig;
use crate::state::AppState;

/// GET / - liveness placeholder
pub async fn index() -> StatusCode {
    StatusCode::OK
}

/// GET /healthz - health check
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// GET /dapr/config - actor types hosted by this app
pub async fn actor_config(State(state): State<AppState>) -> Json<ActorTypeConfig> {
    let descriptor = state.config_provider.descriptor().await;
    info!(entities = ?descriptor.entities, "Serving actor config");
    Json(descriptor)
}
