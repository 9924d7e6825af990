//! Actor features app
//!
//! HTTP app that hosts a test actor type behind an actor-runtime sidecar and
//! drives verification calls back into that sidecar.

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![forbid(clippy::panic)]
#![deny(clippy::expect_used)]

pub mod client;
pub mod config;
pub mod error;
pub mod invocation;
pub mod middleware;
pub mod routes;
pub mod sequencer;
pub mod server;
pub mod state;

pub use client::{ClientConfig, ClientError, RuntimeClient};
pub use config::{ActorTypeConfig, ConfigProvider, HarnessConfig};
pub use error::{AppError, ErrorResponse};
pub use invocation::{
    ActivationCall, ActorInvocation, ActorInvocationHandler, ActorResponseEnvelope, MethodKind,
    MethodResponse,
};
pub use routes::create_router;
pub use routes::test_driver::TimerReminderRequest;
pub use sequencer::{SequencerError, StateTestSequencer, StateTestStep, TransactionalOperation};
pub use server::{run_server, serve};
pub use state::AppState;

/// App server errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Sidecar client could not be created
    #[error("Client error: {0}")]
    Client(#[from] ClientError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The test driver asked the app to crash
    #[error("simulating fatal shutdown")]
    FatalShutdown,
}

impl From<std::convert::Infallible> for Error {
    fn from(value: std::convert::Infallible) -> Self {
        match value {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Method, StatusCode},
    };
    use http_body_util::BodyExt;
    use std::time::Duration;
    use tower::ServiceExt;

    type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

    async fn test_router() -> Result<axum::Router, Error> {
        // No sidecar is listening; these routes never call it.
        let config = HarnessConfig::default()
            .sidecar_base_url("http://127.0.0.1:9/v1.0")
            .default_actor_type("routeractor")
            .work_delay(Duration::ZERO);
        Ok(create_router(AppState::new(config).await?))
    }

    fn build_test_request(
        uri: &str,
        method: Method,
        headers: Vec<(&str, &str)>,
    ) -> Result<axum::http::Request<Body>, axum::http::Error> {
        let mut builder = axum::http::Request::builder().method(method).uri(uri);
        for (key, value) in headers {
            builder = builder.header(key, value);
        }
        builder.body(Body::empty())
    }

    #[tokio::test]
    async fn test_index_and_healthz_return_empty_ok() -> TestResult {
        for uri in ["/", "/healthz"] {
            let router = test_router().await?;
            let response = router
                .oneshot(build_test_request(uri, Method::GET, Vec::new())?)
                .await?;
            assert_eq!(response.status(), StatusCode::OK);
            let body = response.into_body().collect().await?.to_bytes();
            assert!(body.is_empty());
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_cors_headers_present() -> TestResult {
        let router = test_router().await?;
        let request = build_test_request(
            "/healthz",
            Method::OPTIONS,
            vec![
                ("Origin", "http://driver.local"),
                ("Access-Control-Request-Method", "GET"),
            ],
        )?;

        let response = router.oneshot(request).await?;

        assert!(
            response
                .headers()
                .contains_key("access-control-allow-origin"),
            "CORS origin header should be present"
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_router_not_found() -> TestResult {
        let router = test_router().await?;
        let response = router
            .oneshot(build_test_request("/nonexistent", Method::GET, Vec::new())?)
            .await?;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        Ok(())
    }

    #[tokio::test]
    async fn test_actor_method_requires_put() -> TestResult {
        let router = test_router().await?;
        let response = router
            .oneshot(build_test_request(
                "/actors/routeractor/1/method/work",
                Method::GET,
                Vec::new(),
            )?)
            .await?;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        Ok(())
    }

    #[tokio::test]
    async fn test_method_call_returns_envelope() -> TestResult {
        let router = test_router().await?;
        let response = router
            .oneshot(build_test_request(
                "/actors/routeractor/9/method/work",
                Method::PUT,
                Vec::new(),
            )?)
            .await?;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await?.to_bytes();
        let envelope: ActorResponseEnvelope = serde_json::from_slice(&body)?;
        let payload: MethodResponse = serde_json::from_slice(&envelope.data)?;
        assert_eq!(payload.actor_type, "routeractor");
        assert_eq!(payload.actor_id, "9");
        assert_eq!(payload.method, "work");
        Ok(())
    }

    #[test]
    fn test_error_display() {
        let err: Error = std::io::Error::new(std::io::ErrorKind::AddrInUse, "in use").into();
        assert_eq!(err.to_string(), "IO error: in use");
        assert_eq!(Error::FatalShutdown.to_string(), "simulating fatal shutdown");
    }
}
