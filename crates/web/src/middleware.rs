//! Middleware helpers for the actor features app.
//!
//! This module provides middleware for:
//! - CORS handling
//! - Request ids and request timing logs
//! - Logging of error responses

use axum::{
    extract::Request,
    http::{Method, StatusCode, Uri},
    middleware::Next,
    response::Response,
};
use std::time::{Duration, Instant};
use tower_http::cors::{Any, CorsLayer};
use tracing::{Instrument, error, info, info_span, warn};

/// Query parameter a test driver may use to correlate its calls.
pub const REQUEST_ID_PARAM: &str = "reqid";
/// Prefix of request ids generated by this server.
pub const GENERATED_ID_PREFIX: &str = "s-";

/// CORS middleware layer
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Request id attached to request extensions by [`request_id_middleware`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestId(pub String);

impl RequestId {
    /// The `reqid` query parameter, or a fresh `s-<uuid>` id.
    #[must_use]
    pub fn from_uri(uri: &Uri) -> Self {
        let supplied = uri.query().and_then(|query| {
            url::form_urlencoded::parse(query.as_bytes())
                .find(|(name, value)| name == REQUEST_ID_PARAM && !value.is_empty())
                .map(|(_, value)| value.into_owned())
        });

        Self(supplied.unwrap_or_else(|| format!("{GENERATED_ID_PREFIX}{}", uuid::Uuid::new_v4())))
    }
}

/// Request context captured before the request moves into the next handler.
#[derive(Clone, Debug)]
struct RequestContext {
    method: Method,
    uri: Uri,
    request_id: RequestId,
    start: Instant,
}

impl RequestContext {
    fn from_request(req: &Request) -> Self {
        Self {
            method: req.method().clone(),
            uri: req.uri().clone(),
            request_id: RequestId::from_uri(req.uri()),
            start: Instant::now(),
        }
    }

    fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    fn log_completion(&self, status: StatusCode) {
        let duration_ms = self.elapsed().as_millis();
        if status.is_server_error() {
            error!(
                method = %self.method,
                path = %self.uri.path(),
                status = status.as_u16(),
                duration_ms,
                "Request failed"
            );
        } else if status.is_client_error() {
            warn!(
                method = %self.method,
                path = %self.uri.path(),
                status = status.as_u16(),
                duration_ms,
                "Request rejected"
            );
        } else {
            info!(status = status.as_u16(), duration_ms, "Request completed");
        }
    }
}

/// Tags each request with a request id and logs its arrival and duration.
pub async fn request_id_middleware(mut req: Request, next: Next) -> Response {
    let ctx = RequestContext::from_request(&req);
    req.extensions_mut().insert(ctx.request_id.clone());

    let span = info_span!("request", request_id = %ctx.request_id.0);
    async move {
        info!(method = %ctx.method, path = %ctx.uri.path(), "Received request");
        let response = next.run(req).await;
        ctx.log_completion(response.status());
        response
    }
    .instrument(span)
    .await
}
