//! Error handling with RFC 7807 Problem Details for JSON responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;

use crate::client::ClientError;
use crate::invocation::InvocationError;
use crate::sequencer::SequencerError;

pub type Result<T> = std::result::Result<T, AppError>;

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<actorfeatures_core::Error> for AppError {
    fn from(err: actorfeatures_core::Error) -> Self {
        if err.is_validation() {
            Self::BadRequest(err.to_string())
        } else {
            Self::Internal(err.to_string())
        }
    }
}

impl From<ClientError> for AppError {
    fn from(err: ClientError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<SequencerError> for AppError {
    fn from(err: SequencerError) -> Self {
        match err {
            SequencerError::UnexpectedOption(inner) => inner.into(),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<InvocationError> for AppError {
    fn from(err: InvocationError) -> Self {
        match err {
            InvocationError::StateTest(inner) => inner.into(),
            InvocationError::Encode(inner) => Self::Internal(inner.to_string()),
        }
    }
}

/// RFC 7807 Problem Details for HTTP APIs
#[derive(Serialize)]
pub struct ErrorResponse {
    #[serde(rename = "type")]
    problem_type: Option<String>,
    title: String,
    status: u16,
    detail: String,
}

impl ErrorResponse {
    pub fn new(status: StatusCode, title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            problem_type: None,
            title: title.into(),
            status: status.as_u16(),
            detail: detail.into(),
        }
    }

    pub fn from_error(err: &AppError) -> Self {
        let status = err.status_code();
        let title = status.canonical_reason().unwrap_or("Error");

        Self::new(status, title, err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = %self, "Request rejected");
        }
        let response = ErrorResponse::from_error(&self);
        (status, Json(response)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_map_to_bad_request() {
        let err: AppError = actorfeatures_core::Error::unknown_actor_type("a", "b").into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_content_mismatch_maps_to_internal() {
        let err: AppError = SequencerError::ContentMismatch {
            url: "http://sidecar/state/key4/".to_string(),
            length: 3,
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().contains("expected 0 length response"));
    }

    #[test]
    fn test_unknown_step_maps_to_bad_request() {
        let err: AppError = SequencerError::UnexpectedOption(
            actorfeatures_core::Error::unexpected_option("actor state test", "x"),
        )
        .into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_problem_details_shape() -> std::result::Result<(), serde_json::Error> {
        let body = ErrorResponse::from_error(&AppError::Internal("boom".to_string()));
        let json = serde_json::to_value(body)?;
        assert_eq!(json["status"], 500);
        assert_eq!(json["title"], "Internal Server Error");
        assert!(json["type"].is_null());
        Ok(())
    }
}
