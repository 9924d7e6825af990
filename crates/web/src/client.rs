//! HTTP client for calls back into the actor runtime sidecar.
//!
//! Every call names the status it expects. Anything else is surfaced
//! immediately as an error; there are no retries, the caller decides how
//! to fail.

use std::time::Duration;

use actorfeatures_core::ActorKey;
use axum::body::Bytes;
use reqwest::{Method, StatusCode, header};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

/// Default timeout for establishing the connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Default timeout for the whole request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeouts applied to every sidecar call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientConfig {
    /// Bounds the TCP dial. reqwest runs the TLS handshake inside the same
    /// connect phase, so the handshake is bounded by it too.
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Errors from a sidecar call.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The configured sidecar base URL cannot be used.
    #[error("invalid sidecar URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    /// The request body could not be encoded as JSON.
    #[error("failed to encode request body: {0}")]
    Serialize(#[from] serde_json::Error),

    /// DNS, connect, timeout or body read failure.
    #[error("{method} {url} failed: {source}")]
    Transport {
        method: Method,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The sidecar answered with an unexpected status.
    #[error("Expected http status {expected}, received {actual}{}", payload_suffix(.body))]
    StatusMismatch {
        expected: u16,
        actual: u16,
        body: Option<String>,
    },
}

#[allow(clippy::ref_option)]
fn payload_suffix(body: &Option<String>) -> String {
    body.as_deref()
        .map(|b| format!(", payload ='{b}'"))
        .unwrap_or_default()
}

impl ClientError {
    /// The status the sidecar actually returned, when it returned one.
    #[must_use]
    pub const fn actual_status(&self) -> Option<u16> {
        match self {
            Self::StatusMismatch { actual, .. } => Some(*actual),
            _ => None,
        }
    }
}

/// Client bound to one sidecar's `/v1.0` API root.
#[derive(Debug, Clone)]
pub struct RuntimeClient {
    base_url: String,
    config: ClientConfig,
    http_client: reqwest::Client,
}

impl RuntimeClient {
    /// Create a client for the sidecar API rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not an absolute http(s) URL or the
    /// underlying client cannot be built.
    pub fn new(base_url: &str, config: ClientConfig) -> Result<Self, ClientError> {
        let parsed = Url::parse(base_url).map_err(|e| ClientError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::InvalidUrl {
                url: base_url.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        let http_client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .map_err(ClientError::Build)?;

        Ok(Self {
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
            config,
            http_client,
        })
    }

    /// The API root every URL helper builds on.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Timeouts this client was built with.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// `{base}/actors/{type}/{id}/{call_type}/{method}`
    #[must_use]
    pub fn actor_method_url(&self, actor: &ActorKey, call_type: &str, method: &str) -> String {
        format!(
            "{}/actors/{}/{}/{call_type}/{method}",
            self.base_url, actor.actor_type, actor.id
        )
    }

    /// `{base}/actors/{type}/{id}/state/`
    #[must_use]
    pub fn actor_state_url(&self, actor: &ActorKey) -> String {
        format!(
            "{}/actors/{}/{}/state/",
            self.base_url, actor.actor_type, actor.id
        )
    }

    /// `{base}/actors/{type}/{id}/state/{key}/`
    #[must_use]
    pub fn actor_state_key_url(&self, actor: &ActorKey, key: &str) -> String {
        format!(
            "{}/actors/{}/{}/state/{key}/",
            self.base_url, actor.actor_type, actor.id
        )
    }

    /// `{base}/metadata`
    #[must_use]
    pub fn metadata_url(&self) -> String {
        format!("{}/metadata", self.base_url)
    }

    /// `{base}/shutdown`
    #[must_use]
    pub fn shutdown_url(&self) -> String {
        format!("{}/shutdown", self.base_url)
    }

    /// Issue `method url` with an optional JSON body and require `expected`.
    ///
    /// Returns the raw response body, which may be empty.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Serialize`] if the body cannot be encoded
    /// - [`ClientError::Transport`] on DNS, connect, timeout or read failure
    /// - [`ClientError::StatusMismatch`] if the status differs from `expected`
    pub async fn call<B>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
        expected: StatusCode,
    ) -> Result<Bytes, ClientError>
    where
        B: Serialize + ?Sized,
    {
        let payload = body.map(serde_json::to_vec).transpose()?;

        debug!(
            method = %method,
            url,
            expected = expected.as_u16(),
            body_len = payload.as_ref().map_or(0, Vec::len),
            "Calling sidecar"
        );

        let transport = |source| ClientError::Transport {
            method: method.clone(),
            url: url.to_string(),
            source,
        };

        let mut request = self.http_client.request(method.clone(), url);
        if let Some(payload) = payload {
            request = request
                .header(header::CONTENT_TYPE, "application/json")
                .body(payload);
        }

        let response = request.send().await.map_err(transport)?;
        let status = response.status();

        if status != expected {
            let body = response.text().await.ok();
            warn!(
                method = %method,
                url,
                expected = expected.as_u16(),
                actual = status.as_u16(),
                "Unexpected sidecar status"
            );
            return Err(ClientError::StatusMismatch {
                expected: expected.as_u16(),
                actual: status.as_u16(),
                body,
            });
        }

        response.bytes().await.map_err(transport)
    }

    /// [`call`](Self::call) without a request body.
    ///
    /// # Errors
    ///
    /// Same as [`call`](Self::call).
    pub async fn send(
        &self,
        method: Method,
        url: &str,
        expected: StatusCode,
    ) -> Result<Bytes, ClientError> {
        self.call::<()>(method, url, None, expected).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header as header_matcher, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

    fn client_for(server: &MockServer) -> Result<RuntimeClient, ClientError> {
        RuntimeClient::new(&format!("{}/v1.0", server.uri()), ClientConfig::default())
    }

    #[test]
    fn test_rejects_relative_base_url() {
        let result = RuntimeClient::new("localhost:3500", ClientConfig::default());
        assert!(matches!(result, Err(ClientError::InvalidUrl { .. })));
    }

    #[test]
    fn test_url_helpers_follow_sidecar_layout() -> TestResult {
        let client = RuntimeClient::new("http://localhost:3500/v1.0/", ClientConfig::default())?;
        let actor = ActorKey::new("testactorfeatures", "42");

        assert_eq!(client.base_url(), "http://localhost:3500/v1.0");
        assert_eq!(
            client.actor_method_url(&actor, "method", "hello"),
            "http://localhost:3500/v1.0/actors/testactorfeatures/42/method/hello"
        );
        assert_eq!(
            client.actor_state_url(&actor),
            "http://localhost:3500/v1.0/actors/testactorfeatures/42/state/"
        );
        assert_eq!(
            client.actor_state_key_url(&actor, "key1"),
            "http://localhost:3500/v1.0/actors/testactorfeatures/42/state/key1/"
        );
        assert_eq!(client.metadata_url(), "http://localhost:3500/v1.0/metadata");
        assert_eq!(client.shutdown_url(), "http://localhost:3500/v1.0/shutdown");
        Ok(())
    }

    #[test]
    fn test_default_timeouts_bound_dial_at_five_seconds() -> TestResult {
        let client = RuntimeClient::new("http://localhost:3500/v1.0", ClientConfig::default())?;
        assert_eq!(client.config().connect_timeout, Duration::from_secs(5));
        assert_eq!(client.config().request_timeout, Duration::from_secs(30));
        Ok(())
    }

    #[tokio::test]
    async fn test_call_returns_body_on_expected_status() -> TestResult {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1.0/metadata"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"id\":\"app\"}"))
            .mount(&server)
            .await;

        let client = client_for(&server)?;
        let body = client
            .send(Method::GET, &client.metadata_url(), StatusCode::OK)
            .await?;

        assert_eq!(&body[..], b"{\"id\":\"app\"}");
        Ok(())
    }

    #[tokio::test]
    async fn test_call_sends_json_body() -> TestResult {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1.0/echo"))
            .and(header_matcher("content-type", "application/json"))
            .and(body_json(serde_json::json!({"key": "key1"})))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server)?;
        let url = format!("{}/echo", client.base_url());
        let body = client
            .call(
                Method::POST,
                &url,
                Some(&serde_json::json!({"key": "key1"})),
                StatusCode::CREATED,
            )
            .await?;

        assert!(body.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_status_mismatch_carries_statuses_and_payload() -> TestResult {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1.0/metadata"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = client_for(&server)?;
        let result = client
            .send(Method::GET, &client.metadata_url(), StatusCode::OK)
            .await;

        match result {
            Err(ClientError::StatusMismatch {
                expected,
                actual,
                body,
            }) => {
                assert_eq!(expected, 200);
                assert_eq!(actual, 500);
                assert_eq!(body.as_deref(), Some("boom"));
            }
            other => return Err(format!("expected status mismatch, got {other:?}").into()),
        }
        Ok(())
    }

    #[test]
    fn test_status_mismatch_display_includes_payload() {
        let err = ClientError::StatusMismatch {
            expected: 204,
            actual: 200,
            body: Some("data".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "Expected http status 204, received 200, payload ='data'"
        );
        assert_eq!(err.actual_status(), Some(200));
    }

    #[tokio::test]
    async fn test_transport_failure_has_no_status() -> TestResult {
        // Nothing listens on port 9 of localhost in test environments.
        let client = RuntimeClient::new("http://127.0.0.1:9/v1.0", ClientConfig::default())?;
        let result = client
            .send(Method::GET, &client.metadata_url(), StatusCode::OK)
            .await;

        match result {
            Err(err @ ClientError::Transport { .. }) => assert_eq!(err.actual_status(), None),
            other => return Err(format!("expected transport error, got {other:?}").into()),
        }
        Ok(())
    }
}
