//! Endpoints an external test driver uses to steer and inspect the app.

use actorfeatures_core::{ActorKey, LogEntry};
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{Method, StatusCode, header},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::error::{AppError, Result};
use crate::invocation::ActorResponseEnvelope;
use crate::state::AppState;

/// Body of timer and reminder management calls.
///
/// Every field is optional and omitted from the wire when empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerReminderRequest {
    #[serde(rename = "oldName", default, skip_serializing_if = "String::is_empty")]
    pub old_name: String,
    #[serde(rename = "actorType", default, skip_serializing_if = "String::is_empty")]
    pub actor_type: String,
    #[serde(rename = "actorID", default, skip_serializing_if = "String::is_empty")]
    pub actor_id: String,
    #[serde(rename = "newName", default, skip_serializing_if = "String::is_empty")]
    pub new_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub data: String,
    #[serde(rename = "dueTime", default, skip_serializing_if = "String::is_empty")]
    pub due_time: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub period: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ttl: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub callback: String,
}

/// Kind of actor call being proxied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallType {
    Method,
    Timers,
    Reminders,
    /// Forwarded as-is with method semantics.
    Other,
}

impl CallType {
    #[must_use]
    pub fn parse(call_type: &str) -> Self {
        match call_type {
            "method" => Self::Method,
            "timers" => Self::Timers,
            "reminders" => Self::Reminders,
            _ => Self::Other,
        }
    }

    /// Status the sidecar must answer with for `verb`.
    #[must_use]
    pub fn expected_status(self, verb: &Method) -> StatusCode {
        match self {
            Self::Timers | Self::Reminders if *verb != Method::GET => StatusCode::NO_CONTENT,
            _ => StatusCode::OK,
        }
    }

    /// Timer and reminder calls carry a [`TimerReminderRequest`].
    #[must_use]
    pub const fn carries_request(self) -> bool {
        matches!(self, Self::Timers | Self::Reminders)
    }
}

/// GET|POST|DELETE|PATCH /test/{actorType}/{id}/{callType}/{method}
///
/// Forwards the call to the sidecar and relays the envelope's raw `data`.
pub async fn call_actor(
    State(state): State<AppState>,
    verb: Method,
    Path((actor_type, id, call_type, method)): Path<(String, String, String, String)>,
    body: Bytes,
) -> Result<Response> {
    info!(%verb, %actor_type, %id, %call_type, %method, "Proxying actor call");

    let kind = CallType::parse(&call_type);
    let request = if kind.carries_request() {
        serde_json::from_slice::<TimerReminderRequest>(&body).unwrap_or_else(|e| {
            if !body.is_empty() {
                warn!(error = %e, "Ignoring unparsable timer/reminder request");
            }
            TimerReminderRequest::default()
        })
    } else {
        TimerReminderRequest::default()
    };

    let url = state
        .client
        .actor_method_url(&ActorKey::new(actor_type, id), &call_type, &method);
    let response = state
        .client
        .call(verb.clone(), &url, Some(&request), kind.expected_status(&verb))
        .await?;

    if response.is_empty() {
        return Ok(StatusCode::OK.into_response());
    }

    let envelope: ActorResponseEnvelope = serde_json::from_slice(&response).map_err(|e| {
        AppError::Internal(format!("could not parse actor's test response: {e}"))
    })?;
    Ok(envelope.data.into_response())
}

/// GET /test/logs - journal snapshot
pub async fn get_logs(State(state): State<AppState>) -> Json<Vec<LogEntry>> {
    Json(state.journal.snapshot().await)
}

/// DELETE /test/logs - clear the journal
pub async fn reset_logs(State(state): State<AppState>) -> Json<Vec<LogEntry>> {
    state.journal.reset().await;
    info!("Journal reset");
    Json(state.journal.snapshot().await)
}

/// GET /test/metadata - relay the sidecar's metadata document
pub async fn metadata(State(state): State<AppState>) -> Result<Bytes> {
    let body = state
        .client
        .send(Method::GET, &state.client.metadata_url(), StatusCode::OK)
        .await?;
    Ok(body)
}

/// POST /test/shutdown - stop the sidecar, then crash this process
pub async fn shutdown(State(state): State<AppState>) -> Result<StatusCode> {
    shutdown_sidecar_inner(&state).await?;

    let delay = state.config.fatal_exit_delay;
    let fatal = state.fatal.clone();
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        error!("Simulating fatal shutdown");
        fatal.notify_one();
    });

    Ok(StatusCode::OK)
}

/// POST /test/shutdownsidecar - stop the sidecar only
pub async fn shutdown_sidecar(State(state): State<AppState>) -> Result<StatusCode> {
    shutdown_sidecar_inner(&state).await?;
    Ok(StatusCode::OK)
}

async fn shutdown_sidecar_inner(state: &AppState) -> Result<()> {
    info!("Shutting down sidecar");
    state
        .client
        .send(
            Method::POST,
            &state.client.shutdown_url(),
            StatusCode::NO_CONTENT,
        )
        .await?;
    Ok(())
}

/// GET /test/env/{envName} - override or real environment value
pub async fn get_env(
    State(state): State<AppState>,
    Path(env_name): Path<String>,
) -> impl IntoResponse {
    let value = state.env.get(&env_name).await;
    ([(header::CONTENT_TYPE, "text/plain")], value)
}

/// POST /test/env/{envName} - store the body as an override
pub async fn set_env(
    State(state): State<AppState>,
    Path(env_name): Path<String>,
    body: String,
) -> StatusCode {
    state.env.set(env_name, body).await;
    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_status_per_call_type() {
        assert_eq!(
            CallType::parse("method").expected_status(&Method::POST),
            StatusCode::OK
        );
        assert_eq!(
            CallType::parse("timers").expected_status(&Method::GET),
            StatusCode::OK
        );
        assert_eq!(
            CallType::parse("reminders").expected_status(&Method::DELETE),
            StatusCode::NO_CONTENT
        );
        assert_eq!(
            CallType::parse("timers").expected_status(&Method::PATCH),
            StatusCode::NO_CONTENT
        );
        assert_eq!(CallType::parse("bogus"), CallType::Other);
    }

    #[test]
    fn test_timer_request_omits_empty_fields() -> std::result::Result<(), serde_json::Error> {
        assert_eq!(serde_json::to_string(&TimerReminderRequest::default())?, "{}");

        let request: TimerReminderRequest = serde_json::from_str(
            r#"{"oldName":"a","newName":"b","actorID":"1","dueTime":"1s","period":"R3/PT1S"}"#,
        )?;
        let json = serde_json::to_value(&request)?;
        assert_eq!(
            json,
            serde_json::json!({
                "oldName": "a",
                "newName": "b",
                "actorID": "1",
                "dueTime": "1s",
                "period": "R3/PT1S"
            })
        );
        Ok(())
    }
}
