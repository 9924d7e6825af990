//! Sidecar-facing actor endpoints

use actorfeatures_core::ActorKey;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use tracing::info;

use crate::error::Result;
use crate::invocation::{ActivationCall, ActorInvocation, ActorResponseEnvelope};
use crate::state::AppState;

/// PUT /actors/{actorType}/{id}/method/{method} - direct method call
pub async fn invoke_method(
    State(state): State<AppState>,
    Path((actor_type, id, method)): Path<(String, String, String)>,
) -> Result<Json<ActorResponseEnvelope>> {
    info!(%actor_type, %id, %method, "Actor method call");
    let invocation = ActorInvocation::method(ActorKey::new(actor_type, id), method);
    Ok(Json(state.invocations.invoke(&invocation).await?))
}

/// PUT /actors/{actorType}/{id}/method/{marker}/{method} - timer or reminder
pub async fn invoke_callback(
    State(state): State<AppState>,
    Path((actor_type, id, marker, method)): Path<(String, String, String, String)>,
) -> Result<Json<ActorResponseEnvelope>> {
    info!(%actor_type, %id, %marker, %method, "Actor callback");
    let invocation = ActorInvocation::callback(ActorKey::new(actor_type, id), method);
    Ok(Json(state.invocations.invoke(&invocation).await?))
}

/// POST /actors/{actorType}/{id} - activation bookkeeping
pub async fn activate(
    State(state): State<AppState>,
    Path((actor_type, id)): Path<(String, String)>,
) -> Result<StatusCode> {
    activation(&state, ActorKey::new(actor_type, id), ActivationCall::Activate).await
}

/// DELETE /actors/{actorType}/{id} - deactivation
pub async fn deactivate(
    State(state): State<AppState>,
    Path((actor_type, id)): Path<(String, String)>,
) -> Result<StatusCode> {
    activation(&state, ActorKey::new(actor_type, id), ActivationCall::Deactivate).await
}

async fn activation(state: &AppState, actor: ActorKey, call: ActivationCall) -> Result<StatusCode> {
    info!(actor = %actor, ?call, "Activation request");
    state.invocations.record_activation_call(&actor, call).await?;
    Ok(StatusCode::OK)
}
