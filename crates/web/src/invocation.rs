//! Actor method invocations and activation bookkeeping.
//!
//! The sidecar calls into this module for every actor method, timer and
//! reminder delivery, and for every activation or deactivation. What it
//! observes goes to the [`ActorRegistry`] and the [`LogJournal`].

use std::collections::HashMap;
use std::time::Duration;

use actorfeatures_core::{ActorKey, ActorRegistry, LogEntry, LogJournal, clock};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::sequencer::{SequencerError, StateTestSequencer, StateTestStep};

/// Method answered with the process hostname.
pub const HOSTNAME_METHOD: &str = "hostname";
/// Journal action recorded for a deactivation of a tracked actor.
pub const DEACTIVATION_ACTION: &str = "deactivation";

/// An inbound actor method call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorInvocation {
    pub actor: ActorKey,
    pub method: String,
    /// Delivered by a timer or reminder rather than a client call.
    pub reminder_or_timer: bool,
}

impl ActorInvocation {
    /// A direct (client) method call.
    pub fn method(actor: ActorKey, method: impl Into<String>) -> Self {
        Self {
            actor,
            method: method.into(),
            reminder_or_timer: false,
        }
    }

    /// A timer or reminder callback.
    pub fn callback(actor: ActorKey, method: impl Into<String>) -> Self {
        Self {
            actor,
            method: method.into(),
            reminder_or_timer: true,
        }
    }
}

/// What a method name maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    /// Run a state test step, then continue as [`MethodKind::Generic`].
    StateTest(StateTestStep),
    /// Reply with the process hostname.
    Hostname,
    /// Simulated unit of work echoing the call.
    Generic,
}

impl MethodKind {
    /// Map a method name to its handler.
    #[must_use]
    pub fn classify(method: &str) -> Self {
        if method == HOSTNAME_METHOD {
            return Self::Hostname;
        }
        StateTestStep::from_method(method).map_or(Self::Generic, Self::StateTest)
    }
}

/// Envelope the sidecar expects back from an actor method.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorResponseEnvelope {
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
    #[serde(default)]
    pub metadata: Option<HashMap<String, String>>,
}

impl ActorResponseEnvelope {
    /// Wrap `data` with no metadata.
    #[must_use]
    pub const fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            metadata: None,
        }
    }
}

/// Payload of a generic method call, echoed inside the envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodResponse {
    #[serde(rename = "actorType", default, skip_serializing_if = "String::is_empty")]
    pub actor_type: String,
    #[serde(rename = "actorId", default, skip_serializing_if = "String::is_empty")]
    pub actor_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub method: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub start_time: i64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub end_time: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_zero(value: &i64) -> bool {
    *value == 0
}

/// Whether an activation request may deactivate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationCall {
    /// Bookkeeping only (`POST`).
    Activate,
    /// Remove the actor if tracked (`DELETE`).
    Deactivate,
}

/// Why an invocation failed.
#[derive(Debug, Error)]
pub enum InvocationError {
    #[error(transparent)]
    StateTest(#[from] SequencerError),

    #[error("failed to encode method response: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Handles actor calls from the sidecar.
#[derive(Debug, Clone)]
pub struct ActorInvocationHandler {
    registry: ActorRegistry,
    journal: LogJournal,
    sequencer: StateTestSequencer,
    registered_actor_type: String,
    work_delay: Duration,
}

impl ActorInvocationHandler {
    /// Create a handler for `registered_actor_type`.
    pub fn new(
        registry: ActorRegistry,
        journal: LogJournal,
        sequencer: StateTestSequencer,
        registered_actor_type: impl Into<String>,
        work_delay: Duration,
    ) -> Self {
        Self {
            registry,
            journal,
            sequencer,
            registered_actor_type: registered_actor_type.into(),
            work_delay,
        }
    }

    /// The actor type deactivations are validated against.
    #[must_use]
    pub fn registered_actor_type(&self) -> &str {
        &self.registered_actor_type
    }

    /// Handle one actor method call.
    ///
    /// The actor is recorded as active before anything else. A journal entry
    /// is appended only when the call succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`InvocationError::StateTest`] when a state test step fails.
    pub async fn invoke(
        &self,
        invocation: &ActorInvocation,
    ) -> Result<ActorResponseEnvelope, InvocationError> {
        let start = clock::epoch_millis();
        let actor = &invocation.actor;
        let composite_id = actor.composite_id();

        debug!(actor = %composite_id, "Storing activation record");
        self.registry
            .store(composite_id, actor.record(clock::epoch_millis()))
            .await;

        let data = match MethodKind::classify(&invocation.method) {
            MethodKind::Hostname => hostname().into_bytes(),
            MethodKind::StateTest(step) => {
                self.sequencer.run(actor, step).await?;
                self.work(invocation, start).await?
            }
            MethodKind::Generic => self.work(invocation, start).await?,
        };

        self.journal
            .append(LogEntry::finished(&invocation.method, actor, start))
            .await;

        info!(
            actor = %actor,
            method = %invocation.method,
            reminder_or_timer = invocation.reminder_or_timer,
            "Actor method completed"
        );
        Ok(ActorResponseEnvelope::new(data))
    }

    /// Record an activation call for `actor`.
    ///
    /// A [`ActivationCall::Deactivate`] of a tracked actor removes it and
    /// journals `deactivation`; anything else journals an empty action.
    /// Returns whether the actor was deactivated.
    ///
    /// # Errors
    ///
    /// Returns [`actorfeatures_core::Error::UnknownActorType`] without any
    /// mutation when the actor type is not the registered one.
    pub async fn record_activation_call(
        &self,
        actor: &ActorKey,
        call: ActivationCall,
    ) -> Result<bool, actorfeatures_core::Error> {
        let start = clock::epoch_millis();

        if actor.actor_type != self.registered_actor_type {
            return Err(actorfeatures_core::Error::unknown_actor_type(
                &actor.actor_type,
                &self.registered_actor_type,
            ));
        }

        let composite_id = actor.composite_id();
        let deactivated = match call {
            ActivationCall::Deactivate => self.registry.delete(&composite_id).await,
            ActivationCall::Activate => false,
        };

        let action = if deactivated { DEACTIVATION_ACTION } else { "" };
        self.journal
            .append(LogEntry::finished(action, actor, start))
            .await;

        info!(actor = %actor, ?call, deactivated, "Activation call recorded");
        Ok(deactivated)
    }

    /// Simulate a unit of work and echo the call.
    async fn work(
        &self,
        invocation: &ActorInvocation,
        start: i64,
    ) -> Result<Vec<u8>, InvocationError> {
        if !invocation.reminder_or_timer {
            tokio::time::sleep(self.work_delay).await;
        }

        let response = MethodResponse {
            actor_type: invocation.actor.actor_type.clone(),
            actor_id: invocation.actor.id.clone(),
            method: invocation.method.clone(),
            start_time: start,
            end_time: clock::epoch_millis(),
            message: String::new(),
        };
        Ok(serde_json::to_vec(&response)?)
    }
}

fn hostname() -> String {
    gethostname::gethostname().to_string_lossy().into_owned()
}

/// `Vec<u8>` as a base64 string, the JSON encoding of byte payloads.
mod base64_bytes {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map_or_else(|| Ok(Vec::new()), |encoded| {
                STANDARD.decode(encoded).map_err(serde::de::Error::custom)
            })
    }
}
