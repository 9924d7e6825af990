//! Four-step actor state transaction test.
//!
//! Test drivers invoke the steps in order against a fresh actor:
//!
//! 1. [`StateTestStep::SaveInitial`] - upsert `key1..key4` in one transaction
//! 2. [`StateTestStep::GetInitial`] - read `key1`, a missing key, a missing actor
//! 3. [`StateTestStep::SaveRevision`] - upsert `key1`, delete `key4`
//! 4. [`StateTestStep::GetRevision`] - read `key1`, read the deleted `key4`
//!
//! The sequencer keeps no memory of earlier steps. Running them out of order
//! produces failures, not corrections. Every sub-call aborts its step on the
//! first mismatch and nothing is rolled back.

use std::fmt;
use std::str::FromStr;

use actorfeatures_core::ActorKey;
use axum::body::Bytes;
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::client::{ClientError, RuntimeClient};

/// Key that is never written by any step.
pub const MISSING_KEY: &str = "keynotpresent";
/// Actor id that is never activated by any step.
pub const MISSING_ACTOR_ID: &str = "actoriddoesnotexist";

/// One step of the state transaction test, in required call order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateTestStep {
    SaveInitial,
    GetInitial,
    SaveRevision,
    GetRevision,
}

impl StateTestStep {
    /// Every step, in the order callers must run them.
    pub const ALL: [Self; 4] = [
        Self::SaveInitial,
        Self::GetInitial,
        Self::SaveRevision,
        Self::GetRevision,
    ];

    /// Actor method name that triggers this step.
    #[must_use]
    pub const fn method_name(self) -> &'static str {
        match self {
            Self::SaveInitial => "savestatetest",
            Self::GetInitial => "getstatetest",
            Self::SaveRevision => "savestatetest2",
            Self::GetRevision => "getstatetest2",
        }
    }

    /// The step a method name triggers, if any.
    #[must_use]
    pub fn from_method(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|step| step.method_name() == name)
    }
}

impl fmt::Display for StateTestStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method_name())
    }
}

impl FromStr for StateTestStep {
    type Err = actorfeatures_core::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_method(s)
            .ok_or_else(|| actorfeatures_core::Error::unexpected_option("actor state test", s))
    }
}

/// One operation of a state transaction, as the sidecar expects it.
///
/// Serializes as `{"operation": "upsert"|"delete", "request": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", content = "request", rename_all = "lowercase")]
pub enum TransactionalOperation {
    Upsert {
        key: String,
        value: serde_json::Value,
    },
    Delete {
        key: String,
    },
}

impl TransactionalOperation {
    /// Upsert `key` to a string value.
    pub fn upsert(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Upsert {
            key: key.into(),
            value: serde_json::Value::String(value.into()),
        }
    }

    /// Delete `key`.
    pub fn delete(key: impl Into<String>) -> Self {
        Self::Delete { key: key.into() }
    }
}

/// Why a step failed.
#[derive(Debug, Error)]
pub enum SequencerError {
    /// A sub-call failed in transport or returned the wrong status.
    #[error("actor state call failed: {0}")]
    Client(#[from] ClientError),

    /// A read that must be empty returned bytes.
    #[error("expected 0 length response from {url}, received {length} bytes")]
    ContentMismatch { url: String, length: usize },

    /// The step name is not one of the four known steps.
    #[error(transparent)]
    UnexpectedOption(#[from] actorfeatures_core::Error),
}

/// Drives the state test steps through a [`RuntimeClient`].
#[derive(Debug, Clone)]
pub struct StateTestSequencer {
    client: RuntimeClient,
}

impl StateTestSequencer {
    /// Create a sequencer issuing calls through `client`.
    #[must_use]
    pub const fn new(client: RuntimeClient) -> Self {
        Self { client }
    }

    /// Run the step named by an actor method name.
    ///
    /// For callers holding only a raw method name. Unknown names are rejected
    /// before any sidecar call. The invocation handler classifies names
    /// itself and goes through [`run`](Self::run).
    ///
    /// # Errors
    ///
    /// Returns [`SequencerError::UnexpectedOption`] for unknown names, else
    /// whatever [`run`](Self::run) returns.
    pub async fn run_named(&self, actor: &ActorKey, name: &str) -> Result<(), SequencerError> {
        let step = name.parse::<StateTestStep>()?;
        self.run(actor, step).await
    }

    /// Run one step against `actor`.
    ///
    /// # Errors
    ///
    /// Returns the first status or content mismatch, or transport failure.
    pub async fn run(&self, actor: &ActorKey, step: StateTestStep) -> Result<(), SequencerError> {
        info!(actor = %actor, step = %step, "Running actor state test step");

        let result = match step {
            StateTestStep::SaveInitial => self.save_initial(actor).await,
            StateTestStep::GetInitial => self.get_initial(actor).await,
            StateTestStep::SaveRevision => self.save_revision(actor).await,
            StateTestStep::GetRevision => self.get_revision(actor).await,
        };

        if let Err(ref e) = result {
            warn!(actor = %actor, step = %step, error = %e, "Actor state test step failed");
        }
        result
    }

    /// Save `key1..key4` as `data1..data4` in a single transaction.
    ///
    /// # Errors
    ///
    /// Fails unless the sidecar answers 201.
    pub async fn save_initial(&self, actor: &ActorKey) -> Result<(), SequencerError> {
        let operations = [
            TransactionalOperation::upsert("key1", "data1"),
            TransactionalOperation::upsert("key2", "data2"),
            TransactionalOperation::upsert("key3", "data3"),
            TransactionalOperation::upsert("key4", "data4"),
        ];
        self.transact(actor, &operations).await
    }

    /// Read back what [`save_initial`](Self::save_initial) wrote.
    ///
    /// - `key1` must answer 200
    /// - a never-written key must answer 204 with an empty body
    /// - any key of a never-activated actor must answer 400
    ///
    /// # Errors
    ///
    /// Fails on the first sub-call that does not match.
    pub async fn get_initial(&self, actor: &ActorKey) -> Result<(), SequencerError> {
        self.get_key(actor, "key1", StatusCode::OK).await?;
        self.expect_no_content(actor, MISSING_KEY).await?;

        let missing_actor = ActorKey::new(actor.actor_type.clone(), MISSING_ACTOR_ID);
        self.get_key(&missing_actor, MISSING_KEY, StatusCode::BAD_REQUEST)
            .await?;
        Ok(())
    }

    /// Overwrite `key1` with `data1v2` and delete `key4` in one transaction.
    ///
    /// # Errors
    ///
    /// Fails unless the sidecar answers 201.
    pub async fn save_revision(&self, actor: &ActorKey) -> Result<(), SequencerError> {
        let operations = [
            TransactionalOperation::upsert("key1", "data1v2"),
            TransactionalOperation::delete("key4"),
        ];
        self.transact(actor, &operations).await
    }

    /// Read back what [`save_revision`](Self::save_revision) changed.
    ///
    /// - `key1` must answer 200
    /// - the deleted `key4` must answer 204 with an empty body
    ///
    /// # Errors
    ///
    /// Fails on the first sub-call that does not match.
    pub async fn get_revision(&self, actor: &ActorKey) -> Result<(), SequencerError> {
        self.get_key(actor, "key1", StatusCode::OK).await?;
        self.expect_no_content(actor, "key4").await
    }

    async fn transact(
        &self,
        actor: &ActorKey,
        operations: &[TransactionalOperation],
    ) -> Result<(), SequencerError> {
        let url = self.client.actor_state_url(actor);
        self.client
            .call(Method::POST, &url, Some(operations), StatusCode::CREATED)
            .await?;
        Ok(())
    }

    async fn get_key(
        &self,
        actor: &ActorKey,
        key: &str,
        expected: StatusCode,
    ) -> Result<Bytes, SequencerError> {
        let url = self.client.actor_state_key_url(actor, key);
        Ok(self.client.send(Method::GET, &url, expected).await?)
    }

    async fn expect_no_content(&self, actor: &ActorKey, key: &str) -> Result<(), SequencerError> {
        let body = self.get_key(actor, key, StatusCode::NO_CONTENT).await?;
        if body.is_empty() {
            return Ok(());
        }
        Err(SequencerError::ContentMismatch {
            url: self.client.actor_state_key_url(actor, key),
            length: body.len(),
        })
    }
}
