//! Append-only journal of observed actor lifecycle events.
//!
//! Test drivers poll the journal to assert that activations, method calls,
//! timers, reminders and deactivations happened. Entries keep insertion
//! order, which need not match start time across concurrent actors.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::actor::ActorKey;
use crate::clock;

/// One observed lifecycle event. Immutable once appended.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// Method name, `deactivation`, or empty for untracked deactivations.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub action: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub actor_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub actor_id: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub start_timestamp: i64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub end_timestamp: i64,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_zero(value: &i64) -> bool {
    *value == 0
}

impl LogEntry {
    /// An entry for `actor` that started at `start` and ends now.
    pub fn finished(action: impl Into<String>, actor: &ActorKey, start: i64) -> Self {
        Self {
            action: action.into(),
            actor_type: actor.actor_type.clone(),
            actor_id: actor.id.clone(),
            start_timestamp: start,
            end_timestamp: clock::epoch_millis(),
        }
    }
}

/// Insertion-ordered log shared across all request handlers.
///
/// Cloning shares the underlying log.
#[derive(Debug, Clone, Default)]
pub struct LogJournal {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl LogJournal {
    /// Create an empty journal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `entry` at the tail.
    pub async fn append(&self, entry: LogEntry) {
        tracing::debug!(
            action = %entry.action,
            actor_type = %entry.actor_type,
            actor_id = %entry.actor_id,
            "Appending journal entry"
        );
        self.entries.lock().await.push(entry);
    }

    /// An independent copy of the journal in insertion order.
    pub async fn snapshot(&self) -> Vec<LogEntry> {
        self.entries.lock().await.clone()
    }

    /// Drop every entry.
    pub async fn reset(&self) {
        let mut entries = self.entries.lock().await;
        tracing::debug!(dropped = entries.len(), "Resetting journal");
        *entries = Vec::new();
    }
}
