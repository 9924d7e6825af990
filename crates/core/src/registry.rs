//! Activation registry keyed by composite actor id.
//!
//! The registry is shared by every in-flight invocation. Each operation is
//! atomic on its own; there is no ordering across operations, even for the
//! same actor.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::actor::{ActorRecord, CompositeActorId};

/// In-memory map of active actors.
///
/// Cloning shares the underlying map.
#[derive(Debug, Clone, Default)]
pub struct ActorRegistry {
    actors: Arc<RwLock<HashMap<CompositeActorId, ActorRecord>>>,
}

impl ActorRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the record for `id`.
    pub async fn store(&self, id: CompositeActorId, record: ActorRecord) {
        tracing::debug!(actor = %id, "Storing actor record");
        self.actors.write().await.insert(id, record);
    }

    /// The record last stored for `id`, if it has not been deleted since.
    pub async fn load(&self, id: &CompositeActorId) -> Option<ActorRecord> {
        self.actors.read().await.get(id).cloned()
    }

    /// Remove `id`. Returns whether an entry existed.
    pub async fn delete(&self, id: &CompositeActorId) -> bool {
        let removed = self.actors.write().await.remove(id).is_some();
        tracing::debug!(actor = %id, removed, "Deleting actor record");
        removed
    }

    /// Number of tracked actors.
    pub async fn len(&self) -> usize {
        self.actors.read().await.len()
    }

    /// Whether no actor is tracked.
    pub async fn is_empty(&self) -> bool {
        self.actors.read().await.is_empty()
    }
}
