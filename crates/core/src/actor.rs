//! Actor identity and activation records.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Separator between actor type and id in a [`CompositeActorId`].
pub const COMPOSITE_SEPARATOR: char = '.';

/// An actor addressed by the sidecar: `(actor type, actor id)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorKey {
    /// Registered actor type.
    pub actor_type: String,
    /// Actor instance id within the type.
    pub id: String,
}

impl ActorKey {
    /// Create a new actor key.
    pub fn new(actor_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            actor_type: actor_type.into(),
            id: id.into(),
        }
    }

    /// The registry key for this actor.
    #[must_use]
    pub fn composite_id(&self) -> CompositeActorId {
        CompositeActorId(format!(
            "{}{COMPOSITE_SEPARATOR}{}",
            self.actor_type, self.id
        ))
    }

    /// An activation record for this actor stamped with `epoch_millis`.
    #[must_use]
    pub fn record(&self, epoch_millis: i64) -> ActorRecord {
        ActorRecord {
            actor_type: self.actor_type.clone(),
            composite_id: self.composite_id(),
            last_activity_epoch_millis: epoch_millis,
        }
    }
}

impl fmt::Display for ActorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.actor_type, self.id)
    }
}

/// `actorType.id` - two actors are the same record iff this matches exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompositeActorId(String);

impl CompositeActorId {
    /// Borrow the underlying string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CompositeActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&ActorKey> for CompositeActorId {
    fn from(key: &ActorKey) -> Self {
        key.composite_id()
    }
}

/// What the registry remembers about an active actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorRecord {
    pub actor_type: String,
    pub composite_id: CompositeActorId,
    /// Epoch millis of the last invocation addressed to the actor.
    pub last_activity_epoch_millis: i64,
}
