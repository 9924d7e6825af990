//! Core state for the actor features app.
//!
//! This crate holds everything the app records about the actors the sidecar
//! drives through it, without any HTTP concerns:
//!
//! - **Actor identity**: [`ActorKey`] and its [`CompositeActorId`] map key
//! - **Registry**: [`ActorRegistry`], the activation records by composite id
//! - **Journal**: [`LogJournal`], the ordered lifecycle log polled by test drivers
//! - **Environment**: [`EnvOverrides`], process-local overrides of env variables
//!
//! # Example
//!
//! ```ignore
//! use actorfeatures_core::{ActorKey, ActorRegistry, LogJournal, LogEntry, clock};
//!
//! let registry = ActorRegistry::new();
//! let journal = LogJournal::new();
//!
//! let key = ActorKey::new("testactorfeatures", "42");
//! registry.store(key.composite_id(), key.record(clock::epoch_millis())).await;
//!
//! let start = clock::epoch_millis();
//! journal.append(LogEntry::finished("deactivation", &key, start)).await;
//! assert_eq!(journal.snapshot().await.len(), 1);
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![forbid(clippy::panic)]

pub mod actor;
pub mod clock;
pub mod env;
pub mod error;
pub mod journal;
pub mod registry;

pub use actor::{ActorKey, ActorRecord, CompositeActorId};
pub use env::EnvOverrides;
pub use error::{Error, Result};
pub use journal::{LogEntry, LogJournal};
pub use registry::ActorRegistry;
