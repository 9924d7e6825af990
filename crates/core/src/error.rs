//! Core error types for actor bookkeeping.
//!
//! All errors are explicit and typed - no panics allowed.

use thiserror::Error;

/// The standard Result type for core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// The actor type does not match the type this app registered.
    #[error("unknown actor type: {actor_type} (registered: {registered})")]
    UnknownActorType {
        actor_type: String,
        registered: String,
    },

    /// A named option is not one this app understands.
    #[error("{context} - unexpected option: {option}")]
    UnexpectedOption { context: String, option: String },
}

impl Error {
    /// Create an unknown actor type error.
    pub fn unknown_actor_type(actor_type: impl Into<String>, registered: impl Into<String>) -> Self {
        Self::UnknownActorType {
            actor_type: actor_type.into(),
            registered: registered.into(),
        }
    }

    /// Create an unexpected option error.
    pub fn unexpected_option(context: impl Into<String>, option: impl Into<String>) -> Self {
        Self::UnexpectedOption {
            context: context.into(),
            option: option.into(),
        }
    }

    /// Whether the error stems from caller input rather than a failed dependency.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::UnknownActorType { .. } | Self::UnexpectedOption { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_actor_type_display() {
        let err = Error::unknown_actor_type("other", "testactorfeatures");
        assert_eq!(
            err.to_string(),
            "unknown actor type: other (registered: testactorfeatures)"
        );
        assert!(err.is_validation());
    }

    #[test]
    fn test_unexpected_option_display() {
        let err = Error::unexpected_option("actor state test", "dropstatetest");
        assert!(err.to_string().contains("unexpected option: dropstatetest"));
    }
}
