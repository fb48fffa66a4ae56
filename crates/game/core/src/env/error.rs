//! Host access errors.

use crate::error::ErrorSeverity;

use super::{EntityId, ObjectKind};

/// Errors reported by a host capability.
///
/// Most host mutations are infallible no-ops on unknown entities; only entity
/// creation reports failure, because every caller depends on the new handle.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    /// The host could not instantiate the requested object.
    #[error("host failed to spawn {kind}")]
    SpawnFailed { kind: ObjectKind },

    /// The referenced entity does not exist (anymore).
    #[error("entity {0} does not exist")]
    UnknownEntity(EntityId),
}

impl HostError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::SpawnFailed { .. } => ErrorSeverity::Fatal,
            Self::UnknownEntity(_) => ErrorSeverity::Recoverable,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::SpawnFailed { .. } => "HOST_SPAWN_FAILED",
            Self::UnknownEntity(_) => "HOST_UNKNOWN_ENTITY",
        }
    }
}
