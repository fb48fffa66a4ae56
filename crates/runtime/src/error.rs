//! Unified error type surfaced by the runtime API.
use thiserror::Error;

use encounter_core::{EncounterError, ErrorSeverity};

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Encounter(#[from] EncounterError),

    #[error("frame callback received before the map was loaded")]
    NotLoaded,

    #[error("failed to load encounter content")]
    Content(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl RuntimeError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Encounter(err) => err.severity(),
            Self::NotLoaded => ErrorSeverity::Recoverable,
            Self::Content(_) => ErrorSeverity::Fatal,
        }
    }
}
