//! Common error infrastructure for encounter-core.
//!
//! Host failures are reported as [`HostError`](crate::env::HostError) and
//! wrapped into [`EncounterError`] by the construction paths that need a new
//! object (guard units, spell decorations, shields, barrels).

use crate::env::HostError;

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: the tick can be retried or the offending step skipped
/// - **Fatal**: the encounter cannot continue with its current actors
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    Recoverable,
    Fatal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Fatal => "fatal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }
}

/// Errors surfaced by [`Encounter`](crate::Encounter) and [`PreviewScene`](crate::PreviewScene).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EncounterError {
    #[error(transparent)]
    Host(#[from] HostError),

    /// `update` was called before the first `reset`.
    #[error("encounter has not been reset yet")]
    NotReady,
}

impl EncounterError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Host(err) => err.severity(),
            Self::NotReady => ErrorSeverity::Recoverable,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Host(err) => err.error_code(),
            Self::NotReady => "ENCOUNTER_NOT_READY",
        }
    }
}

pub type EncounterResult<T> = Result<T, EncounterError>;
