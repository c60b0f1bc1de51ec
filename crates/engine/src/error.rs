use thiserror::Error;
use uuid::Uuid;

use crate::models::{MatchStatus, TimerState};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Version conflict on {id}: expected version {expected}")]
    VersionConflict { id: Uuid, expected: i64 },
}

pub type Result<T> = std::result::Result<T, StorageError>;

impl StorageError {
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            StorageError::Database(sqlx::Error::Database(e))
                if e.code().as_deref() == Some("23505")
        )
    }

    /// Errors worth another attempt after reloading the document.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StorageError::VersionConflict { .. }
                | StorageError::Database(sqlx::Error::PoolTimedOut | sqlx::Error::Io(_))
        )
    }
}

/// Rule violations of the scoring domain. All of them are recoverable and
/// meant to be shown to the operator as-is.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition { from: MatchStatus, to: MatchStatus },

    #[error("Match is not active (status: {status})")]
    MatchNotActive { status: MatchStatus },

    #[error("Timer cannot {action} while {state}")]
    InvalidTimerTransition {
        state: TimerState,
        action: &'static str,
    },

    #[error("Round limit exceeded: match has {total_rounds} rounds")]
    RoundLimitExceeded { total_rounds: u8 },

    #[error("At least one venue is required")]
    NoVenues,

    #[error("Venue '{0}' is listed more than once")]
    DuplicateVenue(String),

    #[error("Event {0} was already recorded with a different payload")]
    EventIdConflict(Uuid),

    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_database_errors_are_unique_violations() {
        let conflict = StorageError::VersionConflict {
            id: Uuid::new_v4(),
            expected: 3,
        };
        assert!(!conflict.is_unique_violation());
        assert!(conflict.is_retryable());

        let constraint = StorageError::ConstraintViolation("Match already exists".into());
        assert!(!constraint.is_unique_violation());
        assert!(!StorageError::Database(sqlx::Error::RowNotFound).is_unique_violation());
        assert!(StorageError::Database(sqlx::Error::PoolTimedOut).is_retryable());
        assert!(!StorageError::NotFound.is_retryable());
    }
}
