use crate::level::Level;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Record '{id}' not found")]
    NotFound { id: String },

    #[error("Invalid level: {reason}")]
    InvalidLevel { reason: String },

    #[error("Level mismatch: a {source_level} record needs a {expected} supervisor, got {actual}")]
    LevelMismatch {
        source_level: Level,
        expected: Level,
        actual: String,
    },

    #[error("Record '{id}' cannot supervise itself")]
    SelfAssignment { id: String },

    #[error("Assigning '{target_id}' as supervisor of '{source_id}' would create a cycle")]
    CycleDetected { source_id: String, target_id: String },

    #[error("Record '{id}' was modified concurrently; re-fetch and retry")]
    StaleRecord { id: String },

    #[error("Invalid record: {reason}")]
    InvalidRecord { reason: String },

    #[error("Directory store lock poisoned")]
    LockPoisoned,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DirectoryError {
    /// Stable snake_case name of the variant, used on the runner wire.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Database(_)           => "database",
            Self::Serialization(_)      => "serialization",
            Self::NotFound { .. }       => "not_found",
            Self::InvalidLevel { .. }   => "invalid_level",
            Self::LevelMismatch { .. }  => "level_mismatch",
            Self::SelfAssignment { .. } => "self_assignment",
            Self::CycleDetected { .. }  => "cycle_detected",
            Self::StaleRecord { .. }    => "stale_record",
            Self::InvalidRecord { .. }  => "invalid_record",
            Self::LockPoisoned          => "lock_poisoned",
            Self::Other(_)              => "other",
        }
    }

    pub(crate) fn not_found(id: &str) -> Self {
        Self::NotFound { id: id.to_string() }
    }
}

pub type DirectoryResult<T> = Result<T, DirectoryError>;
