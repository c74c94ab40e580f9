/// Core error types for Cadence
use crate::types::SongId;
use thiserror::Error;

/// Result type alias using `CadenceError`
pub type Result<T> = std::result::Result<T, CadenceError>;

/// Core error type for Cadence
#[derive(Error, Debug)]
pub enum CadenceError {
    /// Entity not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// One or more referenced songs do not exist (or are not members, for removals)
    #[error("Songs not found: {}", join_ids(.0))]
    SongsNotFound(Vec<SongId>),

    /// Requesting user does not own the resource
    #[error("Permission denied")]
    PermissionDenied,

    /// Song is already a member of the target container
    #[error("Song {song} is already in {container}")]
    AlreadyMember { container: String, song: SongId },

    /// Songs are already members elsewhere (another album, or this container)
    #[error("Songs already assigned: {}", join_ids(.0))]
    SongsConflict(Vec<SongId>),

    /// Uniqueness violation reported by the database
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// The database is busy with another writer; the operation may be retried
    #[error("Database busy: {0}")]
    Busy(String),

    /// Database errors (for storage implementations)
    #[error("Database error: {0}")]
    Database(String),
}

impl CadenceError {
    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Whether running the whole operation again in a fresh transaction may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Busy(_))
    }
}

fn join_ids(ids: &[SongId]) -> String {
    ids.iter()
        .map(SongId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

// SQLite primary result codes (extended codes carry them in the low byte)
#[cfg(feature = "sqlx-support")]
const SQLITE_BUSY: i64 = 5;
#[cfg(feature = "sqlx-support")]
const SQLITE_LOCKED: i64 = 6;

#[cfg(feature = "sqlx-support")]
impl From<sqlx::Error> for CadenceError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return Self::Conflict(db_err.message().to_string());
            }

            let primary_code = db_err
                .code()
                .and_then(|code| code.parse::<i64>().ok())
                .map(|code| code & 0xff);
            if matches!(primary_code, Some(SQLITE_BUSY | SQLITE_LOCKED)) {
                return Self::Busy(db_err.message().to_string());
            }
        }

        Self::Database(err.to_string())
    }
}
