use log::warn;
use thiserror::Error;

/// The single error type surfaced by every repository operation.
///
/// `Conflict` only escapes a backend when the uniqueness violation was on a key the operation did not expect. A
/// conflict on the operation's own idempotency key is resolved to success internally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("The store is temporarily unavailable: {0}")]
    Transient(String),
    #[error("Uniqueness conflict: {0}")]
    Conflict(String),
    #[error("Unexpected database error: {0}")]
    Unexpected(String),
}

// SQLite primary result codes for SQLITE_BUSY and SQLITE_LOCKED. Extended codes share the low byte.
const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::Database(err) if err.is_unique_violation() => StoreError::Conflict(err.message().to_string()),
            sqlx::Error::Database(err) => {
                let primary = err.code().and_then(|c| c.parse::<i32>().ok()).map(|c| c & 0xff);
                match primary {
                    Some(SQLITE_BUSY | SQLITE_LOCKED) => StoreError::Transient(err.message().to_string()),
                    _ => StoreError::Unexpected(err.message().to_string()),
                }
            },
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::WorkerCrashed => {
                StoreError::Transient(e.to_string())
            },
            sqlx::Error::Io(_) | sqlx::Error::Tls(_) => StoreError::Transient(e.to_string()),
            _ => StoreError::Unexpected(e.to_string()),
        }
    }
}

impl StoreError {
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Transient(_))
    }

    /// True if this is a uniqueness conflict naming every one of `columns` (e.g. `matches.buy_listing_id`).
    pub fn is_conflict_on(&self, columns: &[&str]) -> bool {
        match self {
            StoreError::Conflict(msg) => columns.iter().all(|c| msg.contains(c)),
            _ => false,
        }
    }

    /// Anything other than a conflict on `columns` is passed through, except that a conflict on some other key is
    /// logged and demoted to `Unexpected`.
    pub fn unexpected_unless_conflict_on(self, columns: &[&str]) -> Self {
        match self {
            StoreError::Conflict(msg) if !columns.iter().all(|c| msg.contains(c)) => {
                warn!("🗃️ Uniqueness violation on an unexpected key: {msg}");
                StoreError::Unexpected(msg)
            },
            other => other,
        }
    }
}
