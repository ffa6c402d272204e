//! Storage-specific error type wrapping sqlx errors.

use powerscout_domain::discovery::DedupKey;
use powerscout_domain::error::{PowerScoutError, RejectedError};

/// Errors originating from the `SQLite` storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A record with the same dedup key is already stored.
    #[error("dedup key {0} already stored")]
    DuplicateKey(DedupKey),

    /// A query or connection failed.
    #[error("database error")]
    Database(#[from] sqlx::Error),

    /// Failed to encode the power entity list column.
    #[error("JSON serialization error")]
    Json(#[from] serde_json::Error),

    /// Failed to run migrations.
    #[error("migration error")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl StorageError {
    /// Classify a failed insert of the record keyed by `dedup_key`.
    pub(crate) fn on_insert(err: sqlx::Error, dedup_key: &DedupKey) -> Self {
        match err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Self::DuplicateKey(dedup_key.clone())
            }
            other => Self::Database(other),
        }
    }
}

impl From<StorageError> for PowerScoutError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::DuplicateKey(dedup_key) => RejectedError {
                dedup_key: dedup_key.to_string(),
            }
            .into(),
            other => Self::Storage(Box::new(other)),
        }
    }
}
