//! Storage errors.

use thiserror::Error;

/// Errors raised while storing or reading summaries.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// The database at `url` could not be opened.
    #[error("cannot open database {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: sqlx::Error,
    },

    /// A query or transaction failed.
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// The embedded schema could not be applied.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, DatabaseError>;
