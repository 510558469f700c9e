//! Error types for the record store.

/// Errors that can occur while reading or writing source records.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A database operation failed.
    #[error("store database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// No connection could be checked out of the pool in time.
    #[error("store connection unavailable: {0}")]
    Pool(#[from] r2d2::Error),
}
