//! Error types for source resolution.

/// Errors returned when resolving sources for the query side.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    /// No source has the requested identifier. An expected outcome.
    #[error("source not found: {0}")]
    NotFound(String),

    /// The record store failed to answer.
    #[error("source lookup failed: {0}")]
    Store(#[from] sourcefeed_db::StoreError),

    /// The blocking task running the store call panicked or was cancelled.
    #[error("source lookup task failed: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl LookupError {
    /// Returns `true` for the not-found outcome, as opposed to a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
