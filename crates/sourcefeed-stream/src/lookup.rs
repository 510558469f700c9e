//! Source resolution against the record store.

use sourcefeed_db::{sources, DbPool, StoreError};
use sourcefeed_types::Source;

use crate::error::LookupError;

/// Resolves source identifiers by delegating to the record store.
///
/// Every call is a single store read on a blocking thread. There is no
/// caching and no retry.
#[derive(Clone)]
pub struct SourceLookup {
    pool: DbPool,
}

impl SourceLookup {
    /// Creates a lookup backed by `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Resolves `id` to its source.
    ///
    /// # Errors
    ///
    /// Returns `LookupError::NotFound` when the store has no such record,
    /// or a store/task error when the read itself fails.
    pub async fn by_id(&self, id: &str) -> Result<Source, LookupError> {
        let pool = self.pool.clone();
        let key = id.to_owned();

        let found = tokio::task::spawn_blocking(move || -> Result<_, StoreError> {
            let conn = pool.get()?;
            sources::find_by_id(&conn, &key)
        })
        .await??;

        found.ok_or_else(|| LookupError::NotFound(id.to_owned()))
    }

    /// Lists every source in store-defined order.
    ///
    /// # Errors
    ///
    /// Returns a store/task error when the read fails.
    pub async fn all(&self) -> Result<Vec<Source>, LookupError> {
        let pool = self.pool.clone();

        let all = tokio::task::spawn_blocking(move || -> Result<_, StoreError> {
            let conn = pool.get()?;
            sources::find_all(&conn)
        })
        .await??;

        Ok(all)
    }
}
