//! Persistence layer for sourcefeed.
//!
//! Provides SQLite connection pooling (via `r2d2`), embedded migrations, and
//! the record store for [`Source`](sourcefeed_types::Source) rows.
//!
//! The store is a plain set of functions over a `rusqlite::Connection`.
//! Callers on the async side check a connection out of the pool inside
//! `tokio::task::spawn_blocking` and call into [`sources`].

mod error;
mod migrations;
mod pool;
pub mod sources;

pub use error::StoreError;
pub use migrations::{run_migrations, MigrationError};
pub use pool::{create_pool, DbPool, DbRuntimeSettings, PoolError};
