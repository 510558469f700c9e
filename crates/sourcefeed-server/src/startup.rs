//! Process bootstrap: database preparation, seeding, and serving.
//!
//! The binary calls [`prepare_database`] once before [`serve`] binds the
//! listener, so every request sees a migrated and (optionally) seeded store.

use crate::config::{Config, DatabaseConfig, SeedConfig};
use crate::{app, AppState};
use sourcefeed_db::{create_pool, run_migrations, sources, DbPool, DbRuntimeSettings};
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// Errors that abort startup.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    /// The connection pool could not be built.
    #[error(transparent)]
    Pool(#[from] sourcefeed_db::PoolError),

    /// Migrations failed.
    #[error(transparent)]
    Migration(#[from] sourcefeed_db::MigrationError),

    /// Seeding or another store call failed.
    #[error(transparent)]
    Store(#[from] sourcefeed_db::StoreError),

    /// Binding or serving the listener failed.
    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Opens the pool, applies migrations, and runs the seeding bootstrap.
///
/// # Errors
///
/// Returns `StartupError` if any of the three steps fails.
pub fn prepare_database(
    database: &DatabaseConfig,
    seed: &SeedConfig,
) -> Result<DbPool, StartupError> {
    let pool = create_pool(
        &database.path,
        DbRuntimeSettings {
            busy_timeout_ms: database.busy_timeout_ms,
            pool_max_size: database.pool_max_size,
            ..DbRuntimeSettings::default()
        },
    )?;

    let conn = pool.get().map_err(sourcefeed_db::StoreError::from)?;
    let applied = run_migrations(&conn)?;
    if applied > 0 {
        tracing::info!(count = applied, "applied database migrations");
    }

    if seed.enabled {
        let seeded = sources::seed_sources(&conn, seed.names.as_slice())?;
        tracing::info!(count = seeded.len(), "seeded sample data sources");
    } else {
        tracing::info!("seeding disabled, serving existing data sources");
    }

    drop(conn);
    Ok(pool)
}

/// Binds the configured address and serves until SIGINT/SIGTERM.
///
/// # Errors
///
/// Returns `StartupError::Io` if the address cannot be bound or the server
/// fails.
pub async fn serve(config: &Config, pool: DbPool) -> Result<(), StartupError> {
    let state = AppState::new(pool, config.stream.interval(), config.stream.keep_alive());
    let addr = SocketAddr::new(config.server.host, config.server.port);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        interval_ms = config.stream.interval_ms,
        "starting sourcefeed server"
    );

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("sourcefeed server shut down");
    Ok(())
}

/// Waits for a SIGINT (Ctrl+C) or SIGTERM signal for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { tracing::info!("received SIGINT, initiating graceful shutdown"); }
        () = terminate => { tracing::info!("received SIGTERM, initiating graceful shutdown"); }
    }
}
