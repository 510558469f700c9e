//! HTTP surface for sourcefeed.
//!
//! Routes:
//! - `GET /health`
//! - `GET /datasources`
//! - `GET /datasources/{id}`
//! - `GET /datasources/{id}/events` (SSE)

pub mod api;
pub mod api_sse;
pub mod config;
pub mod startup;

use axum::{routing::get, Extension, Json, Router};
use serde_json::{json, Value};
use sourcefeed_db::DbPool;
use sourcefeed_stream::{EventStreamGenerator, SourceLookup, StreamingQueryService};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Lookup and streaming entry point for every data-source route.
    pub service: StreamingQueryService,
    /// Idle period after which SSE connections receive a keep-alive comment.
    pub keep_alive: Duration,
}

impl AppState {
    /// Builds state over `pool` emitting one event per `interval`.
    pub fn new(pool: DbPool, interval: Duration, keep_alive: Duration) -> Self {
        Self {
            service: StreamingQueryService::new(
                SourceLookup::new(pool),
                EventStreamGenerator::new(interval),
            ),
            keep_alive,
        }
    }
}

/// Health check handler.
async fn health(Extension(state): Extension<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "activeStreams": state.service.live_streams().current(),
    }))
}

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/datasources", get(api::list_sources_handler))
        .route("/datasources/{id}", get(api::get_source_handler))
        .route(
            "/datasources/{id}/events",
            get(api_sse::get_source_events_handler),
        )
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(Extension(Arc::new(state)))
}
