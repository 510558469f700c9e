//! JSON handlers for listing and fetching data sources.

use crate::AppState;
use axum::{
    extract::{Extension, Json, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sourcefeed_stream::LookupError;
use sourcefeed_types::Source;
use std::sync::Arc;
use thiserror::Error;

/// API error type mapping to HTTP status codes.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("internal server error: {0}")]
    InternalServerError(String),
}

impl From<LookupError> for ApiError {
    fn from(e: LookupError) -> Self {
        match e {
            LookupError::NotFound(id) => ApiError::NotFound(format!("data source not found: {id}")),
            other => {
                tracing::error!(error = %other, "data source lookup failed");
                ApiError::InternalServerError(other.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

/// Handler for `GET /datasources`.
///
/// Returns every source as a JSON array, possibly empty.
pub async fn list_sources_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Vec<Source>>, ApiError> {
    let sources = state.service.all().await?;
    Ok(Json(sources))
}

/// Handler for `GET /datasources/{id}`.
pub async fn get_source_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Source>, ApiError> {
    let source = state.service.by_id(&id).await?;
    Ok(Json(source))
}
