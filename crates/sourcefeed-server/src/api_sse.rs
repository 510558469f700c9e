//! SSE event stream handler.

use crate::{api::ApiError, AppState};
use axum::{
    extract::{Extension, Path},
    response::{
        sse::{Event, KeepAlive},
        Sse,
    },
};
use futures_util::Stream;
use std::{convert::Infallible, sync::Arc};
use tokio_stream::StreamExt;

/// Handler for `GET /datasources/{id}/events`.
///
/// Resolves the source before answering. An unknown id gets a 404 and no
/// stream is opened. Otherwise each tick becomes one SSE event whose data is
/// the JSON-encoded event. The stream, and its timer, is dropped when the
/// client disconnects.
pub async fn get_source_events_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let events = state.service.stream(&id).await?;

    let mapped_stream = events.filter_map(|event| match Event::default().json_data(&event) {
        Ok(sse_event) => Some(Ok(sse_event)),
        Err(e) => {
            tracing::error!(source_id = %event.source.id, "failed to serialize source event: {}", e);
            None
        }
    });

    Ok(Sse::new(mapped_stream).keep_alive(KeepAlive::new().interval(state.keep_alive)))
}
