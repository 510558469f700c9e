//! Query service composing source lookup and event generation.

use sourcefeed_types::Source;

use crate::error::LookupError;
use crate::generator::{EventStream, EventStreamGenerator};
use crate::live::LiveStreams;
use crate::lookup::SourceLookup;

/// Serves the three data-source queries: list, fetch, and stream.
///
/// A stream is started only after its source resolves. A miss returns
/// [`LookupError::NotFound`] before any timer exists. Each call to
/// [`stream`](Self::stream) resolves again and gets its own timer.
#[derive(Clone)]
pub struct StreamingQueryService {
    lookup: SourceLookup,
    generator: EventStreamGenerator,
}

impl StreamingQueryService {
    /// Creates a service from its two collaborators.
    pub fn new(lookup: SourceLookup, generator: EventStreamGenerator) -> Self {
        Self { lookup, generator }
    }

    /// Lists every source.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub async fn all(&self) -> Result<Vec<Source>, LookupError> {
        self.lookup.all().await
    }

    /// Fetches one source.
    ///
    /// # Errors
    ///
    /// Returns `LookupError::NotFound` for unknown ids and propagates store
    /// failures.
    pub async fn by_id(&self, id: &str) -> Result<Source, LookupError> {
        self.lookup.by_id(id).await
    }

    /// Resolves `id` once and starts an event stream for it.
    ///
    /// # Errors
    ///
    /// Returns `LookupError::NotFound` for unknown ids and propagates store
    /// failures. No timer is started in either case.
    pub async fn stream(&self, id: &str) -> Result<EventStream, LookupError> {
        let source = match self.lookup.by_id(id).await {
            Ok(source) => source,
            Err(e) => {
                if e.is_not_found() {
                    tracing::debug!(source_id = id, "event stream requested for unknown source");
                } else {
                    tracing::warn!(source_id = id, error = %e, "event stream lookup failed");
                }
                return Err(e);
            }
        };

        let stream = self.generator.generate(source);
        tracing::info!(
            source_id = %stream.source().id,
            name = %stream.source().name,
            live_streams = self.live_streams().current(),
            "event stream opened"
        );
        Ok(stream)
    }

    /// Gauge of streams currently holding a timer.
    pub fn live_streams(&self) -> &LiveStreams {
        self.generator.live_streams()
    }
}
