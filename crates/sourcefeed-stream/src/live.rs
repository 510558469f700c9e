//! Gauge of streams currently holding a timer.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Shared count of live event streams.
///
/// Each stream holds a [`StreamLease`] for as long as its timer exists. The
/// lease decrements the count when dropped, so the gauge returns to zero
/// once every stream has been closed or dropped.
#[derive(Debug, Clone, Default)]
pub struct LiveStreams {
    count: Arc<AtomicUsize>,
}

impl LiveStreams {
    /// Creates a gauge reading zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of streams currently live.
    pub fn current(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }

    pub(crate) fn lease(&self) -> StreamLease {
        self.count.fetch_add(1, Ordering::AcqRel);
        StreamLease {
            count: Arc::clone(&self.count),
        }
    }
}

/// Registration of one live stream. Dropping it unregisters the stream.
#[derive(Debug)]
pub(crate) struct StreamLease {
    count: Arc<AtomicUsize>,
}

impl Drop for StreamLease {
    fn drop(&mut self) {
        self.count.fetch_sub(1, Ordering::AcqRel);
    }
}
