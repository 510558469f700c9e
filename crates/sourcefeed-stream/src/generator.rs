//! Timer-paced event generation.
//!
//! An [`EventStream`] owns one `tokio::time::Interval` and computes an
//! [`Event`] only when that interval yields a tick *and* the consumer polls.
//! Nothing is produced ahead of demand, so the stream never holds more than
//! the one event being returned.

use std::pin::Pin;
use std::task::{ready, Context, Poll};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures_util::stream::{FusedStream, Stream};
use sourcefeed_types::{Event, Source};
use tokio::time::{Instant, Interval, MissedTickBehavior};

use crate::live::{LiveStreams, StreamLease};

/// Default spacing between two events of one stream.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// Builds independent [`EventStream`]s at a fixed cadence.
#[derive(Debug, Clone)]
pub struct EventStreamGenerator {
    period: Duration,
    live: LiveStreams,
}

impl Default for EventStreamGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL)
    }
}

impl EventStreamGenerator {
    /// Creates a generator emitting one event per `period`.
    ///
    /// A zero period is raised to one millisecond.
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(Duration::from_millis(1)),
            live: LiveStreams::new(),
        }
    }

    /// Spacing between events.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Gauge shared by every stream this generator has started.
    pub fn live_streams(&self) -> &LiveStreams {
        &self.live
    }

    /// Starts an infinite stream of events for `source`.
    ///
    /// The first event is due one full period from now. If the consumer falls
    /// behind, missed ticks collapse into a single immediate event and the
    /// next one is due a full period after that delivery.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn generate(&self, source: Source) -> EventStream {
        let start = Instant::now();
        let mut ticker = tokio::time::interval_at(start + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let lease = self.live.lease();
        tracing::debug!(
            source_id = %source.id,
            period = ?self.period,
            live_streams = self.live.current(),
            "event stream started"
        );

        EventStream {
            source,
            emitted: 0,
            active: Some(Ticking {
                ticker,
                clock: StreamClock::starting_at(start),
                _lease: lease,
            }),
        }
    }
}

/// Lifecycle of an [`EventStream`], as reported by [`EventStream::state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// The timer is armed and events are produced on demand.
    Streaming,
    /// The timer has been released. No further events will be produced.
    Closed,
}

/// An unbounded, consumer-paced sequence of [`Event`]s for one source.
///
/// Dropping the stream releases its timer. [`EventStream::close`] does the
/// same eagerly and is idempotent.
#[derive(Debug)]
pub struct EventStream {
    source: Source,
    emitted: u64,
    active: Option<Ticking>,
}

#[derive(Debug)]
struct Ticking {
    ticker: Interval,
    clock: StreamClock,
    _lease: StreamLease,
}

impl EventStream {
    /// The source every event of this stream carries.
    pub fn source(&self) -> &Source {
        &self.source
    }

    /// Number of events handed out so far.
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    /// Current lifecycle state.
    ///
    /// Lets owners check whether the timer is still held without polling
    /// the stream, e.g. after [`EventStream::close`].
    pub fn state(&self) -> StreamState {
        if self.active.is_some() {
            StreamState::Streaming
        } else {
            StreamState::Closed
        }
    }

    /// Releases the timer and ends the stream.
    ///
    /// Returns `true` if this call closed the stream, `false` if it was
    /// already closed.
    pub fn close(&mut self) -> bool {
        match self.active.take() {
            Some(_ticking) => {
                tracing::debug!(
                    source_id = %self.source.id,
                    emitted = self.emitted,
                    "event stream closed"
                );
                true
            }
            None => false,
        }
    }
}

impl Stream for EventStream {
    type Item = Event;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Event>> {
        let this = self.get_mut();
        let Some(ticking) = this.active.as_mut() else {
            return Poll::Ready(None);
        };

        ready!(ticking.ticker.poll_tick(cx));

        this.emitted += 1;
        let when = ticking.clock.now();
        Poll::Ready(Some(Event::new(this.source.clone(), when)))
    }
}

impl FusedStream for EventStream {
    fn is_terminated(&self) -> bool {
        self.active.is_none()
    }
}

impl Drop for EventStream {
    fn drop(&mut self) {
        self.close();
    }
}

/// Wall-clock timestamps derived from the runtime's monotonic clock.
///
/// Timestamps within one stream are therefore monotonic even if the system
/// clock is adjusted mid-stream.
#[derive(Debug, Clone, Copy)]
struct StreamClock {
    wall: DateTime<Utc>,
    origin: Instant,
}

impl StreamClock {
    fn starting_at(origin: Instant) -> Self {
        Self {
            wall: Utc::now(),
            origin,
        }
    }

    fn now(&self) -> DateTime<Utc> {
        let elapsed = Instant::now().saturating_duration_since(self.origin);
        let elapsed = chrono::Duration::from_std(elapsed).unwrap_or_else(|_| chrono::Duration::zero());
        self.wall + elapsed
    }
}
