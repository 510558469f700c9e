//! Event-streaming query core for sourcefeed.
//!
//! Resolves data sources against the record store and turns a resolved
//! source into an unbounded, timer-paced stream of events.
//!
//! # Components
//!
//! | Type | Role |
//! |------|------|
//! | [`SourceLookup`] | One store read per call: list all, or fetch by id. |
//! | [`EventStreamGenerator`] | Builds an [`EventStream`] emitting one event per tick. |
//! | [`StreamingQueryService`] | Lookup first, then generate; the only entry point handlers use. |
//! | [`LiveStreams`] | Gauge of streams currently holding a timer. |
//!
//! # Pacing and backpressure
//!
//! An [`EventStream`] computes an event only when its interval has ticked
//! and the consumer polls. A consumer that stops polling leaves the timer
//! unobserved; on resume it receives one event immediately, and the cadence
//! continues from the next tick boundary. Dropping the stream releases the
//! timer.
//!
//! ```rust,ignore
//! use futures_util::StreamExt;
//!
//! let service = StreamingQueryService::new(SourceLookup::new(pool), EventStreamGenerator::default());
//! let mut events = service.stream("a").await?;
//! while let Some(event) = events.next().await {
//!     println!("{} at {}", event.source.name, event.when);
//! }
//! ```

mod error;
mod generator;
mod live;
mod lookup;
mod service;

pub use error::LookupError;
pub use generator::{EventStream, EventStreamGenerator, StreamState, DEFAULT_INTERVAL};
pub use live::LiveStreams;
pub use lookup::SourceLookup;
pub use service::StreamingQueryService;
