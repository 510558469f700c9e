//! Shared record and event types for the sourcefeed workspace.
//!
//! Every other crate depends on this one for the shape of a [`Source`] and
//! of the [`Event`]s generated from it. Both serialise to the JSON bodies
//! served over HTTP, so field names here are part of the wire format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named data feed addressed by an opaque identifier.
///
/// Sources are created by the seeding bootstrap and never mutated afterwards.
/// Anything outside the store only ever holds a value copy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Source {
    /// Opaque unique identifier, assigned at creation.
    pub id: String,
    /// Human-readable name, e.g. `"Pressure"`.
    pub name: String,
}

impl Source {
    /// Creates a source with an explicit identifier.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Creates a source with a freshly generated UUID v4 identifier.
    pub fn with_random_id(name: impl Into<String>) -> Self {
        Self::new(uuid::Uuid::new_v4().to_string(), name)
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Source(id={}, name={})", self.id, self.name)
    }
}

/// One timestamped occurrence attributed to a [`Source`].
///
/// Events are never persisted: they exist only between the tick that
/// produced them and the transport write that delivers them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// The source resolved when the stream started.
    pub source: Source,
    /// Emission time, serialised as RFC 3339.
    pub when: DateTime<Utc>,
}

impl Event {
    /// Creates an event for `source` stamped with `when`.
    pub fn new(source: Source, when: DateTime<Utc>) -> Self {
        Self { source, when }
    }
}
