//! # Ingestion envelope.
//!
//! Every telemetry entity travels to the backend wrapped in an
//! [`IngestionEvent`]: a type tag, a fresh envelope id, a UTC timestamp, and
//! the entity body. The dispatch core treats envelopes as opaque values; the
//! envelope shape only matters to the sink that serializes a batch.
//!
//! ## Wire shape
//! ```json
//! {
//!   "type": "trace-create",
//!   "id": "2f0c…",
//!   "timestamp": "2026-08-05T12:00:00Z",
//!   "body": { "name": "checkout" }
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::observation::{Event, Generation, Observation, Span};
use super::score::Score;
use super::trace::Trace;

/// Type tag identifying what an envelope carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IngestionEventType {
    TraceCreate,
    GenerationCreate,
    GenerationUpdate,
    ScoreCreate,
    SpanCreate,
    SpanUpdate,
    EventCreate,
    SdkLog,
    ObservationCreate,
    ObservationUpdate,
}

/// Entity payload carried by an envelope.
///
/// Serializes transparently as the entity itself; the envelope's `type` tag
/// tells the backend how to interpret it.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EventBody {
    Trace(Trace),
    Span(Span),
    Generation(Generation),
    Observation(Observation),
    Event(Event),
    Score(Score),
    SdkLog(SdkLog),
}

impl From<Trace> for EventBody {
    fn from(t: Trace) -> Self {
        EventBody::Trace(t)
    }
}

impl From<Span> for EventBody {
    fn from(s: Span) -> Self {
        EventBody::Span(s)
    }
}

impl From<Generation> for EventBody {
    fn from(g: Generation) -> Self {
        EventBody::Generation(g)
    }
}

impl From<Observation> for EventBody {
    fn from(o: Observation) -> Self {
        EventBody::Observation(o)
    }
}

impl From<Event> for EventBody {
    fn from(e: Event) -> Self {
        EventBody::Event(e)
    }
}

impl From<Score> for EventBody {
    fn from(s: Score) -> Self {
        EventBody::Score(s)
    }
}

impl From<SdkLog> for EventBody {
    fn from(l: SdkLog) -> Self {
        EventBody::SdkLog(l)
    }
}

/// One batched unit of telemetry on its way to the backend.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct IngestionEvent {
    /// What the body is and whether it creates or updates.
    #[serde(rename = "type")]
    pub event_type: IngestionEventType,
    /// Envelope id, distinct from any entity id inside the body.
    pub id: String,
    /// When the envelope was built, UTC.
    pub timestamp: DateTime<Utc>,
    /// Free-form envelope metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    /// The wrapped entity.
    pub body: EventBody,
}

/// Diagnostic SDK log payload.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SdkLog {
    pub log: Value,
}
