//! Telemetry data model: the ingestion envelope and the entities it carries.
//!
//! ## Contents
//! - [`IngestionEvent`], [`IngestionEventType`], [`EventBody`]: the envelope
//!   the dispatch queue actually buffers
//! - [`Trace`]: session root
//! - [`Span`], [`Generation`], [`Event`], [`Observation`]: observations
//! - [`Score`]: evaluations
//! - [`SdkLog`]: diagnostic payloads
//!
//! All entities serialize with camelCase field names and omit unset fields,
//! matching the ingestion API's JSON contract.

mod ingestion;
mod observation;
mod score;
mod trace;

pub use ingestion::{EventBody, IngestionEvent, IngestionEventType, SdkLog};
pub use observation::{
    Event, Generation, ModelUsageUnit, Observation, ObservationLevel, ObservationType, Span, Usage,
};
pub use score::{Score, ScoreDataType};
pub use trace::Trace;
