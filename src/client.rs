//! # Telemetry client façade.
//!
//! [`Client`] is the entry point applications use to record traces, spans,
//! generations, point events, scores, and SDK logs. Every helper validates
//! and normalizes its entity (ids, default observation types, parent
//! links), wraps it in an [`IngestionEvent`] envelope, and hands it to the
//! buffered [`Observer`](crate::Observer); nothing touches the network on
//! the caller's thread.
//!
//! ## Event flow
//! ```text
//! client.span(...) ──► validate + normalize ──► IngestionEvent envelope
//!                                                  │
//!                                       Observer::dispatch (buffered)
//!                                                  │
//!                            background flush loop ──► Sink::deliver(batch)
//! ```
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use telebatch::{BoxError, Client, IngestionEvent, SinkFn, Trace};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sink = SinkFn::arc(|_ctx: CancellationToken, batch: Vec<IngestionEvent>| async move {
//!         println!("delivering {} envelopes", batch.len());
//!         Ok::<_, BoxError>(())
//!     });
//!
//!     let client = Client::new(CancellationToken::new(), sink)
//!         .with_flush_interval(Duration::from_millis(200));
//!
//!     client.trace(Trace {
//!         name: Some("checkout".into()),
//!         ..Trace::default()
//!     })?;
//!
//!     // guarantees the buffered envelope reached the sink
//!     client.flush().await;
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::config::ObserverConfig;
use crate::dispatch::Observer;
use crate::error::ClientError;
use crate::events::{
    Event, EventBody, Generation, IngestionEvent, IngestionEventType, Observation,
    ObservationType, Score, SdkLog, Span, Trace,
};
use crate::sink::SinkRef;

/// Default flush interval applied by the client.
///
/// Tighter than the dispatcher's own 1s default; telemetry should leave the
/// process quickly without flushing on every single event.
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_millis(500);

/// Buffering telemetry client.
///
/// Helpers return the normalized entity (ids filled, defaults applied) so
/// callers can chain follow-up calls like
/// [`span_end`](Client::span_end) or attach children via the returned ids.
pub struct Client {
    flush_interval: Duration,
    observer: Observer<IngestionEvent>,
}

impl Client {
    /// Creates a client and starts its background dispatch loop.
    ///
    /// Must be called from within a Tokio runtime. The loop runs until
    /// [`flush`](Self::flush) completes or `ctx` is cancelled.
    pub fn new(ctx: CancellationToken, sink: SinkRef<IngestionEvent>) -> Self {
        Self::with_config(
            ctx,
            sink,
            ObserverConfig {
                tick: DEFAULT_FLUSH_INTERVAL,
                ..ObserverConfig::default()
            },
        )
    }

    /// Creates a client with explicit dispatcher settings.
    pub fn with_config(
        ctx: CancellationToken,
        sink: SinkRef<IngestionEvent>,
        cfg: ObserverConfig,
    ) -> Self {
        Self {
            flush_interval: cfg.tick,
            observer: Observer::with_config(ctx, sink, cfg),
        }
    }

    /// Changes the automatic flush interval; returns self for chaining.
    pub fn with_flush_interval(mut self, interval: Duration) -> Self {
        self.flush_interval = interval;
        self.observer.with_tick(interval);
        self
    }

    /// Currently configured flush interval.
    pub fn flush_interval(&self) -> Duration {
        self.flush_interval
    }

    /// Records a trace, filling a missing id.
    pub fn trace(&self, mut trace: Trace) -> Result<Trace, ClientError> {
        trace.id = Some(ensure_id(trace.id.take()));
        self.emit(IngestionEventType::TraceCreate, trace.clone());
        Ok(trace)
    }

    /// Records the start of a span.
    ///
    /// Creates a parent trace (named after the span) when `trace_id` is
    /// unset; defaults the observation type to `SPAN`; fills a missing id;
    /// links `parent_id` when given.
    pub fn span(&self, mut span: Span, parent_id: Option<&str>) -> Result<Span, ClientError> {
        if is_unset(&span.trace_id) {
            span.trace_id = Some(self.create_trace(span.name.clone())?);
        }
        if span.observation_type.is_none() {
            span.observation_type = Some(ObservationType::Span);
        }
        span.id = Some(ensure_id(span.id.take()));
        if let Some(parent) = parent_id {
            span.parent_observation_id = Some(parent.to_owned());
        }
        self.emit(IngestionEventType::SpanCreate, span.clone());
        Ok(span)
    }

    /// Records the completion of a previously started span.
    ///
    /// Requires both the span id and its trace id.
    pub fn span_end(&self, mut span: Span) -> Result<Span, ClientError> {
        if is_unset(&span.id) {
            return Err(ClientError::MissingId { entity: "span" });
        }
        if is_unset(&span.trace_id) {
            return Err(ClientError::MissingTraceId);
        }
        if span.observation_type.is_none() {
            span.observation_type = Some(ObservationType::Span);
        }
        self.emit(IngestionEventType::SpanUpdate, span.clone());
        Ok(span)
    }

    /// Records the start of a model generation.
    ///
    /// Same normalization as [`span`](Self::span), with observation type
    /// defaulting to `GENERATION`.
    pub fn generation(
        &self,
        mut generation: Generation,
        parent_id: Option<&str>,
    ) -> Result<Generation, ClientError> {
        if is_unset(&generation.trace_id) {
            generation.trace_id = Some(self.create_trace(generation.name.clone())?);
        }
        if generation.observation_type.is_none() {
            generation.observation_type = Some(ObservationType::Generation);
        }
        generation.id = Some(ensure_id(generation.id.take()));
        if let Some(parent) = parent_id {
            generation.parent_observation_id = Some(parent.to_owned());
        }
        self.emit(IngestionEventType::GenerationCreate, generation.clone());
        Ok(generation)
    }

    /// Records the completion of a previously started generation.
    pub fn generation_end(&self, mut generation: Generation) -> Result<Generation, ClientError> {
        if is_unset(&generation.id) {
            return Err(ClientError::MissingId {
                entity: "generation",
            });
        }
        if is_unset(&generation.trace_id) {
            return Err(ClientError::MissingTraceId);
        }
        if generation.observation_type.is_none() {
            generation.observation_type = Some(ObservationType::Generation);
        }
        self.emit(IngestionEventType::GenerationUpdate, generation.clone());
        Ok(generation)
    }

    /// Records a point-in-time event within a trace.
    pub fn event(&self, mut event: Event, parent_id: Option<&str>) -> Result<Event, ClientError> {
        if is_unset(&event.trace_id) {
            event.trace_id = Some(self.create_trace(event.name.clone())?);
        }
        if event.observation_type.is_none() {
            event.observation_type = Some(ObservationType::Event);
        }
        event.id = Some(ensure_id(event.id.take()));
        if let Some(parent) = parent_id {
            event.parent_observation_id = Some(parent.to_owned());
        }
        self.emit(IngestionEventType::EventCreate, event.clone());
        Ok(event)
    }

    /// Records a generic observation when the specialized helpers do not
    /// fit. The observation type defaults to `SPAN`.
    pub fn observation(
        &self,
        mut observation: Observation,
        parent_id: Option<&str>,
    ) -> Result<Observation, ClientError> {
        if is_unset(&observation.trace_id) {
            observation.trace_id = Some(self.create_trace(observation.name.clone())?);
        }
        if observation.observation_type.is_none() {
            observation.observation_type = Some(ObservationType::Span);
        }
        observation.id = Some(ensure_id(observation.id.take()));
        if let Some(parent) = parent_id {
            observation.parent_observation_id = Some(parent.to_owned());
        }
        self.emit(IngestionEventType::ObservationCreate, observation.clone());
        Ok(observation)
    }

    /// Updates a generic observation. The id and trace id are required.
    pub fn observation_update(
        &self,
        mut observation: Observation,
    ) -> Result<Observation, ClientError> {
        if is_unset(&observation.id) {
            return Err(ClientError::MissingId {
                entity: "observation",
            });
        }
        if is_unset(&observation.trace_id) {
            return Err(ClientError::MissingTraceId);
        }
        if observation.observation_type.is_none() {
            observation.observation_type = Some(ObservationType::Span);
        }
        self.emit(IngestionEventType::ObservationUpdate, observation.clone());
        Ok(observation)
    }

    /// Records a score. The trace id is required; a missing score id is
    /// filled.
    pub fn score(&self, mut score: Score) -> Result<Score, ClientError> {
        if is_unset(&score.trace_id) {
            return Err(ClientError::MissingTraceId);
        }
        score.id = Some(ensure_id(score.id.take()));
        self.emit(IngestionEventType::ScoreCreate, score.clone());
        Ok(score)
    }

    /// Sends a diagnostic SDK log payload.
    pub fn sdk_log(&self, log: SdkLog) -> Result<SdkLog, ClientError> {
        self.emit(IngestionEventType::SdkLog, log.clone());
        Ok(log)
    }

    /// Flushes and waits until every buffered envelope has been handed to
    /// the sink. Terminal; call once at shutdown.
    ///
    /// # Panics
    /// Panics when called a second time, or after the construction token
    /// was cancelled (see [`Observer::wait`]).
    pub async fn flush(&self) {
        self.observer.wait().await;
    }

    /// Creates an implicit parent trace and returns its id.
    fn create_trace(&self, name: Option<String>) -> Result<String, ClientError> {
        let trace = self.trace(Trace {
            name,
            ..Trace::default()
        })?;
        Ok(trace.id.unwrap_or_default())
    }

    /// Wraps a body in an envelope and enqueues it.
    fn emit(&self, event_type: IngestionEventType, body: impl Into<EventBody>) {
        self.observer.dispatch(IngestionEvent {
            event_type,
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            metadata: None,
            body: body.into(),
        });
    }
}

/// Keeps a caller-provided id, replaces a missing or empty one.
fn ensure_id(id: Option<String>) -> String {
    match id {
        Some(id) if !id.is_empty() => id,
        _ => Uuid::new_v4().to_string(),
    }
}

/// Treats `None` and `Some("")` alike: both mean the field was never set.
fn is_unset(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}
