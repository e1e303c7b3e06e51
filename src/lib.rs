//! # telebatch
//!
//! **telebatch** is a client-side buffering and batch-dispatch library for
//! telemetry pipelines.
//!
//! Callers enqueue typed events (traces, spans, generations, scores, SDK
//! logs) at arbitrary rates from arbitrary tasks; a background loop
//! accumulates them and periodically, or on demand, flushes accumulated
//! batches to a downstream sink, without blocking producers and without
//! losing events during shutdown.
//!
//! ## Architecture
//! ```text
//!  producer tasks (any number)
//!    │ Client::trace / span / generation / score / ...
//!    │      (validate, fill ids, wrap in IngestionEvent)
//!    ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │ Observer<T>  (public façade, one per client)                │
//! │   dispatch ──► Queue<T>   (lock-protected append, O(1))     │
//! │   with_tick ─► watch chan (latest-wins period updates)      │
//! │   flush/wait ► command chan                                 │
//! └──────┬──────────────────────────────────────────────────────┘
//!        ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │ Handler loop (one background task)                          │
//! │   select! {                                                 │
//! │     tick      → spawn deliver()   (fire-and-forget)         │
//! │     Flush     → deliver().await   (inline)                  │
//! │     Wait      → deliver().await, join in-flight, ack, stop  │
//! │     new tick  → replace timer                               │
//! │     cancelled → final deliver(), join, stop                 │
//! │   }                                                         │
//! └──────┬──────────────────────────────────────────────────────┘
//!        ▼
//!   Sink::deliver(ctx, batch)   (injected; HTTP, file, test, ...)
//! ```
//!
//! ## Guarantees
//! - `dispatch` never blocks on network or timer state.
//! - A batch preserves the enqueue order of the events it contains, and no
//!   event is ever handed to more than one delivery.
//! - [`Observer::wait`] (or [`Client::flush`]) returns only after every
//!   buffered event, including in-flight tick-triggered deliveries, has
//!   been handed to the sink and the sink calls have returned.
//! - Sink failures are logged and the batch discarded; the core never
//!   retries, requeues, or persists.
//!
//! ## Features
//! | Area            | Description                                             | Key types                        |
//! |-----------------|---------------------------------------------------------|----------------------------------|
//! | **Dispatch**    | Buffered fan-in with a ticking background flush loop.   | [`Observer`]                     |
//! | **Sinks**       | Pluggable async delivery boundary.                      | [`Sink`], [`SinkFn`]             |
//! | **Client**      | Telemetry façade: entity validation, ids, envelopes.    | [`Client`]                       |
//! | **Data model**  | Ingestion envelope and entity wire types.               | [`IngestionEvent`], [`Trace`], … |
//! | **Buffering**   | Unbounded by default, optional bound + overflow policy. | [`BufferPolicy`]                 |
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use telebatch::{BoxError, Client, IngestionEvent, Score, SinkFn, Span};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sink = SinkFn::arc(|_ctx: CancellationToken, batch: Vec<IngestionEvent>| async move {
//!         // serialize and POST the batch here
//!         let _ = serde_json::to_string(&batch)?;
//!         Ok::<_, BoxError>(())
//!     });
//!
//!     let client = Client::new(CancellationToken::new(), sink)
//!         .with_flush_interval(Duration::from_millis(200));
//!
//!     let span = client.span(
//!         Span {
//!             name: Some("retrieval".into()),
//!             ..Span::default()
//!         },
//!         None,
//!     )?;
//!
//!     client.score(Score {
//!         trace_id: span.trace_id.clone(),
//!         name: Some("relevance".into()),
//!         value: Some(0.87.into()),
//!         ..Score::default()
//!     })?;
//!
//!     client.span_end(span)?;
//!
//!     // terminal: everything buffered reaches the sink before this returns
//!     client.flush().await;
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod dispatch;
mod error;
mod events;
mod sink;

// ---- Public re-exports ----

pub use client::{Client, DEFAULT_FLUSH_INTERVAL};
pub use config::{BufferPolicy, ObserverConfig, OverflowPolicy, DEFAULT_TICK_PERIOD};
pub use dispatch::Observer;
pub use error::ClientError;
pub use events::{
    Event, EventBody, Generation, IngestionEvent, IngestionEventType, ModelUsageUnit, Observation,
    ObservationLevel, ObservationType, Score, ScoreDataType, SdkLog, Span, Trace, Usage,
};
pub use sink::{BoxError, Sink, SinkFn, SinkRef};
