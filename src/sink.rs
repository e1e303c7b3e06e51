//! # Sink: the downstream delivery boundary.
//!
//! [`Sink`] is the single external boundary of the dispatch core. The
//! background loop hands every drained batch to the sink and forgets about
//! it; the sink owns serialization, transport, and its own error reporting.
//!
//! ## Contract
//! - The sink receives **every** flush, including empty batches. It decides
//!   whether an empty batch is a no-op.
//! - A returned error is logged by the dispatch loop and the batch is
//!   discarded. The core never retries, backs off, or requeues.
//! - The [`CancellationToken`] passed to `deliver` is the one the owning
//!   [`Observer`](crate::Observer) was constructed with; transports can use
//!   it to abort in-flight requests on shutdown.
//! - Tick-triggered deliveries may run concurrently with each other when the
//!   sink is slow relative to the tick period. Implementations must be safe
//!   to call concurrently.
//!
//! ## Example
//! ```rust
//! use tokio_util::sync::CancellationToken;
//! use telebatch::{BoxError, Sink, SinkFn, SinkRef};
//!
//! let sink: SinkRef<String> = SinkFn::arc(|_ctx: CancellationToken, batch: Vec<String>| async move {
//!     for line in &batch {
//!         println!("{line}");
//!     }
//!     Ok::<_, BoxError>(())
//! });
//! assert_eq!(sink.name(), "sink_fn");
//! ```

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Boxed error type returned by sink implementations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Shared handle to a sink.
pub type SinkRef<T> = Arc<dyn Sink<T>>;

/// Contract for batch delivery.
///
/// Called from the dispatch loop or from fire-and-forget delivery tasks.
/// Implementations should avoid blocking the async runtime (prefer async
/// I/O and cooperative waits).
#[async_trait]
pub trait Sink<T>: Send + Sync + 'static {
    /// Attempts a single delivery of one batch.
    ///
    /// The outcome is used for logging only; a failed batch is not retried.
    async fn deliver(&self, ctx: CancellationToken, batch: Vec<T>) -> Result<(), BoxError>;

    /// Human-readable name (for logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Function-backed sink implementation.
///
/// Wraps a closure that *creates* a new delivery future per batch.
#[derive(Debug)]
pub struct SinkFn<F> {
    f: F,
}

impl<F> SinkFn<F> {
    /// Creates a new function-backed sink.
    ///
    /// Prefer [`SinkFn::arc`] when you immediately need a [`SinkRef`].
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Creates the sink and returns it as a shared handle.
    ///
    /// ## Example
    /// ```rust
    /// use tokio_util::sync::CancellationToken;
    /// use telebatch::{BoxError, SinkFn, SinkRef};
    ///
    /// let sink: SinkRef<u64> = SinkFn::arc(|_ctx: CancellationToken, _batch: Vec<u64>| async {
    ///     Ok::<_, BoxError>(())
    /// });
    /// ```
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self::new(f))
    }
}

#[async_trait]
impl<T, F, Fut> Sink<T> for SinkFn<F>
where
    T: Send + 'static,
    F: Fn(CancellationToken, Vec<T>) -> Fut + Send + Sync + 'static, // Fn, not FnMut
    Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
{
    async fn deliver(&self, ctx: CancellationToken, batch: Vec<T>) -> Result<(), BoxError> {
        (self.f)(ctx, batch).await
    }

    fn name(&self) -> &'static str {
        "sink_fn"
    }
}
