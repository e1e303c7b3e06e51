//! # Handler: the single authoritative flush loop.
//!
//! One [`Handler`] task owns the decision of when the sink is invoked.
//! Producers never talk to the sink; they append to the queue and, at most,
//! send a command. All state transitions are serialized through this loop.
//!
//! ## Event flow
//! ```text
//! producers ──► Queue::push (lock-protected, returns immediately)
//!
//! loop {
//!   select! {
//!     ├─ tick fired            ──► spawn deliver() (fire-and-forget)
//!     ├─ Command::Flush        ──► deliver().await (inline)
//!     ├─ Command::FlushAndWait ──► deliver().await
//!     │                            join in-flight deliveries
//!     │                            ack caller, exit loop
//!     ├─ tick period updated   ──► replace ticker (no immediate flush)
//!     └─ token cancelled       ──► deliver().await, join, exit loop
//!   }
//! }
//! ```
//!
//! ## Rules
//! - Tick-triggered deliveries are **not** serialized with each other; a
//!   slow sink overlapping the next tick is an accepted tradeoff. The
//!   alternative (serializing them) would let one slow sink call delay the
//!   reaction to a flush-and-wait.
//! - Command-triggered deliveries run inline, so they are serialized with
//!   respect to ticks and other commands.
//! - The batch captured by each delivery preserves enqueue order; wall-clock
//!   send order across overlapping deliveries is not guaranteed.
//! - Flush-and-wait is terminal: it joins every outstanding tick-triggered
//!   delivery before acknowledging, so no delivery is still in flight when
//!   the waiting caller resumes.

use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinSet;
use tokio::time::{self, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::dispatch::queue::Queue;
use crate::sink::SinkRef;

/// Control messages consumed by the handler loop.
pub(crate) enum Command {
    /// Drain and deliver, then keep running.
    Flush,
    /// Drain, deliver, join in-flight deliveries, ack, and stop. Terminal.
    FlushAndWait(oneshot::Sender<()>),
}

/// Background loop reacting to ticks, commands, and period updates.
pub(crate) struct Handler<T> {
    pub(crate) queue: Arc<Queue<T>>,
    pub(crate) sink: SinkRef<T>,
    pub(crate) commands: mpsc::Receiver<Command>,
    pub(crate) tick: watch::Receiver<Duration>,
}

impl<T: Send + 'static> Handler<T> {
    /// Runs the loop until flush-and-wait, cancellation, or the owning
    /// observer is dropped.
    pub(crate) async fn run(mut self, ctx: CancellationToken) {
        let mut ticker = new_ticker(*self.tick.borrow_and_update());
        let mut inflight: JoinSet<()> = JoinSet::new();

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    inflight.spawn(deliver(
                        Arc::clone(&self.queue),
                        Arc::clone(&self.sink),
                        ctx.clone(),
                    ));
                    // reap finished fire-and-forget deliveries
                    while inflight.try_join_next().is_some() {}
                }
                cmd = self.commands.recv() => {
                    let Some(cmd) = cmd else {
                        debug!("observer dropped without wait, dispatch loop exiting");
                        break;
                    };
                    match cmd {
                        Command::Flush => {
                            deliver(
                                Arc::clone(&self.queue),
                                Arc::clone(&self.sink),
                                ctx.clone(),
                            )
                            .await;
                        }
                        Command::FlushAndWait(ack) => {
                            deliver(
                                Arc::clone(&self.queue),
                                Arc::clone(&self.sink),
                                ctx.clone(),
                            )
                            .await;
                            while inflight.join_next().await.is_some() {}
                            let _ = ack.send(());
                            break;
                        }
                    }
                }
                changed = self.tick.changed() => {
                    if changed.is_err() {
                        debug!("observer dropped without wait, dispatch loop exiting");
                        break;
                    }
                    ticker = new_ticker(*self.tick.borrow_and_update());
                }
                _ = ctx.cancelled() => {
                    self.shutdown_on_cancel(&ctx, &mut inflight).await;
                    break;
                }
            }
        }
    }

    /// Final drain on external cancellation.
    ///
    /// Not the documented clean-shutdown path (that is flush-and-wait), but
    /// events already enqueued are still handed to the sink, and any caller
    /// whose flush-and-wait raced the cancellation is acknowledged.
    async fn shutdown_on_cancel(&mut self, ctx: &CancellationToken, inflight: &mut JoinSet<()>) {
        self.commands.close();

        deliver(Arc::clone(&self.queue), Arc::clone(&self.sink), ctx.clone()).await;
        while inflight.join_next().await.is_some() {}

        while let Ok(cmd) = self.commands.try_recv() {
            if let Command::FlushAndWait(ack) = cmd {
                let _ = ack.send(());
            }
        }
    }
}

/// Builds the flush timer.
///
/// The first fire is one full period away; a missed tick is delayed rather
/// than bursted. The period is clamped to a minimum of 1ms.
fn new_ticker(period: Duration) -> Interval {
    let period = period.max(Duration::from_millis(1));
    let mut ticker = time::interval_at(time::Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

/// One drain-and-deliver cycle.
///
/// The sink is always invoked, even with an empty batch; the sink decides
/// whether that is a no-op. Errors are logged and swallowed, never retried.
/// A panicking sink is caught so it cannot take the dispatch loop down.
async fn deliver<T: Send + 'static>(queue: Arc<Queue<T>>, sink: SinkRef<T>, ctx: CancellationToken) {
    let batch = queue.drain();
    let count = batch.len();

    let call = sink.deliver(ctx, batch);
    match std::panic::AssertUnwindSafe(call).catch_unwind().await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => {
            warn!(sink = sink.name(), count, error = %err, "batch delivery failed, batch discarded");
        }
        Err(panic_err) => {
            let info = {
                let any = &*panic_err;
                if let Some(msg) = any.downcast_ref::<&'static str>() {
                    (*msg).to_string()
                } else if let Some(msg) = any.downcast_ref::<String>() {
                    msg.clone()
                } else {
                    "unknown panic".to_string()
                }
            };
            error!(sink = sink.name(), count, panic = %info, "sink panicked during delivery");
        }
    }
}
