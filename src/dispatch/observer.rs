//! # Observer: the public face of the dispatch core.
//!
//! An [`Observer`] pairs a queue with a background [`Handler`] loop started
//! at construction. Producers call [`Observer::dispatch`] from any task or
//! thread; at shutdown, [`Observer::wait`] guarantees every buffered event
//! has been handed to the sink before returning.
//!
//! ## Architecture
//! ```text
//! producer ──► Observer::dispatch ──► Queue::push       (never blocks on I/O)
//!                                        │
//!                   tick / flush ──► Handler loop ──► Queue::drain ──► Sink::deliver
//!                                        ▲
//! Observer::with_tick ── watch channel ──┘
//! Observer::wait ────── FlushAndWait ────┘  (terminal, acks when done)
//! ```
//!
//! ## Shutdown contract
//! The documented clean-shutdown path is [`Observer::wait`]: it flushes
//! everything enqueued up to the moment the command was issued, joins every
//! still-in-flight tick-triggered delivery, and only then returns.
//! Cancelling the construction token also stops the loop after a final
//! drain, as a hardening path; dropping the observer without either simply
//! stops the loop and abandons whatever is still buffered.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio_util::sync::CancellationToken;

use crate::config::ObserverConfig;
use crate::dispatch::handler::{Command, Handler};
use crate::dispatch::queue::Queue;
use crate::sink::SinkRef;

/// Buffered dispatcher with a background flush loop.
///
/// Generic over the event payload `T`; the dispatcher only moves values and
/// never inspects them.
pub struct Observer<T> {
    queue: Arc<Queue<T>>,
    commands: mpsc::Sender<Command>,
    tick: watch::Sender<Duration>,
}

impl<T: Send + 'static> Observer<T> {
    /// Creates an observer with default settings and starts its loop.
    ///
    /// Must be called from within a Tokio runtime. The loop runs until
    /// [`wait`](Self::wait) completes or `ctx` is cancelled.
    pub fn new(ctx: CancellationToken, sink: SinkRef<T>) -> Self {
        Self::with_config(ctx, sink, ObserverConfig::default())
    }

    /// Creates an observer with explicit settings and starts its loop.
    pub fn with_config(ctx: CancellationToken, sink: SinkRef<T>, cfg: ObserverConfig) -> Self {
        let queue = Arc::new(Queue::new(cfg.buffer));
        let (command_tx, command_rx) = mpsc::channel(1);
        let (tick_tx, tick_rx) = watch::channel(cfg.tick);

        let handler = Handler {
            queue: Arc::clone(&queue),
            sink,
            commands: command_rx,
            tick: tick_rx,
        };
        tokio::spawn(handler.run(ctx));

        Self {
            queue,
            commands: command_tx,
            tick: tick_tx,
        }
    }

    /// Enqueues one event.
    ///
    /// Never blocks on network or timer state; the event sits in the queue
    /// until the next tick, flush, or wait.
    ///
    /// # Panics
    /// Panics if the dispatcher has already stopped (a completed
    /// [`wait`](Self::wait) or a cancelled construction token). Dispatching
    /// after shutdown is a usage error: the event could never be delivered.
    pub fn dispatch(&self, event: T) {
        assert!(
            !self.commands.is_closed(),
            "event dispatched after the dispatcher stopped"
        );
        self.queue.push(event);
    }

    /// Updates the automatic flush interval.
    ///
    /// Latest-wins and non-blocking: the loop picks the new period up on its
    /// next iteration, replaces the timer, and fires one full new period
    /// later. No immediate flush is triggered. Returns `&Self` for chained
    /// configuration.
    pub fn with_tick(&self, period: Duration) -> &Self {
        // send only fails once the loop is gone; a period update after
        // shutdown has nothing left to reschedule
        let _ = self.tick.send(period);
        self
    }

    /// Triggers a drain-and-deliver cycle outside the tick schedule.
    ///
    /// Fire-and-forget: returns once the loop has accepted the command, not
    /// when the sink call completes. Use [`wait`](Self::wait) for completion.
    ///
    /// # Panics
    /// Panics if the dispatcher has already stopped.
    pub async fn flush(&self) {
        if self.commands.send(Command::Flush).await.is_err() {
            panic!("flush requested after the dispatcher stopped");
        }
    }

    /// Flushes and waits for completion. Terminal.
    ///
    /// Blocks the calling task until the final batch, everything enqueued up
    /// to the moment the command was issued, and every still-in-flight
    /// tick-triggered delivery have been handed to the sink and the sink
    /// calls have returned. This is the mechanism callers use at shutdown to
    /// guarantee no buffered event is lost.
    ///
    /// # Panics
    /// Exactly one `wait` is permitted per observer; a second call panics.
    pub async fn wait(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self
            .commands
            .send(Command::FlushAndWait(ack_tx))
            .await
            .is_err()
        {
            panic!("wait issued after the dispatcher already stopped");
        }
        // Err here means the loop exited through the cancellation path,
        // which performs its own final drain before dropping the ack.
        let _ = ack_rx.await;
    }
}
