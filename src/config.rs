//! # Dispatcher configuration.
//!
//! Provides [`ObserverConfig`], the settings applied when an
//! [`Observer`](crate::Observer) is constructed, plus the buffering policies
//! that control how the internal queue behaves under load.
//!
//! ## Field semantics
//! - `tick`: interval between automatic flushes (min 1ms; clamped)
//! - `buffer`: [`BufferPolicy::Unbounded`] (default) or
//!   [`BufferPolicy::Bounded`] with an explicit [`OverflowPolicy`]

use std::time::Duration;

/// Default interval between automatic flushes.
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(1);

/// What to do with an incoming event when a bounded queue is full.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// Evict the oldest buffered event to make room for the new one.
    ///
    /// Keeps the most recent events; useful when fresh telemetry matters
    /// more than history.
    DropOldest,

    /// Discard the incoming event and keep the buffer as-is.
    ///
    /// Keeps the oldest events; useful when earlier context matters more
    /// than the latest samples.
    DropNewest,
}

/// Buffering mode for the dispatch queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferPolicy {
    /// No cap on buffered events.
    ///
    /// `dispatch` can never lose an event, at the cost of unbounded memory
    /// growth if the sink is permanently unavailable.
    Unbounded,

    /// At most `capacity` buffered events; overflow handled per `overflow`.
    ///
    /// Dropped events are counted and logged. Minimum capacity is 1
    /// (clamped).
    Bounded {
        /// Maximum number of events held between flushes.
        capacity: usize,
        /// What to do with an event that does not fit.
        overflow: OverflowPolicy,
    },
}

/// Settings for a new [`Observer`](crate::Observer).
///
/// ### Notes
/// The tick period can also be changed later, any number of times, via
/// [`Observer::with_tick`](crate::Observer::with_tick). The buffer policy is
/// fixed for the observer's lifetime.
#[derive(Clone, Copy, Debug)]
pub struct ObserverConfig {
    /// Interval between automatic flushes.
    pub tick: Duration,
    /// Buffering mode for the internal queue.
    pub buffer: BufferPolicy,
}

impl Default for ObserverConfig {
    /// Default configuration:
    ///
    /// - `tick = 1s` ([`DEFAULT_TICK_PERIOD`])
    /// - `buffer = BufferPolicy::Unbounded`
    fn default() -> Self {
        Self {
            tick: DEFAULT_TICK_PERIOD,
            buffer: BufferPolicy::Unbounded,
        }
    }
}
