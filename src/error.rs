//! Error types used by the telemetry client.
//!
//! The dispatch core itself has no recoverable error paths (sink failures
//! are logged and swallowed, usage errors panic); [`ClientError`] covers
//! validation of entities before they are enqueued.

use thiserror::Error;

/// # Errors produced by entity validation.
///
/// Returned by the [`Client`](crate::Client) update helpers when a required
/// reference is missing. Nothing is enqueued when validation fails.
#[non_exhaustive]
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ClientError {
    /// An update was issued for an entity that has no id yet.
    ///
    /// Update events address an existing entity; without an id the backend
    /// could not resolve the target.
    #[error("{entity} id is required")]
    MissingId {
        /// Which entity kind the update addressed.
        entity: &'static str,
    },

    /// The entity does not reference a trace.
    ///
    /// Scores and update events must point at the trace they belong to;
    /// create events fall back to creating a parent trace instead.
    #[error("trace id is required")]
    MissingTraceId,
}
