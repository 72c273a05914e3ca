//! Error types for the event loop.

use vanguard_curve::SimTime;

use crate::event::EventId;
use crate::handler::{BoxError, TargetId};

/// Errors raised by the [`EventLoop`](crate::EventLoop).
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    /// No handler with this id was added to the loop.
    #[error("no event handler registered with id '{0}'")]
    HandlerNotRegistered(String),

    /// A handler with this id was already added.
    #[error("event handler '{0}' is already registered")]
    DuplicateHandler(&'static str),

    /// The loop was asked to go back in time.
    #[error("cannot reach {requested}: event loop is already at {now}")]
    TimeRegression {
        /// The requested time.
        requested: SimTime,
        /// The loop's current time.
        now: SimTime,
    },

    /// The event is not (or no longer) registered.
    #[error("event {0} not found")]
    EventNotFound(EventId),

    /// Event parameters do not match the handler's parameter type.
    #[error("handler '{handler}' expects parameters of type {expected}")]
    ParamsMismatch {
        /// The handler id.
        handler: &'static str,
        /// Name of the expected parameter type.
        expected: &'static str,
    },

    /// A handler invocation failed.
    #[error("handler '{handler}' failed for {target} at {time}: {source}")]
    Handler {
        /// The handler id.
        handler: &'static str,
        /// The event target.
        target: TargetId,
        /// The invocation time.
        time: SimTime,
        /// The underlying failure.
        #[source]
        source: BoxError,
    },
}
