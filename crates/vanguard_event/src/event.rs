//! Scheduled events and invocation reports.

use core::any::Any;
use core::fmt;
use std::sync::Arc;

use vanguard_curve::SimTime;

use crate::error::EventError;
use crate::handler::{ErasedHandler, TargetId, TriggerType};

/// Identity of a scheduled event.
///
/// Ids are handed out in creation order and double as the tie-break for
/// events predicted at the same time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventId(pub(crate) u64);

impl EventId {
    /// Returns the raw id value.
    #[must_use]
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "event_{}", self.0)
    }
}

/// A registered event.
pub(crate) struct Event<S> {
    pub(crate) id: EventId,
    pub(crate) handler: Arc<dyn ErasedHandler<S>>,
    pub(crate) target: TargetId,
    pub(crate) params: Box<dyn Any + Send + Sync>,
    pub(crate) trigger: TriggerType,
    /// Lower bound handed to predictions.
    pub(crate) not_before: SimTime,
    /// Current prediction. [`SimTime::MAX`] means parked.
    pub(crate) time: SimTime,
    pub(crate) depends: Vec<TargetId>,
}

impl<S> Event<S> {
    pub(crate) fn key(&self) -> (SimTime, u64) {
        (self.time, self.id.0)
    }

    pub(crate) fn is_parked(&self) -> bool {
        self.time == SimTime::MAX
    }
}

impl<S> fmt::Debug for Event<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("id", &self.id)
            .field("handler", &self.handler.id())
            .field("target", &self.target)
            .field("trigger", &self.trigger)
            .field("time", &self.time)
            .finish_non_exhaustive()
    }
}

/// A failed invocation collected during [`reach_time`](crate::EventLoop::reach_time).
#[derive(Debug)]
pub struct EventFailure {
    /// The event that failed.
    pub event: EventId,
    /// What went wrong.
    pub error: EventError,
}

/// Summary of a [`reach_time`](crate::EventLoop::reach_time) call.
#[derive(Debug, Default)]
pub struct ReachReport {
    /// Number of events invoked.
    pub invoked: usize,
    /// Invocations that returned an error.
    pub failures: Vec<EventFailure>,
}

impl ReachReport {
    /// Returns `true` if no invocation failed.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }

    /// Folds another report into this one.
    pub fn merge(&mut self, other: ReachReport) {
        self.invoked += other.invoked;
        self.failures.extend(other.failures);
    }
}
