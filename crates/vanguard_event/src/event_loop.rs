//! The discrete-event scheduler.

use core::any::Any;
use core::fmt;
use std::collections::BTreeMap;
use std::sync::Arc;

use hashbrown::HashMap;
use tracing::{debug, trace, warn};
use vanguard_curve::SimTime;

use crate::error::EventError;
use crate::event::{Event, EventFailure, EventId, ReachReport};
use crate::handler::{ErasedHandler, EventHandler, HandlerBox, TargetId, TriggerType};

/// Global scheduler invoking events in predicted-time order.
///
/// Events are kept in a single ordered structure keyed by
/// `(predicted time, creation order)`. [`reach_time`](Self::reach_time)
/// repeatedly invokes the earliest due event until none is left at or before
/// the requested time. Handlers receive the loop itself and may create,
/// cancel or reschedule events while being invoked; events created for the
/// current time run within the same call.
///
/// Predictions are recomputed by
/// [`reschedule_on_change`](Self::reschedule_on_change) instead of polling,
/// so an idle simulation costs nothing.
pub struct EventLoop<S> {
    handlers: HashMap<&'static str, Arc<dyn ErasedHandler<S>>>,
    events: HashMap<EventId, Event<S>>,
    queue: BTreeMap<(SimTime, u64), EventId>,
    dependents: HashMap<TargetId, Vec<EventId>>,
    next_id: u64,
    now: SimTime,
}

impl<S: 'static> EventLoop<S> {
    /// Creates an empty loop positioned at [`SimTime::MIN`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            events: HashMap::new(),
            queue: BTreeMap::new(),
            dependents: HashMap::new(),
            next_id: 0,
            now: SimTime::MIN,
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Handlers
    // ─────────────────────────────────────────────────────────────────────

    /// Adds an event handler.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::DuplicateHandler`] if a handler with the same id
    /// is already registered.
    pub fn add_event_handler<H: EventHandler<S>>(&mut self, handler: H) -> Result<(), EventError> {
        let id = handler.id();
        if self.handlers.contains_key(id) {
            return Err(EventError::DuplicateHandler(id));
        }
        debug!(handler = id, "event handler registered");
        self.handlers.insert(id, Arc::new(HandlerBox(handler)));
        Ok(())
    }

    /// Returns `true` if a handler with this id is registered.
    #[must_use]
    pub fn has_handler(&self, id: &str) -> bool {
        self.handlers.contains_key(id)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Events
    // ─────────────────────────────────────────────────────────────────────

    /// Schedules a new event of handler `handler_id` for `target`.
    ///
    /// `not_before` is handed to the handler's prediction. `Dependency` and
    /// `Trigger` events depend on their target; `Trigger` events stay parked
    /// until that target changes.
    ///
    /// # Errors
    ///
    /// - [`EventError::HandlerNotRegistered`] for an unknown handler id.
    /// - [`EventError::ParamsMismatch`] if `params` is not the handler's
    ///   parameter type.
    pub fn create_event<P: Send + Sync + 'static>(
        &mut self,
        handler_id: &str,
        target: TargetId,
        state: &S,
        not_before: SimTime,
        params: P,
    ) -> Result<EventId, EventError> {
        let handler = self
            .handlers
            .get(handler_id)
            .cloned()
            .ok_or_else(|| EventError::HandlerNotRegistered(handler_id.to_owned()))?;
        if handler.params_type() != core::any::TypeId::of::<P>() {
            return Err(EventError::ParamsMismatch {
                handler: handler.id(),
                expected: handler.params_type_name(),
            });
        }

        let id = EventId(self.next_id);
        self.next_id += 1;

        let trigger = handler.trigger();
        let depends = match trigger {
            TriggerType::Dependency | TriggerType::Trigger => vec![target],
            TriggerType::Once | TriggerType::Repeat => Vec::new(),
        };
        for dependency in &depends {
            self.dependents.entry(*dependency).or_default().push(id);
        }

        let predicted = match trigger {
            TriggerType::Trigger => SimTime::MAX,
            _ => handler.predict(target, state, not_before),
        };
        let params: Box<dyn Any + Send + Sync> = Box::new(params);
        let mut event = Event {
            id,
            handler,
            target,
            params,
            trigger,
            not_before,
            time: SimTime::MAX,
            depends,
        };
        place(&mut self.queue, self.now, &mut event, predicted);
        trace!(
            event = %id,
            handler = event.handler.id(),
            target = %target,
            time = %event.time,
            "event created"
        );
        self.events.insert(id, event);
        Ok(id)
    }

    /// Makes `event` re-predict whenever `target` changes.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::EventNotFound`] if the event is not registered.
    pub fn depend_on(&mut self, event: EventId, target: TargetId) -> Result<(), EventError> {
        let entry = self
            .events
            .get_mut(&event)
            .ok_or(EventError::EventNotFound(event))?;
        if !entry.depends.contains(&target) {
            entry.depends.push(target);
            self.dependents.entry(target).or_default().push(event);
        }
        Ok(())
    }

    /// Removes a registered event. Returns `false` if it was not registered.
    pub fn cancel(&mut self, event: EventId) -> bool {
        let Some(removed) = self.events.remove(&event) else {
            return false;
        };
        if !removed.is_parked() {
            self.queue.remove(&removed.key());
        }
        self.forget(&removed);
        trace!(event = %event, "event cancelled");
        true
    }

    /// Recomputes the predictions of every event depending on `target`.
    ///
    /// `time` is when the change happened. `Dependency` and `Repeat` events
    /// re-predict, `Trigger` events are scheduled at `time`, `Once` events
    /// are left alone. Predictions before [`now`](Self::now) are clamped.
    ///
    /// Returns the number of events rescheduled.
    pub fn reschedule_on_change(&mut self, target: TargetId, state: &S, time: SimTime) -> usize {
        let Some(ids) = self.dependents.get_mut(&target) else {
            return 0;
        };
        ids.retain(|id| self.events.contains_key(id));

        let mut rescheduled = 0;
        for id in ids.iter() {
            let Some(event) = self.events.get_mut(id) else {
                continue;
            };
            let predicted = match event.trigger {
                TriggerType::Once => continue,
                TriggerType::Dependency | TriggerType::Repeat => {
                    event.handler.predict(event.target, state, event.not_before)
                }
                TriggerType::Trigger => time,
            };
            place(&mut self.queue, self.now, event, predicted);
            trace!(event = %id, target = %target, time = %event.time, "event rescheduled");
            rescheduled += 1;
        }
        rescheduled
    }

    /// Invokes every event due at or before `time`, in predicted-time order.
    ///
    /// Handler failures are logged and collected in the returned report; they
    /// never stop the loop. On return, [`now`](Self::now) equals `time`.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::TimeRegression`] if `time` is before
    /// [`now`](Self::now).
    pub fn reach_time(&mut self, time: SimTime, state: &mut S) -> Result<ReachReport, EventError> {
        if time < self.now {
            return Err(EventError::TimeRegression {
                requested: time,
                now: self.now,
            });
        }

        let mut report = ReachReport::default();
        while let Some(entry) = self.queue.first_entry() {
            if entry.key().0 > time {
                break;
            }
            let ((at, _), id) = entry.remove_entry();
            let Some(mut event) = self.events.remove(&id) else {
                continue;
            };
            // parked while in flight, so a reschedule from inside the handler
            // cannot queue it twice
            event.time = SimTime::MAX;
            self.now = at;

            debug!(
                event = %id,
                handler = event.handler.id(),
                target = %event.target,
                time = %at,
                "invoking event"
            );
            let result =
                event
                    .handler
                    .invoke_erased(self, event.target, state, at, event.params.as_ref());
            report.invoked += 1;
            if let Err(error) = result {
                warn!(event = %id, target = %event.target, time = %at, error = %error, "event handler failed");
                report.failures.push(EventFailure { event: id, error });
            }

            self.rearm(event, state, at);
        }

        self.now = time;
        Ok(report)
    }

    fn rearm(&mut self, mut event: Event<S>, state: &S, fired_at: SimTime) {
        match event.trigger {
            TriggerType::Once | TriggerType::Dependency => {
                self.forget(&event);
                return;
            }
            TriggerType::Trigger => {}
            TriggerType::Repeat => {
                event.not_before = fired_at;
                let predicted = event.handler.predict(event.target, state, fired_at);
                if predicted <= fired_at {
                    warn!(
                        event = %event.id,
                        time = %fired_at,
                        "repeating event predicted no later than its last firing, parking"
                    );
                } else {
                    place(&mut self.queue, self.now, &mut event, predicted);
                }
            }
        }
        self.events.insert(event.id, event);
    }

    fn forget(&mut self, event: &Event<S>) {
        for target in &event.depends {
            if let Some(ids) = self.dependents.get_mut(target) {
                ids.retain(|id| *id != event.id);
                if ids.is_empty() {
                    self.dependents.remove(target);
                }
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Inspection
    // ─────────────────────────────────────────────────────────────────────

    /// Time of the last [`reach_time`](Self::reach_time), or of the event
    /// currently being invoked.
    #[must_use]
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Time of the earliest queued event.
    #[must_use]
    pub fn next_event_time(&self) -> Option<SimTime> {
        self.queue.first_key_value().map(|((time, _), _)| *time)
    }

    /// Number of registered events, parked ones included.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.events.len()
    }

    /// Current prediction of `event`. [`SimTime::MAX`] for parked events,
    /// `None` if the event is not registered.
    #[must_use]
    pub fn prediction(&self, event: EventId) -> Option<SimTime> {
        self.events.get(&event).map(|event| event.time)
    }
}

/// Moves `event` to `time` in `queue`, clamped to `now`.
fn place<S>(
    queue: &mut BTreeMap<(SimTime, u64), EventId>,
    now: SimTime,
    event: &mut Event<S>,
    time: SimTime,
) {
    if !event.is_parked() {
        queue.remove(&event.key());
    }
    event.time = time.max(now);
    if !event.is_parked() {
        queue.insert(event.key(), event.id);
    }
}

impl<S: 'static> Default for EventLoop<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> fmt::Debug for EventLoop<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut handlers: Vec<_> = self.handlers.keys().collect();
        handlers.sort_unstable();
        f.debug_struct("EventLoop")
            .field("now", &self.now)
            .field("handlers", &handlers)
            .field("pending", &self.events.len())
            .field("queued", &self.queue.len())
            .finish()
    }
}
