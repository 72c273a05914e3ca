//! Event handler contract.
//!
//! An [`EventHandler`] knows two things about the events it owns: when they
//! should fire ([`predict_invoke_time`](EventHandler::predict_invoke_time))
//! and what happens when they do ([`invoke`](EventHandler::invoke)). The
//! [`EventLoop`] stores handlers type-erased and checks event parameters
//! against [`EventHandler::Params`] when an event is created.

use core::any::{Any, TypeId};
use core::fmt;

use vanguard_curve::SimTime;

use crate::error::EventError;
use crate::event_loop::EventLoop;

/// Boxed error returned by handler invocations.
pub type BoxError = Box<dyn core::error::Error + Send + Sync>;

/// Identity of an event target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TargetId(pub u64);

impl TargetId {
    /// Returns the raw id value.
    #[must_use]
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "target_{}", self.0)
    }
}

/// Something events can be scheduled against.
pub trait EventEntity {
    /// Stable identity used as the event target.
    fn target_id(&self) -> TargetId;

    /// Short diagnostic name for log output.
    fn idstr(&self) -> &str;
}

/// How an event reacts to changes of the targets it depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerType {
    /// Fires once at the initial prediction. Changes are ignored.
    Once,
    /// Fires once; the prediction is recomputed whenever a dependency changes.
    Dependency,
    /// Parked until a dependency changes, then fires at the change time.
    /// Stays registered after firing and waits for the next change.
    Trigger,
    /// Re-armed after each firing, predicting from the firing time.
    Repeat,
}

/// Handles a family of events.
///
/// `S` is the simulation state the handler reads and mutates.
///
/// # Example
///
/// ```
/// use vanguard_curve::SimTime;
/// use vanguard_event::{BoxError, EventHandler, EventLoop, TargetId, TriggerType};
///
/// struct Tick;
///
/// impl EventHandler<Vec<SimTime>> for Tick {
///     type Params = ();
///
///     fn id(&self) -> &'static str {
///         "test.tick"
///     }
///
///     fn trigger(&self) -> TriggerType {
///         TriggerType::Once
///     }
///
///     fn predict_invoke_time(
///         &self,
///         _target: TargetId,
///         _state: &Vec<SimTime>,
///         not_before: SimTime,
///     ) -> SimTime {
///         not_before
///     }
///
///     fn invoke(
///         &self,
///         _loop: &mut EventLoop<Vec<SimTime>>,
///         _target: TargetId,
///         state: &mut Vec<SimTime>,
///         time: SimTime,
///         _params: &(),
///     ) -> Result<(), BoxError> {
///         state.push(time);
///         Ok(())
///     }
/// }
///
/// let mut state = Vec::new();
/// let mut event_loop = EventLoop::new();
/// event_loop.add_event_handler(Tick).unwrap();
/// event_loop
///     .create_event("test.tick", TargetId(1), &state, SimTime::from_int(5), ())
///     .unwrap();
///
/// event_loop.reach_time(SimTime::from_int(10), &mut state).unwrap();
/// assert_eq!(state, vec![SimTime::from_int(5)]);
/// ```
pub trait EventHandler<S>: Send + Sync + 'static {
    /// Parameters carried by each event of this handler.
    type Params: Send + Sync + 'static;

    /// Unique handler name, e.g. `"game.spawn_entity"`.
    fn id(&self) -> &'static str;

    /// How events of this handler react to changes.
    fn trigger(&self) -> TriggerType;

    /// Predicts when the event for `target` should fire, no earlier than
    /// `not_before`. [`SimTime::MAX`] means "not until something changes".
    fn predict_invoke_time(&self, target: TargetId, state: &S, not_before: SimTime) -> SimTime;

    /// Fires the event.
    ///
    /// # Errors
    ///
    /// Any error is collected by the event loop and logged; it never stops
    /// the loop.
    fn invoke(
        &self,
        event_loop: &mut EventLoop<S>,
        target: TargetId,
        state: &mut S,
        time: SimTime,
        params: &Self::Params,
    ) -> Result<(), BoxError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Type erasure
// ─────────────────────────────────────────────────────────────────────────────

/// Object-safe view of an [`EventHandler`].
pub(crate) trait ErasedHandler<S>: Send + Sync {
    fn id(&self) -> &'static str;

    fn trigger(&self) -> TriggerType;

    fn params_type(&self) -> TypeId;

    fn params_type_name(&self) -> &'static str;

    fn predict(&self, target: TargetId, state: &S, not_before: SimTime) -> SimTime;

    fn invoke_erased(
        &self,
        event_loop: &mut EventLoop<S>,
        target: TargetId,
        state: &mut S,
        time: SimTime,
        params: &(dyn Any + Send + Sync),
    ) -> Result<(), EventError>;
}

pub(crate) struct HandlerBox<H>(pub(crate) H);

impl<S, H: EventHandler<S>> ErasedHandler<S> for HandlerBox<H> {
    fn id(&self) -> &'static str {
        self.0.id()
    }

    fn trigger(&self) -> TriggerType {
        self.0.trigger()
    }

    fn params_type(&self) -> TypeId {
        TypeId::of::<H::Params>()
    }

    fn params_type_name(&self) -> &'static str {
        core::any::type_name::<H::Params>()
    }

    fn predict(&self, target: TargetId, state: &S, not_before: SimTime) -> SimTime {
        self.0.predict_invoke_time(target, state, not_before)
    }

    fn invoke_erased(
        &self,
        event_loop: &mut EventLoop<S>,
        target: TargetId,
        state: &mut S,
        time: SimTime,
        params: &(dyn Any + Send + Sync),
    ) -> Result<(), EventError> {
        let params = params
            .downcast_ref::<H::Params>()
            .ok_or(EventError::ParamsMismatch {
                handler: self.0.id(),
                expected: self.params_type_name(),
            })?;
        self.0
            .invoke(event_loop, target, state, time, params)
            .map_err(|source| EventError::Handler {
                handler: self.0.id(),
                target,
                time,
                source,
            })
    }
}
