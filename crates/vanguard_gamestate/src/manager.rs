//! Per-entity driver of the activity system.
//!
//! Each entity in the [`GameState`] has a [`GameEntityManager`]. The event
//! loop never talks to the activity system directly: continuation events
//! target the manager, and the manager advances the entity and schedules the
//! next continuation.

use tracing::{debug, error, warn};
use vanguard_activity::{ActivityExecutor, AdvanceOutcome};
use vanguard_curve::SimTime;
use vanguard_event::{EventEntity, EventId, EventLoop, TargetId};

use crate::component::{Activity, CommandQueue};
use crate::entity::EntityId;
use crate::error::GameStateError;
use crate::event::ACTIVITY_HANDLER_ID;
use crate::state::GameState;
use crate::system::ActivitySystem;

/// Forwards scheduler invocations for one entity into the activity system.
#[derive(Debug, Clone)]
pub struct GameEntityManager {
    entity: EntityId,
    executor: ActivityExecutor,
    deactivate_on_error: bool,
}

impl GameEntityManager {
    /// Creates a manager for `entity`.
    #[must_use]
    pub fn new(entity: EntityId, executor: ActivityExecutor, deactivate_on_error: bool) -> Self {
        Self {
            entity,
            executor,
            deactivate_on_error,
        }
    }

    /// The managed entity.
    #[must_use]
    pub fn entity(&self) -> EntityId {
        self.entity
    }

    /// Advances the entity's activity at `time` and schedules its
    /// continuation.
    ///
    /// Re-invoking at the same time is harmless. Returns `None` if the
    /// activity is inactive or was deactivated by this call.
    ///
    /// # Errors
    ///
    /// - [`GameStateError::EntityNotFound`] if the entity was removed.
    /// - [`GameStateError::TimeRegression`] if `time` precedes the previous
    ///   advance.
    /// - [`GameStateError::Activity`] for graph failures when
    ///   `deactivate_on_error` is off. The entity stays on the failed node
    ///   and is retried when its next command arrives.
    pub fn run_activity_system(
        &self,
        event_loop: &mut EventLoop<GameState>,
        state: &mut GameState,
        time: SimTime,
    ) -> Result<Option<AdvanceOutcome>, GameStateError> {
        debug!(entity = %self.entity, time = %time, "running activity system");

        let result = ActivitySystem::advance(state.entity_mut(self.entity)?, time, &self.executor);
        match result {
            Ok(Some(outcome)) => {
                self.schedule_continuation(event_loop, state, outcome, time)?;
                Ok(Some(outcome))
            }
            Ok(None) => Ok(None),
            Err(GameStateError::Activity(failure)) if self.deactivate_on_error => {
                error!(entity = %self.entity, time = %time, error = %failure, "activity failed, deactivating");
                self.deactivate(event_loop, state)?;
                Ok(None)
            }
            Err(GameStateError::Activity(failure)) => {
                warn!(entity = %self.entity, time = %time, error = %failure, "activity failed, retrying on next command");
                self.stall(event_loop, state, time)?;
                Err(failure.into())
            }
            Err(error) => Err(error),
        }
    }

    /// Leaves the entity on its failed node and parks a retry continuation
    /// that fires once a new command is queued.
    fn stall(
        &self,
        event_loop: &mut EventLoop<GameState>,
        state: &mut GameState,
        time: SimTime,
    ) -> Result<(), GameStateError> {
        let entity = state.entity_mut(self.entity)?;
        let revision = entity.get::<CommandQueue>().map_or(0, CommandQueue::revision);
        entity.get_mut::<Activity>()?.set_stall(time, revision);

        let retry = event_loop.create_event(ACTIVITY_HANDLER_ID, self.target_id(), state, time, ())?;
        let activity = state.entity_mut(self.entity)?.get_mut::<Activity>()?;
        for stale in activity.replace_events(vec![retry]) {
            event_loop.cancel(stale);
        }
        Ok(())
    }

    /// Stops the entity's activity and cancels its pending continuations.
    ///
    /// # Errors
    ///
    /// Returns [`GameStateError::EntityNotFound`] or
    /// [`GameStateError::ComponentNotFound`] if there is nothing to stop.
    pub fn deactivate(
        &self,
        event_loop: &mut EventLoop<GameState>,
        state: &mut GameState,
    ) -> Result<(), GameStateError> {
        let activity = state.entity_mut(self.entity)?.get_mut::<Activity>()?;
        activity.deactivate();
        for event in activity.replace_events(Vec::new()) {
            event_loop.cancel(event);
        }
        Ok(())
    }

    fn schedule_continuation(
        &self,
        event_loop: &mut EventLoop<GameState>,
        state: &mut GameState,
        outcome: AdvanceOutcome,
        time: SimTime,
    ) -> Result<(), GameStateError> {
        let pending: Vec<EventId> = match outcome {
            AdvanceOutcome::Finished { .. } => Vec::new(),
            AdvanceOutcome::Waiting { wake_at, .. } => {
                let event =
                    event_loop.create_event(ACTIVITY_HANDLER_ID, self.target_id(), state, time, ())?;
                debug!(
                    entity = %self.entity,
                    event = %event,
                    wake_at = ?wake_at,
                    "continuation scheduled"
                );
                vec![event]
            }
        };

        let activity = state.entity_mut(self.entity)?.get_mut::<Activity>()?;
        for stale in activity.replace_events(pending) {
            event_loop.cancel(stale);
        }
        Ok(())
    }
}

impl EventEntity for GameEntityManager {
    fn target_id(&self) -> TargetId {
        self.entity.target()
    }

    fn idstr(&self) -> &str {
        "manager"
    }
}
