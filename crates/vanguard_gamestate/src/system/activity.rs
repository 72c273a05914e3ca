use std::sync::Arc;

use tracing::debug;
use vanguard_activity::{ActivityExecutor, AdvanceOutcome, NodeId};
use vanguard_curve::SimTime;

use crate::component::Activity;
use crate::entity::GameEntity;
use crate::error::GameStateError;

/// Drives an entity's [`Activity`] through its graph.
pub struct ActivitySystem;

impl ActivitySystem {
    /// Resets the entity's activity and points it at the graph's start node.
    ///
    /// # Errors
    ///
    /// - [`GameStateError::ComponentNotFound`] without an activity component.
    /// - [`GameStateError::Activity`] if the graph has no start node.
    pub fn init(
        entity: &mut GameEntity,
        time: SimTime,
        executor: &ActivityExecutor,
    ) -> Result<NodeId, GameStateError> {
        let activity = entity.get_mut::<Activity>()?;
        activity.reset();
        let graph = Arc::clone(activity.graph());
        Ok(executor.init(&graph, entity, time)?)
    }

    /// Advances the entity's activity at `time`.
    ///
    /// Returns `None` for a deactivated activity. The advance time is
    /// recorded before the graph runs, so a failing advance still counts
    /// towards the regression check.
    ///
    /// # Errors
    ///
    /// - [`GameStateError::ComponentNotFound`] without an activity component.
    /// - [`GameStateError::TimeRegression`] if `time` precedes the previous
    ///   advance.
    /// - [`GameStateError::Activity`] for any graph failure.
    pub fn advance(
        entity: &mut GameEntity,
        time: SimTime,
        executor: &ActivityExecutor,
    ) -> Result<Option<AdvanceOutcome>, GameStateError> {
        let id = entity.id();
        let activity = entity.get_mut::<Activity>()?;
        if !activity.is_active() {
            debug!(entity = %id, time = %time, "activity inactive, skipping advance");
            return Ok(None);
        }
        if let Some(last) = activity.last_advance().filter(|last| time < *last) {
            return Err(GameStateError::TimeRegression {
                entity: id,
                requested: time,
                last,
            });
        }
        activity.set_last_advance(time);
        activity.clear_stall();
        let graph = Arc::clone(activity.graph());

        let outcome = executor.advance(&graph, entity, time)?;
        debug!(entity = %id, node = %outcome.node(), time = %time, ?outcome, "activity advanced");
        Ok(Some(outcome))
    }
}
