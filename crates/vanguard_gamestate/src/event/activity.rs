use vanguard_activity::Node;
use vanguard_curve::SimTime;
use vanguard_event::{BoxError, EventHandler, EventLoop, TargetId, TriggerType};

use crate::component::{Activity, CommandQueue};
use crate::entity::EntityId;
use crate::state::GameState;

/// Handler id of activity continuations.
pub const ACTIVITY_HANDLER_ID: &str = "game.activity";

/// Continues an entity's activity once its current node can make progress.
///
/// Continuations depend on their entity, so a change such as a new command
/// re-predicts them. A continuation left behind by a failed advance stays
/// parked until the next command is added.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActivityHandler;

impl EventHandler<GameState> for ActivityHandler {
    type Params = ();

    fn id(&self) -> &'static str {
        ACTIVITY_HANDLER_ID
    }

    fn trigger(&self) -> TriggerType {
        TriggerType::Dependency
    }

    fn predict_invoke_time(
        &self,
        target: TargetId,
        state: &GameState,
        not_before: SimTime,
    ) -> SimTime {
        let Ok(entity) = state.entity(EntityId(target.raw())) else {
            return SimTime::MAX;
        };
        let Ok(activity) = entity.get::<Activity>() else {
            return SimTime::MAX;
        };
        if !activity.is_active() {
            return SimTime::MAX;
        }
        if let Some(stall) = activity.stall() {
            // retry only once a new command has arrived
            let Ok(queue) = entity.get::<CommandQueue>() else {
                return SimTime::MAX;
            };
            if queue.revision() == stall.revision {
                return SimTime::MAX;
            }
            return queue
                .last_added_time()
                .map_or(SimTime::MAX, |added| added.max(stall.at).max(not_before));
        }
        let Some(node) = activity.current_node() else {
            return SimTime::MAX;
        };
        match activity.graph().node(node) {
            Some(Node::Wait(wait)) => wait.predict(entity, not_before).unwrap_or(SimTime::MAX),
            Some(Node::End(_)) | None => SimTime::MAX,
            Some(_) => not_before,
        }
    }

    fn invoke(
        &self,
        event_loop: &mut EventLoop<GameState>,
        target: TargetId,
        state: &mut GameState,
        time: SimTime,
        _params: &(),
    ) -> Result<(), BoxError> {
        let manager = state.manager(EntityId(target.raw()))?.clone();
        manager.run_activity_system(event_loop, state, time)?;
        Ok(())
    }
}
