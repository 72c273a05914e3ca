//! The actor side of activity execution.

use vanguard_curve::SimTime;

use crate::node::{NodeId, WaitCondition};

/// State the executor needs from an actor.
///
/// The executor owns no per-actor state: the current node pointer and the
/// readiness of wait conditions live on the actor and are reached through
/// this trait.
pub trait ActivityActor {
    /// Stable actor identity, used for diagnostics.
    fn actor_id(&self) -> u64;

    /// The node the actor is currently at, `None` before initialization.
    fn current_node(&self) -> Option<NodeId>;

    /// Moves the actor's pointer to `node`.
    fn set_current_node(&mut self, node: NodeId);

    /// Whether `condition` holds at `time`.
    fn wait_ready(&self, condition: WaitCondition, time: SimTime) -> bool;

    /// Earliest time at or after `not_before` at which `condition` could
    /// hold, `None` if only an external change can make it hold.
    fn wait_prediction(&self, condition: WaitCondition, not_before: SimTime) -> Option<SimTime>;

    /// Called when a wait node is released by `condition`.
    fn on_wait_satisfied(&mut self, _condition: WaitCondition, _time: SimTime) {}
}
