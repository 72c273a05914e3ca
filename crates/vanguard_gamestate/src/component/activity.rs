use std::sync::Arc;

use vanguard_activity::{ActivityGraph, NodeId};
use vanguard_curve::SimTime;
use vanguard_event::EventId;

use crate::entity::GameEntity;

/// Behavior state of an entity: its graph, the current node and the events
/// scheduled to continue it.
#[derive(Debug, Clone)]
pub struct Activity {
    graph: Arc<ActivityGraph<GameEntity>>,
    node: Option<NodeId>,
    timer: Option<SimTime>,
    events: Vec<EventId>,
    last_advance: Option<SimTime>,
    stall: Option<Stall>,
    active: bool,
}

/// A failed advance that left the activity on its node. The activity is
/// retried once a command newer than `revision` arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Stall {
    pub(crate) at: SimTime,
    pub(crate) revision: u64,
}

impl Activity {
    /// Creates an uninitialized activity for `graph`.
    #[must_use]
    pub fn new(graph: Arc<ActivityGraph<GameEntity>>) -> Self {
        Self {
            graph,
            node: None,
            timer: None,
            events: Vec::new(),
            last_advance: None,
            stall: None,
            active: true,
        }
    }

    /// The behavior graph.
    #[must_use]
    pub fn graph(&self) -> &Arc<ActivityGraph<GameEntity>> {
        &self.graph
    }

    /// The current node, if initialized.
    #[must_use]
    pub fn current_node(&self) -> Option<NodeId> {
        self.node
    }

    pub(crate) fn set_current_node(&mut self, node: Option<NodeId>) {
        self.node = node;
    }

    /// The wake timer, if armed.
    #[must_use]
    pub fn timer(&self) -> Option<SimTime> {
        self.timer
    }

    /// Arms the wake timer. A wait node with a timer branch releases once
    /// the timer has elapsed.
    pub fn set_timer(&mut self, at: SimTime) {
        self.timer = Some(at);
    }

    /// Disarms the wake timer.
    pub fn clear_timer(&mut self) {
        self.timer = None;
    }

    /// Events scheduled to continue this activity.
    #[must_use]
    pub fn events(&self) -> &[EventId] {
        &self.events
    }

    pub(crate) fn replace_events(&mut self, events: Vec<EventId>) -> Vec<EventId> {
        core::mem::replace(&mut self.events, events)
    }

    /// Time of the most recent advance.
    #[must_use]
    pub fn last_advance(&self) -> Option<SimTime> {
        self.last_advance
    }

    pub(crate) fn set_last_advance(&mut self, time: SimTime) {
        self.last_advance = Some(time);
    }

    /// Time of the failed advance the activity is waiting to retry.
    #[must_use]
    pub fn stalled_at(&self) -> Option<SimTime> {
        self.stall.map(|stall| stall.at)
    }

    pub(crate) fn stall(&self) -> Option<Stall> {
        self.stall
    }

    pub(crate) fn set_stall(&mut self, at: SimTime, revision: u64) {
        self.stall = Some(Stall { at, revision });
    }

    pub(crate) fn clear_stall(&mut self) {
        self.stall = None;
    }

    /// Returns `true` unless the activity was deactivated after a failure.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Stops the activity. It stays stopped until re-initialized.
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// Resets the activity for a fresh start. The node pointer is set by the
    /// executor afterwards.
    pub(crate) fn reset(&mut self) {
        self.node = None;
        self.timer = None;
        self.last_advance = None;
        self.stall = None;
        self.active = true;
    }
}
