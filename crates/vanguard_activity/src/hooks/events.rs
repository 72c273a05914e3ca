//! Unified event enum for activity hooks.
//!
//! All observers receive `&ActivityEvent` and match on the variants they care
//! about.

use vanguard_curve::SimTime;

use crate::node::{NodeId, NodeType, WaitCondition};

/// Something that happened while advancing an actor's activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityEvent {
    // ─────────────────────────────────────────────────────────────────────────
    // Traversal
    // ─────────────────────────────────────────────────────────────────────────
    /// The pointer moved onto a node.
    NodeEntered {
        /// The advancing actor.
        actor: u64,
        /// The node now current.
        node: NodeId,
        /// Its variant tag.
        node_type: NodeType,
        /// Simulation time of the advance.
        time: SimTime,
    },

    /// A condition node selected a branch.
    BranchSelected {
        /// The advancing actor.
        actor: u64,
        /// The condition node.
        node: NodeId,
        /// The selected successor.
        next: NodeId,
        /// Simulation time of the advance.
        time: SimTime,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Tasks
    // ─────────────────────────────────────────────────────────────────────────
    /// A task action is about to run.
    TaskStarted {
        /// The advancing actor.
        actor: u64,
        /// The task node.
        node: NodeId,
        /// Simulation time of the advance.
        time: SimTime,
    },

    /// A task action returned successfully.
    TaskCompleted {
        /// The advancing actor.
        actor: u64,
        /// The task node.
        node: NodeId,
        /// Simulation time of the advance.
        time: SimTime,
    },

    /// A task action failed.
    TaskFailed {
        /// The advancing actor.
        actor: u64,
        /// The task node.
        node: NodeId,
        /// Simulation time of the advance.
        time: SimTime,
        /// Rendered error.
        error: String,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Waiting
    // ─────────────────────────────────────────────────────────────────────────
    /// A wait node blocked the advance.
    WaitEntered {
        /// The advancing actor.
        actor: u64,
        /// The wait node.
        node: NodeId,
        /// Predicted wake time, if any.
        wake_at: Option<SimTime>,
        /// Simulation time of the advance.
        time: SimTime,
    },

    /// A wait node was released.
    WaitSatisfied {
        /// The advancing actor.
        actor: u64,
        /// The wait node.
        node: NodeId,
        /// The condition that released it.
        condition: WaitCondition,
        /// The successor taken.
        next: NodeId,
        /// Simulation time of the advance.
        time: SimTime,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Termination
    // ─────────────────────────────────────────────────────────────────────────
    /// The actor reached an end node.
    Finished {
        /// The advancing actor.
        actor: u64,
        /// The end node.
        node: NodeId,
        /// Simulation time of the advance.
        time: SimTime,
    },

    /// The step guard tripped.
    Diverged {
        /// The advancing actor.
        actor: u64,
        /// Node the pointer was on.
        node: NodeId,
        /// The configured step bound.
        max_steps: usize,
        /// Simulation time of the advance.
        time: SimTime,
    },
}

/// Discriminant of [`ActivityEvent`], used to register observers for a
/// subset of events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivityEventKind {
    /// [`ActivityEvent::NodeEntered`].
    NodeEntered,
    /// [`ActivityEvent::BranchSelected`].
    BranchSelected,
    /// [`ActivityEvent::TaskStarted`].
    TaskStarted,
    /// [`ActivityEvent::TaskCompleted`].
    TaskCompleted,
    /// [`ActivityEvent::TaskFailed`].
    TaskFailed,
    /// [`ActivityEvent::WaitEntered`].
    WaitEntered,
    /// [`ActivityEvent::WaitSatisfied`].
    WaitSatisfied,
    /// [`ActivityEvent::Finished`].
    Finished,
    /// [`ActivityEvent::Diverged`].
    Diverged,
}

impl ActivityEventKind {
    /// Every kind, in declaration order.
    pub const ALL: [ActivityEventKind; 9] = [
        ActivityEventKind::NodeEntered,
        ActivityEventKind::BranchSelected,
        ActivityEventKind::TaskStarted,
        ActivityEventKind::TaskCompleted,
        ActivityEventKind::TaskFailed,
        ActivityEventKind::WaitEntered,
        ActivityEventKind::WaitSatisfied,
        ActivityEventKind::Finished,
        ActivityEventKind::Diverged,
    ];
}

impl ActivityEvent {
    /// Returns the event's kind.
    #[must_use]
    pub fn kind(&self) -> ActivityEventKind {
        match self {
            ActivityEvent::NodeEntered { .. } => ActivityEventKind::NodeEntered,
            ActivityEvent::BranchSelected { .. } => ActivityEventKind::BranchSelected,
            ActivityEvent::TaskStarted { .. } => ActivityEventKind::TaskStarted,
            ActivityEvent::TaskCompleted { .. } => ActivityEventKind::TaskCompleted,
            ActivityEvent::TaskFailed { .. } => ActivityEventKind::TaskFailed,
            ActivityEvent::WaitEntered { .. } => ActivityEventKind::WaitEntered,
            ActivityEvent::WaitSatisfied { .. } => ActivityEventKind::WaitSatisfied,
            ActivityEvent::Finished { .. } => ActivityEventKind::Finished,
            ActivityEvent::Diverged { .. } => ActivityEventKind::Diverged,
        }
    }

    /// Returns the actor the event belongs to.
    #[must_use]
    pub fn actor(&self) -> u64 {
        match self {
            ActivityEvent::NodeEntered { actor, .. }
            | ActivityEvent::BranchSelected { actor, .. }
            | ActivityEvent::TaskStarted { actor, .. }
            | ActivityEvent::TaskCompleted { actor, .. }
            | ActivityEvent::TaskFailed { actor, .. }
            | ActivityEvent::WaitEntered { actor, .. }
            | ActivityEvent::WaitSatisfied { actor, .. }
            | ActivityEvent::Finished { actor, .. }
            | ActivityEvent::Diverged { actor, .. } => *actor,
        }
    }

    /// Returns the node the event concerns.
    #[must_use]
    pub fn node(&self) -> NodeId {
        match self {
            ActivityEvent::NodeEntered { node, .. }
            | ActivityEvent::BranchSelected { node, .. }
            | ActivityEvent::TaskStarted { node, .. }
            | ActivityEvent::TaskCompleted { node, .. }
            | ActivityEvent::TaskFailed { node, .. }
            | ActivityEvent::WaitEntered { node, .. }
            | ActivityEvent::WaitSatisfied { node, .. }
            | ActivityEvent::Finished { node, .. }
            | ActivityEvent::Diverged { node, .. } => *node,
        }
    }

    /// Returns the simulation time the event happened at.
    #[must_use]
    pub fn time(&self) -> SimTime {
        match self {
            ActivityEvent::NodeEntered { time, .. }
            | ActivityEvent::BranchSelected { time, .. }
            | ActivityEvent::TaskStarted { time, .. }
            | ActivityEvent::TaskCompleted { time, .. }
            | ActivityEvent::TaskFailed { time, .. }
            | ActivityEvent::WaitEntered { time, .. }
            | ActivityEvent::WaitSatisfied { time, .. }
            | ActivityEvent::Finished { time, .. }
            | ActivityEvent::Diverged { time, .. } => *time,
        }
    }
}
