//! Activity advancement.
//!
//! The [`ActivityExecutor`] walks an actor's graph from its current node
//! until a node has to wait or the graph ends:
//!
//! - **Start** forwards to its successor
//! - **Task** runs its action, then forwards to its successor
//! - **Condition** selects a branch without side effects
//! - **Wait** forwards only if one of its conditions is ready; otherwise the
//!   advance stops and reports when the node could become ready
//! - **End** finishes the activity
//!
//! Each call is bounded by a step guard. A graph that keeps executing at one
//! timestamp without reaching a wait or end node fails with
//! [`ActivityError::GraphDivergence`] instead of hanging the scheduler.
//!
//! On any error the actor's pointer stays on the node that failed, so a later
//! advance retries that node.
//!
//! # Example
//!
//! ```
//! use vanguard_activity::{ActivityExecutor, ActivityGraph, AdvanceOutcome, Task};
//! # use vanguard_activity::{ActivityActor, NodeId, WaitCondition};
//! # use vanguard_curve::SimTime;
//! # #[derive(Default)]
//! # struct Counter { node: Option<NodeId>, value: u32 }
//! # impl ActivityActor for Counter {
//! #     fn actor_id(&self) -> u64 { 0 }
//! #     fn current_node(&self) -> Option<NodeId> { self.node }
//! #     fn set_current_node(&mut self, node: NodeId) { self.node = Some(node); }
//! #     fn wait_ready(&self, _: WaitCondition, _: SimTime) -> bool { false }
//! #     fn wait_prediction(&self, _: WaitCondition, _: SimTime) -> Option<SimTime> { None }
//! # }
//!
//! let mut graph: ActivityGraph<Counter> = ActivityGraph::new();
//! let start = graph.add_start();
//! let bump = graph.add_task("bump", Task::infallible(|_, c: &mut Counter| c.value += 1));
//! let end = graph.add_end();
//! graph.connect(start, bump).unwrap();
//! graph.connect(bump, end).unwrap();
//!
//! let executor = ActivityExecutor::new();
//! let mut counter = Counter::default();
//! executor.init(&graph, &mut counter, SimTime::ZERO).unwrap();
//!
//! let outcome = executor.advance(&graph, &mut counter, SimTime::ZERO).unwrap();
//! assert_eq!(outcome, AdvanceOutcome::Finished { node: end });
//! assert_eq!(counter.value, 1);
//! ```

use std::collections::VecDeque;
use std::sync::Arc;

use tracing::{debug, trace};
use vanguard_curve::SimTime;

use crate::actor::ActivityActor;
use crate::error::ActivityError;
use crate::graph::ActivityGraph;
use crate::hooks::{ActivityEvent, ActivityHooks};
use crate::node::{Node, NodeId, NodeType};
use crate::task::TaskError;

/// Where an advance stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// The actor reached an end node.
    Finished {
        /// The end node.
        node: NodeId,
    },
    /// The actor is blocked on a wait node.
    Waiting {
        /// The wait node.
        node: NodeId,
        /// Earliest time the node could become ready. `None` means only an
        /// external change (such as a new command) can release it.
        wake_at: Option<SimTime>,
    },
}

impl AdvanceOutcome {
    /// Returns the node the actor stopped on.
    #[must_use]
    pub fn node(&self) -> NodeId {
        match self {
            AdvanceOutcome::Finished { node } | AdvanceOutcome::Waiting { node, .. } => *node,
        }
    }

    /// Returns `true` if the activity finished.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        matches!(self, AdvanceOutcome::Finished { .. })
    }
}

/// Advances actors through activity graphs.
///
/// The executor is stateless between calls; all progress lives on the actor.
#[derive(Debug, Clone)]
pub struct ActivityExecutor {
    /// Maximum node executions per [`advance`](Self::advance) call.
    max_steps: usize,
    hooks: Option<Arc<ActivityHooks>>,
}

impl Default for ActivityExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivityExecutor {
    /// Default bound on node executions per advance.
    pub const DEFAULT_MAX_STEPS: usize = 1000;

    /// Number of recent nodes reported by [`ActivityError::GraphDivergence`].
    const CHAIN_REPORT_LEN: usize = 16;

    /// Creates an executor with the default step bound and no hooks.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_steps: Self::DEFAULT_MAX_STEPS,
            hooks: None,
        }
    }

    /// Sets the maximum node executions per advance.
    #[must_use]
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Attaches an observer registry.
    #[must_use]
    pub fn with_hooks(mut self, hooks: Arc<ActivityHooks>) -> Self {
        self.hooks = Some(hooks);
        self
    }

    /// Returns the step bound.
    #[must_use]
    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// Returns the attached observer registry.
    #[must_use]
    pub fn hooks(&self) -> Option<&Arc<ActivityHooks>> {
        self.hooks.as_ref()
    }

    fn emit(&self, event: impl FnOnce() -> ActivityEvent) {
        if let Some(hooks) = &self.hooks {
            hooks.invoke(&event());
        }
    }

    /// Points the actor at the graph's start node.
    ///
    /// # Errors
    ///
    /// Returns [`ActivityError::NoStartNode`] if the graph has none.
    pub fn init<A: ActivityActor>(
        &self,
        graph: &ActivityGraph<A>,
        actor: &mut A,
        time: SimTime,
    ) -> Result<NodeId, ActivityError> {
        let start = graph.start().ok_or(ActivityError::NoStartNode)?;
        actor.set_current_node(start);
        debug!(actor = actor.actor_id(), node = %start, time = %time, "activity initialized");
        self.emit(|| ActivityEvent::NodeEntered {
            actor: actor.actor_id(),
            node: start,
            node_type: NodeType::Start,
            time,
        });
        Ok(start)
    }

    /// Advances `actor` through `graph` at `time`.
    ///
    /// Calling this again at the same time without any external change is a
    /// no-op: the actor is already parked on a wait or end node.
    ///
    /// # Errors
    ///
    /// - [`ActivityError::NotInitialized`] if the actor has no current node.
    /// - [`ActivityError::NodeNotFound`] if the pointer or a successor does
    ///   not resolve.
    /// - [`ActivityError::NoSuccessor`], [`ActivityError::NoMatchingBranch`]
    ///   for misconfigured nodes.
    /// - [`ActivityError::UnsetTask`], [`ActivityError::Task`] for failing
    ///   actions.
    /// - [`ActivityError::GraphDivergence`] when the step bound is exceeded.
    pub fn advance<A: ActivityActor>(
        &self,
        graph: &ActivityGraph<A>,
        actor: &mut A,
        time: SimTime,
    ) -> Result<AdvanceOutcome, ActivityError> {
        let actor_id = actor.actor_id();
        let mut current = actor.current_node().ok_or(ActivityError::NotInitialized)?;
        let mut chain: VecDeque<NodeId> = VecDeque::with_capacity(Self::CHAIN_REPORT_LEN);
        let mut steps = 0_usize;

        debug!(actor = actor_id, node = %current, time = %time, "advancing activity");

        loop {
            let node = graph
                .node(current)
                .ok_or(ActivityError::NodeNotFound(current))?;

            if steps > 0 {
                self.emit(|| ActivityEvent::NodeEntered {
                    actor: actor_id,
                    node: current,
                    node_type: node.node_type(),
                    time,
                });
            }
            if steps >= self.max_steps {
                self.emit(|| ActivityEvent::Diverged {
                    actor: actor_id,
                    node: current,
                    max_steps: self.max_steps,
                    time,
                });
                return Err(ActivityError::GraphDivergence {
                    node: current,
                    max_steps: self.max_steps,
                    chain: chain.into(),
                });
            }

            let next = match node {
                Node::End(_) => {
                    self.emit(|| ActivityEvent::Finished {
                        actor: actor_id,
                        node: current,
                        time,
                    });
                    return Ok(AdvanceOutcome::Finished { node: current });
                }
                Node::Start(start) => start.get_next()?,
                Node::Task(task) => {
                    let next = task.get_next()?;
                    self.emit(|| ActivityEvent::TaskStarted {
                        actor: actor_id,
                        node: current,
                        time,
                    });
                    if let Err(error) = task.task.run(time, actor) {
                        let error = match error {
                            TaskError::Unset => ActivityError::UnsetTask(current),
                            TaskError::Failed(source) => ActivityError::Task {
                                node: current,
                                source,
                            },
                        };
                        self.emit(|| ActivityEvent::TaskFailed {
                            actor: actor_id,
                            node: current,
                            time,
                            error: error.to_string(),
                        });
                        return Err(error);
                    }
                    self.emit(|| ActivityEvent::TaskCompleted {
                        actor: actor_id,
                        node: current,
                        time,
                    });
                    next
                }
                Node::Condition(condition) => {
                    let next = condition.select(time, actor)?;
                    self.emit(|| ActivityEvent::BranchSelected {
                        actor: actor_id,
                        node: current,
                        next,
                        time,
                    });
                    next
                }
                Node::Wait(wait) => match wait.ready_branch(&*actor, time) {
                    Some((condition, next)) => {
                        actor.on_wait_satisfied(condition, time);
                        self.emit(|| ActivityEvent::WaitSatisfied {
                            actor: actor_id,
                            node: current,
                            condition,
                            next,
                            time,
                        });
                        next
                    }
                    None => {
                        let wake_at = wait.predict(&*actor, time);
                        trace!(actor = actor_id, node = %current, wake_at = ?wake_at, "activity waiting");
                        self.emit(|| ActivityEvent::WaitEntered {
                            actor: actor_id,
                            node: current,
                            wake_at,
                            time,
                        });
                        return Ok(AdvanceOutcome::Waiting {
                            node: current,
                            wake_at,
                        });
                    }
                },
            };

            steps += 1;
            if chain.len() == Self::CHAIN_REPORT_LEN {
                chain.pop_front();
            }
            chain.push_back(current);

            trace!(actor = actor_id, from = %current, to = %next, time = %time, "activity transition");
            actor.set_current_node(next);
            current = next;
        }
    }
}
