//! Activity graphs for Vanguard (Layer 1).
//!
//! An activity graph describes an actor's behavior as a flow graph of nodes.
//! Tasks mutate the actor, conditions branch on its state, wait nodes block
//! until a command arrives or a timer elapses. The executor walks the graph
//! from the actor's current node at a given simulation time and reports
//! where it stopped.
//!
//! # Core Concepts
//!
//! - [`ActivityGraph`] - Arena of nodes addressed by [`NodeId`]
//! - [`Node`] - Closed set of node variants (start, end, task, condition, wait)
//! - [`Task`] / [`Condition`] - Actions and predicates supplied by the game
//! - [`ActivityActor`] - What the executor needs from an actor
//! - [`ActivityExecutor`] - The advancement algorithm
//! - [`hooks`] - Observers for tracing and replay recording
//!
//! # Architecture
//!
//! - **Layer 0** (`vanguard_curve`): time and curves
//! - **Layer 1** (`vanguard_activity`): graph and executor (this crate)
//! - **Layer 2** (`vanguard_gamestate`): actors, components, systems

pub mod actor;
pub mod error;
pub mod executor;
pub mod graph;
pub mod hooks;
pub mod node;
pub mod task;

pub use actor::ActivityActor;
pub use error::{ActivityError, BoxError};
pub use executor::{ActivityExecutor, AdvanceOutcome};
pub use graph::{ActivityGraph, IdAllocator, ValidationError, ValidationWarning};
pub use hooks::{ActivityEvent, ActivityEventKind, ActivityHooks, HookRegistrationError};
pub use node::{
    ConditionNode, EndNode, Node, NodeId, NodeType, StartNode, TaskNode, WaitCondition, WaitNode,
};
pub use task::{Condition, Task, TaskError};
