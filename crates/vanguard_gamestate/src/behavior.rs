//! Behavior graphs available to entity templates.
//!
//! A [`BehaviorRegistry`] maps opaque behavior ids to validated starting
//! graphs. Graphs built through [`BehaviorRegistry::builder`] share one
//! [`IdAllocator`], so node ids are unique across every registered behavior.

use std::sync::Arc;

use hashbrown::HashMap;
use tracing::{debug, warn};
use vanguard_activity::{ActivityGraph, Condition, IdAllocator, WaitCondition};

use crate::command::Command;
use crate::component::CommandQueue;
use crate::entity::GameEntity;
use crate::error::GameStateError;
use crate::tasks;

/// Id of the behavior installed by [`BehaviorRegistry::with_standard_behaviors`].
pub const STANDARD_UNIT_BEHAVIOR: &str = "unit.standard";

/// Registry of behavior graphs keyed by behavior id.
#[derive(Debug, Default, Clone)]
pub struct BehaviorRegistry {
    graphs: HashMap<String, Arc<ActivityGraph<GameEntity>>>,
    allocator: IdAllocator,
}

impl BehaviorRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the standard unit behavior.
    ///
    /// # Errors
    ///
    /// Propagates registration errors.
    pub fn with_standard_behaviors() -> Result<Self, GameStateError> {
        let mut registry = Self::new();
        let graph = standard_unit_graph(registry.builder())?;
        registry.register(STANDARD_UNIT_BEHAVIOR, graph)?;
        Ok(registry)
    }

    /// Returns an empty graph drawing node ids from the registry's allocator.
    #[must_use]
    pub fn builder(&self) -> ActivityGraph<GameEntity> {
        ActivityGraph::with_allocator(self.allocator.clone())
    }

    /// Validates and registers `graph` under `id`, replacing any previous
    /// graph with that id.
    ///
    /// # Errors
    ///
    /// Returns [`GameStateError::InvalidBehavior`] if validation fails.
    pub fn register(
        &mut self,
        id: impl Into<String>,
        graph: ActivityGraph<GameEntity>,
    ) -> Result<Arc<ActivityGraph<GameEntity>>, GameStateError> {
        let id = id.into();
        graph
            .validate()
            .map_err(|errors| GameStateError::InvalidBehavior {
                behavior: id.clone(),
                errors,
            })?;
        for warning in graph.warnings() {
            warn!(behavior = %id, %warning, "behavior graph warning");
        }

        let graph = Arc::new(graph);
        debug!(behavior = %id, nodes = graph.node_count(), "behavior registered");
        self.graphs.insert(id, Arc::clone(&graph));
        Ok(graph)
    }

    /// Looks up a behavior graph.
    ///
    /// # Errors
    ///
    /// Returns [`GameStateError::UnknownBehavior`] if absent.
    pub fn get(&self, id: &str) -> Result<Arc<ActivityGraph<GameEntity>>, GameStateError> {
        self.graphs
            .get(id)
            .cloned()
            .ok_or_else(|| GameStateError::UnknownBehavior(id.to_owned()))
    }

    /// Returns `true` if a behavior with this id is registered.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.graphs.contains_key(id)
    }

    /// Number of registered behaviors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    /// Returns `true` if no behavior is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }
}

/// Builds the standard unit behavior into `graph`:
///
/// ```text
/// start -> wait for command --command--> command type?
///              ^                            |move          |otherwise
///              |                            v              v
///              |                         move         idle ----+
///              |                            |                  |
///              |                            v                  |
///              +--------timer---------- wait for arrival       |
///              +-----------------------------------------------+
/// ```
///
/// # Errors
///
/// Only fails if the graph is inconsistent, which indicates a bug here.
pub fn standard_unit_graph(
    mut graph: ActivityGraph<GameEntity>,
) -> Result<ActivityGraph<GameEntity>, GameStateError> {
    let start = graph.add_start();
    let wait_command = graph.add_wait("wait for command");
    let branch = graph.add_condition("command type");
    let do_move = graph.add_task("move", tasks::move_command());
    let do_idle = graph.add_task("idle", tasks::idle());
    let wait_arrival = graph.add_wait("wait for arrival");

    graph.connect(start, wait_command)?;
    graph.add_wait_branch(wait_command, WaitCondition::Command, branch)?;
    graph.add_branch(branch, next_command_is_move(), do_move)?;
    graph.connect(branch, do_idle)?;
    graph.connect(do_move, wait_arrival)?;
    graph.add_wait_branch(wait_arrival, WaitCondition::Timer, wait_command)?;
    graph.connect(do_idle, wait_command)?;
    Ok(graph)
}

fn next_command_is_move() -> Condition<GameEntity> {
    Condition::new(|time, entity: &GameEntity| {
        entity
            .get::<CommandQueue>()
            .ok()
            .and_then(|queue| queue.front(time))
            .is_some_and(|command| matches!(command, Command::Move { .. }))
    })
}
