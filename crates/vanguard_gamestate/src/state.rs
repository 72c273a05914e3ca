//! The simulation's mutable world.

use hashbrown::HashMap;
use indexmap::IndexMap;
use tracing::debug;
use vanguard_activity::{ActivityError, ActivityExecutor};
use vanguard_curve::SimTime;
use vanguard_event::EventLoop;

use crate::command::Command;
use crate::component::{Activity, CommandQueue};
use crate::config::SimulationConfig;
use crate::entity::{EntityId, GameEntity};
use crate::error::GameStateError;
use crate::event::SpawnResponse;
use crate::manager::GameEntityManager;
use crate::snapshot::ActivitySnapshot;

/// Entities, their managers and the spawn outbox.
///
/// Entities are kept in insertion order, so iteration is deterministic.
#[derive(Debug)]
pub struct GameState {
    entities: IndexMap<EntityId, GameEntity>,
    managers: HashMap<EntityId, GameEntityManager>,
    next_entity_id: u64,
    spawn_responses: Vec<SpawnResponse>,
    executor: ActivityExecutor,
    config: SimulationConfig,
}

impl GameState {
    /// Creates an empty world advancing activities with `executor`.
    #[must_use]
    pub fn new(config: SimulationConfig, executor: ActivityExecutor) -> Self {
        Self {
            entities: IndexMap::new(),
            managers: HashMap::new(),
            next_entity_id: 1,
            spawn_responses: Vec::new(),
            executor,
            config,
        }
    }

    /// The configuration the world was created with.
    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// The executor shared by every entity manager.
    #[must_use]
    pub fn executor(&self) -> &ActivityExecutor {
        &self.executor
    }

    /// Hands out the next unused entity id.
    pub fn allocate_entity_id(&mut self) -> EntityId {
        let id = EntityId(self.next_entity_id);
        self.next_entity_id += 1;
        id
    }

    // ─────────────────────────────────────────────────────────────────────
    // Entities
    // ─────────────────────────────────────────────────────────────────────

    /// Adds an entity and creates its manager, replacing any entity with the
    /// same id.
    pub fn add_game_entity(&mut self, entity: GameEntity) -> Option<GameEntity> {
        let id = entity.id();
        self.next_entity_id = self.next_entity_id.max(id.raw().saturating_add(1));
        self.managers.insert(
            id,
            GameEntityManager::new(id, self.executor.clone(), self.config.deactivate_on_error),
        );
        debug!(entity = %id, template = entity.template(), "entity added");
        self.entities.insert(id, entity)
    }

    /// Removes an entity and its manager, cancelling the continuation events
    /// recorded in its [`Activity`].
    pub fn remove_game_entity(
        &mut self,
        event_loop: &mut EventLoop<GameState>,
        id: EntityId,
    ) -> Option<GameEntity> {
        self.managers.remove(&id);
        let mut entity = self.entities.shift_remove(&id)?;
        if let Ok(activity) = entity.get_mut::<Activity>() {
            let cancelled = activity
                .replace_events(Vec::new())
                .into_iter()
                .filter(|event| event_loop.cancel(*event))
                .count();
            debug!(entity = %id, cancelled, "entity removed");
        }
        Some(entity)
    }

    /// Looks up an entity.
    ///
    /// # Errors
    ///
    /// Returns [`GameStateError::EntityNotFound`] if absent.
    pub fn entity(&self, id: EntityId) -> Result<&GameEntity, GameStateError> {
        self.entities
            .get(&id)
            .ok_or(GameStateError::EntityNotFound(id))
    }

    /// Mutable entity lookup.
    ///
    /// # Errors
    ///
    /// Returns [`GameStateError::EntityNotFound`] if absent.
    pub fn entity_mut(&mut self, id: EntityId) -> Result<&mut GameEntity, GameStateError> {
        self.entities
            .get_mut(&id)
            .ok_or(GameStateError::EntityNotFound(id))
    }

    /// Returns `true` if the entity exists.
    #[must_use]
    pub fn contains_entity(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Every entity in insertion order.
    pub fn get_game_entities(&self) -> impl Iterator<Item = &GameEntity> {
        self.entities.values()
    }

    /// Number of entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// The manager of an entity.
    ///
    /// # Errors
    ///
    /// Returns [`GameStateError::EntityNotFound`] if absent.
    pub fn manager(&self, id: EntityId) -> Result<&GameEntityManager, GameStateError> {
        self.managers
            .get(&id)
            .ok_or(GameStateError::EntityNotFound(id))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Commands
    // ─────────────────────────────────────────────────────────────────────

    /// Queues `command` on an entity at `time` and re-predicts the entity's
    /// pending events. Returns the timestamp the command was keyed at.
    ///
    /// # Errors
    ///
    /// Returns [`GameStateError::EntityNotFound`] or
    /// [`GameStateError::ComponentNotFound`] without a command queue.
    pub fn enqueue_command(
        &mut self,
        event_loop: &mut EventLoop<GameState>,
        entity: EntityId,
        time: SimTime,
        command: Command,
    ) -> Result<SimTime, GameStateError> {
        let keyed = self
            .entity_mut(entity)?
            .get_mut::<CommandQueue>()?
            .add_command(time, command);
        let rescheduled = event_loop.reschedule_on_change(entity.target(), self, keyed);
        debug!(
            entity = %entity,
            command = %command.kind(),
            time = %keyed,
            rescheduled,
            "command enqueued"
        );
        Ok(keyed)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Spawn outbox
    // ─────────────────────────────────────────────────────────────────────

    pub(crate) fn push_spawn_response(&mut self, response: SpawnResponse) {
        self.spawn_responses.push(response);
    }

    /// Spawn responses not yet taken.
    #[must_use]
    pub fn spawn_responses(&self) -> &[SpawnResponse] {
        &self.spawn_responses
    }

    /// Drains the spawn outbox.
    pub fn take_spawn_responses(&mut self) -> Vec<SpawnResponse> {
        core::mem::take(&mut self.spawn_responses)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Snapshots
    // ─────────────────────────────────────────────────────────────────────

    /// Captures an entity's activity state.
    ///
    /// # Errors
    ///
    /// Returns [`GameStateError::EntityNotFound`] or
    /// [`GameStateError::ComponentNotFound`].
    pub fn snapshot(&self, id: EntityId) -> Result<ActivitySnapshot, GameStateError> {
        let entity = self.entity(id)?;
        let activity = entity.get::<Activity>()?;
        Ok(ActivitySnapshot {
            entity: id,
            node: activity.current_node(),
            timer: activity.timer(),
            active: activity.is_active(),
            commands: entity.get::<CommandQueue>()?.entries(),
        })
    }

    /// Applies a snapshot to its entity. Pending continuation events are not
    /// touched; see [`Simulation::restore`](crate::Simulation::restore).
    ///
    /// # Errors
    ///
    /// Returns [`GameStateError::EntityNotFound`] or
    /// [`GameStateError::ComponentNotFound`], or
    /// [`GameStateError::Activity`] if the node is not in the entity's graph.
    pub fn restore(&mut self, snapshot: &ActivitySnapshot) -> Result<(), GameStateError> {
        let entity = self.entity_mut(snapshot.entity)?;

        let activity = entity.get_mut::<Activity>()?;
        if let Some(node) = snapshot.node.filter(|node| !activity.graph().contains(*node)) {
            return Err(ActivityError::NodeNotFound(node).into());
        }
        activity.reset();
        activity.set_current_node(snapshot.node);
        if let Some(timer) = snapshot.timer {
            activity.set_timer(timer);
        }
        if !snapshot.active {
            activity.deactivate();
        }

        entity
            .get_mut::<CommandQueue>()?
            .replace(snapshot.commands.iter().copied());
        debug!(entity = %snapshot.entity, node = ?snapshot.node, "activity restored");
        Ok(())
    }
}
