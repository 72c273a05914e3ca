//! Simulation orchestration.
//!
//! A [`Simulation`] owns the event loop and the game state, registers the
//! game's event handlers and runs the plugin lifecycle. Producers talk to it
//! through [`spawn`](Simulation::spawn) and
//! [`enqueue_command`](Simulation::enqueue_command); time only moves through
//! [`advance_to`](Simulation::advance_to).
//!
//! # Example
//!
//! ```
//! use vanguard_curve::{Coord, SimTime};
//! use vanguard_gamestate::{
//!     BehaviorRegistry, Command, EntityTemplate, Phys3, Position, STANDARD_UNIT_BEHAVIOR,
//!     Simulation, SimulationConfig, SpawnRequest, TemplateFactory,
//! };
//!
//! let factory = TemplateFactory::new(BehaviorRegistry::with_standard_behaviors().unwrap())
//!     .with_template(
//!         "scout",
//!         EntityTemplate::new(STANDARD_UNIT_BEHAVIOR).with_move_speed(Coord::from_int(1)),
//!     );
//! let mut simulation = Simulation::new(SimulationConfig::default(), factory).unwrap();
//! simulation.finish().unwrap();
//!
//! simulation.spawn(SpawnRequest::new(1, "scout"), SimTime::ZERO).unwrap();
//! simulation.advance_to(SimTime::ZERO).unwrap();
//! let scout = simulation.state().spawn_responses()[0].entity;
//!
//! let target = Phys3::from_ints(10, 0, 0);
//! simulation
//!     .enqueue_command(scout, SimTime::from_int(5), Command::Move { target })
//!     .unwrap();
//! simulation.advance_to(SimTime::from_int(20)).unwrap();
//!
//! let position = simulation.state().entity(scout).unwrap().get::<Position>().unwrap();
//! assert_eq!(position.get_position(SimTime::from_int(15)), target);
//! ```

use core::any::{Any, TypeId};
use std::sync::Arc;

use hashbrown::{HashMap, HashSet};
use tracing::{debug, info, warn};
use vanguard_activity::{ActivityEvent, ActivityEventKind, ActivityExecutor, ActivityHooks};
use vanguard_curve::SimTime;
use vanguard_event::{EventError, EventId, EventLoop, ReachReport};

use crate::command::Command;
use crate::config::SimulationConfig;
use crate::entity::{EntityId, GameEntity};
use crate::error::GameStateError;
use crate::event::{
    ActivityHandler, SPAWN_ENTITY_HANDLER_ID, SPAWNER_TARGET, SpawnEntityHandler, SpawnRequest,
};
use crate::factory::EntityFactory;
use crate::plugin::{Plugin, PluginEntry, PluginId};
use crate::snapshot::ActivitySnapshot;
use crate::state::GameState;

/// Name of the observer installed by [`SimulationConfig::log_transitions`].
const TRANSITION_LOG_HOOK: &str = "vanguard::transition_log";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BuildState {
    NotStarted,
    Building,
    Built,
}

/// The event loop, the game state and the plugins around them.
pub struct Simulation {
    config: SimulationConfig,
    state: GameState,
    event_loop: EventLoop<GameState>,
    hooks: Arc<ActivityHooks>,
    resources: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
    pending_plugins: Vec<PluginEntry>,
    built_plugins: Vec<PluginEntry>,
    plugin_ids: HashSet<PluginId>,
    build_state: BuildState,
}

impl Simulation {
    /// Creates a simulation building entities with `factory`.
    ///
    /// # Errors
    ///
    /// Returns [`GameStateError::Config`] for an invalid configuration.
    pub fn new(
        config: SimulationConfig,
        factory: impl EntityFactory,
    ) -> Result<Self, GameStateError> {
        config.validate()?;

        let hooks = Arc::new(ActivityHooks::new());
        if config.log_transitions {
            hooks.register_observer(
                [ActivityEventKind::NodeEntered],
                TRANSITION_LOG_HOOK,
                |event: &ActivityEvent| {
                    if let ActivityEvent::NodeEntered {
                        actor,
                        node,
                        node_type,
                        time,
                    } = event
                    {
                        debug!(entity = actor, node = %node, node_type = %node_type, time = %time, "node entered");
                    }
                },
            )?;
        }
        let executor = ActivityExecutor::new()
            .with_max_steps(config.max_activity_steps)
            .with_hooks(Arc::clone(&hooks));

        let mut event_loop = EventLoop::new();
        event_loop.add_event_handler(ActivityHandler)?;
        event_loop.add_event_handler(SpawnEntityHandler::new(Arc::new(factory)))?;

        Ok(Self {
            state: GameState::new(config.clone(), executor),
            config,
            event_loop,
            hooks,
            resources: HashMap::new(),
            pending_plugins: Vec::new(),
            built_plugins: Vec::new(),
            plugin_ids: HashSet::new(),
            build_state: BuildState::NotStarted,
        })
    }

    // ─────────────────────────────────────────────────────────────────────
    // Plugin Management
    // ─────────────────────────────────────────────────────────────────────

    /// Adds a plugin.
    ///
    /// # Errors
    ///
    /// Returns [`GameStateError::DuplicatePlugin`] if a unique plugin of the
    /// same type was already added.
    pub fn add_plugins<P: Plugin>(&mut self, plugin: P) -> Result<&mut Self, GameStateError> {
        let id = PluginId::of::<P>();
        if plugin.is_unique() && self.plugin_ids.contains(&id) {
            return Err(GameStateError::DuplicatePlugin(plugin.name().to_owned()));
        }
        self.plugin_ids.insert(id);

        let entry = PluginEntry {
            id,
            plugin: Box::new(plugin),
        };
        match self.build_state {
            BuildState::NotStarted => self.pending_plugins.push(entry),
            BuildState::Building => {
                entry.plugin.build(self);
                self.built_plugins.push(entry);
            }
            BuildState::Built => {
                entry.plugin.build(self);
                entry.plugin.ready(self);
                self.built_plugins.push(entry);
            }
        }
        Ok(self)
    }

    /// Returns true if a plugin of the given type has been added.
    #[must_use]
    pub fn has_plugin<P: Plugin>(&self) -> bool {
        self.plugin_ids.contains(&PluginId::of::<P>())
    }

    /// Builds and readies every pending plugin.
    ///
    /// # Errors
    ///
    /// Returns [`GameStateError::AlreadyFinished`] if called twice.
    pub fn finish(&mut self) -> Result<(), GameStateError> {
        if self.build_state != BuildState::NotStarted {
            return Err(GameStateError::AlreadyFinished);
        }

        self.build_state = BuildState::Building;
        for entry in core::mem::take(&mut self.pending_plugins) {
            entry.plugin.build(self);
            self.built_plugins.push(entry);
        }

        self.build_state = BuildState::Built;
        let built = core::mem::take(&mut self.built_plugins);
        for entry in &built {
            entry.plugin.ready(self);
        }
        let added_during_ready = core::mem::replace(&mut self.built_plugins, built);
        self.built_plugins.extend(added_during_ready);

        info!(plugins = self.built_plugins.len(), "simulation ready");
        Ok(())
    }

    /// Cleans up all plugins in reverse insertion order.
    pub fn cleanup(&mut self) {
        let built = core::mem::take(&mut self.built_plugins);
        for entry in built.iter().rev() {
            entry.plugin.cleanup(self);
        }
        self.built_plugins = built;
    }

    // ─────────────────────────────────────────────────────────────────────
    // Resources
    // ─────────────────────────────────────────────────────────────────────

    /// Stores a resource, replacing any previous value of the same type.
    pub fn insert_resource<R: Any + Send + Sync>(&mut self, resource: R) {
        self.resources.insert(TypeId::of::<R>(), Box::new(resource));
    }

    /// Returns a resource by type.
    #[must_use]
    pub fn get_resource<R: Any + Send + Sync>(&self) -> Option<&R> {
        self.resources
            .get(&TypeId::of::<R>())
            .and_then(|resource| resource.downcast_ref())
    }

    /// Returns true if a resource of this type exists.
    #[must_use]
    pub fn contains_resource<R: Any + Send + Sync>(&self) -> bool {
        self.resources.contains_key(&TypeId::of::<R>())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Producers
    // ─────────────────────────────────────────────────────────────────────

    /// Schedules a spawn at `time`. The entity exists once the loop reaches
    /// `time`; its id is reported through
    /// [`GameState::spawn_responses`].
    ///
    /// # Errors
    ///
    /// Returns [`GameStateError::Event`] if the loop rejects the event.
    pub fn spawn(&mut self, request: SpawnRequest, time: SimTime) -> Result<EventId, GameStateError> {
        Ok(self.event_loop.create_event(
            SPAWN_ENTITY_HANDLER_ID,
            SPAWNER_TARGET,
            &self.state,
            time,
            request,
        )?)
    }

    /// Queues a command on an entity. See [`GameState::enqueue_command`].
    ///
    /// # Errors
    ///
    /// Returns [`GameStateError::EntityNotFound`] or
    /// [`GameStateError::ComponentNotFound`].
    pub fn enqueue_command(
        &mut self,
        entity: EntityId,
        time: SimTime,
        command: Command,
    ) -> Result<SimTime, GameStateError> {
        self.state
            .enqueue_command(&mut self.event_loop, entity, time, command)
    }

    /// Removes an entity and cancels its pending continuations.
    ///
    /// Returns the removed entity, or `None` if there was none.
    pub fn remove_entity(&mut self, entity: EntityId) -> Option<GameEntity> {
        self.state.remove_game_entity(&mut self.event_loop, entity)
    }

    /// Runs every event up to and including `time`.
    ///
    /// Individual handler failures are collected in the report; they never
    /// stop the run.
    ///
    /// # Errors
    ///
    /// Returns [`GameStateError::Event`] if `time` precedes the loop's
    /// current time.
    pub fn advance_to(&mut self, time: SimTime) -> Result<ReachReport, GameStateError> {
        let report = self.event_loop.reach_time(time, &mut self.state)?;
        if !report.is_ok() {
            warn!(
                time = %time,
                failures = report.failures.len(),
                "events failed while advancing"
            );
        }
        Ok(report)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Snapshots
    // ─────────────────────────────────────────────────────────────────────

    /// Captures an entity's activity state.
    ///
    /// # Errors
    ///
    /// See [`GameState::snapshot`].
    pub fn snapshot(&self, entity: EntityId) -> Result<ActivitySnapshot, GameStateError> {
        self.state.snapshot(entity)
    }

    /// Restores an entity's activity state and continues it from `time`.
    ///
    /// `time` must not precede [`now`](Self::now): the restored activity
    /// writes keyframes and a wake timer from `time` on.
    ///
    /// # Errors
    ///
    /// - [`GameStateError::Event`] with [`EventError::TimeRegression`] if
    ///   `time` is before the loop's current time. Nothing is restored.
    /// - See [`GameState::restore`] and
    ///   [`GameEntityManager::run_activity_system`](crate::GameEntityManager::run_activity_system).
    pub fn restore(
        &mut self,
        snapshot: &ActivitySnapshot,
        time: SimTime,
    ) -> Result<(), GameStateError> {
        let now = self.event_loop.now();
        if time < now {
            return Err(EventError::TimeRegression {
                requested: time,
                now,
            }
            .into());
        }
        self.state.restore(snapshot)?;
        let manager = self.state.manager(snapshot.entity)?.clone();
        manager.run_activity_system(&mut self.event_loop, &mut self.state, time)?;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// The game state.
    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Mutable game state.
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    /// The event loop.
    #[must_use]
    pub fn event_loop(&self) -> &EventLoop<GameState> {
        &self.event_loop
    }

    /// The activity observer registry shared by every entity manager.
    #[must_use]
    pub fn hooks(&self) -> &Arc<ActivityHooks> {
        &self.hooks
    }

    /// The event loop's current time.
    #[must_use]
    pub fn now(&self) -> SimTime {
        self.event_loop.now()
    }
}

impl core::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Simulation")
            .field("config", &self.config)
            .field("now", &self.event_loop.now())
            .field("entities", &self.state.entity_count())
            .field("pending_events", &self.event_loop.pending())
            .field("plugins", &self.built_plugins)
            .finish_non_exhaustive()
    }
}
