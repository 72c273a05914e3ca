//! Game entities and simulation orchestration for Vanguard (Layer 2).
//!
//! `vanguard_gamestate` turns activity graphs into a running simulation:
//!
//! - [`entity`] - Game entities composed of typed components
//! - [`component`] - Position, ownership, command queue, activity, abilities
//! - [`system`] - Activity advancement and movement
//! - [`tasks`] - Task actions used by behavior graphs
//! - [`behavior`] - Registry of named behavior graphs
//! - [`factory`] - Template-driven entity creation
//! - [`event`] - Event handlers for activity continuation and spawning
//! - [`manager`] - Per-entity bridge between the event loop and activities
//! - [`simulation`] - The top-level orchestrator
//! - [`plugin`] - Plugin lifecycle for simulation infrastructure
//!
//! # Architecture
//!
//! - **Layer 0** (`vanguard_curve`, `vanguard_event`): time, curves, events
//! - **Layer 1** (`vanguard_activity`): graph and executor
//! - **Layer 2** (`vanguard_gamestate`): actors, components, systems (this crate)
//! - **Layer 3** (`vanguard_core_plugins`): tracing and diagnostics
//!
//! See [`Simulation`] for an end-to-end example.

pub mod behavior;
pub mod command;
pub mod component;
pub mod config;
pub mod coord;
pub mod entity;
pub mod error;
pub mod event;
pub mod factory;
pub mod manager;
pub mod plugin;
pub mod simulation;
pub mod snapshot;
pub mod state;
pub mod system;
pub mod tasks;

pub use behavior::{BehaviorRegistry, STANDARD_UNIT_BEHAVIOR, standard_unit_graph};
pub use command::{Command, CommandKind};
pub use component::{
    Activity, CommandQueue, Component, ComponentKind, ComponentType, MoveAbility, Ownership,
    PlayerId, Position, TurnAbility,
};
pub use config::SimulationConfig;
pub use coord::{Angle, Phys3, WORLD_ORIGIN};
pub use entity::{EntityId, GameEntity};
pub use error::GameStateError;
pub use event::{SpawnRequest, SpawnResponse};
pub use factory::{EntityFactory, EntityTemplate, TemplateFactory};
pub use manager::GameEntityManager;
pub use plugin::{Plugin, PluginId};
pub use simulation::Simulation;
pub use snapshot::ActivitySnapshot;
pub use state::GameState;
pub use system::{ActivitySystem, Move};

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::behavior::*;
    pub use crate::command::*;
    pub use crate::component::*;
    pub use crate::config::*;
    pub use crate::coord::*;
    pub use crate::entity::*;
    pub use crate::error::*;
    pub use crate::event::*;
    pub use crate::factory::*;
    pub use crate::plugin::*;
    pub use crate::simulation::*;
    pub use crate::snapshot::*;
    pub use crate::state::*;
    pub use crate::system::*;
}
