//! Error types for the game state layer.

use vanguard_activity::{ActivityError, HookRegistrationError, ValidationError};
use vanguard_curve::SimTime;
use vanguard_event::EventError;

use crate::component::ComponentKind;
use crate::entity::EntityId;

/// Errors raised by entities, systems and the simulation.
#[derive(Debug, thiserror::Error)]
pub enum GameStateError {
    /// The entity lacks a required component.
    #[error("{entity} has no {kind} component")]
    ComponentNotFound {
        /// The entity that was queried.
        entity: EntityId,
        /// The missing component.
        kind: ComponentKind,
    },

    /// No entity with this id exists.
    #[error("{0} not found")]
    EntityNotFound(EntityId),

    /// An actor was advanced at a time before its previous advance.
    #[error("cannot advance {entity} at {requested}: last advanced at {last}")]
    TimeRegression {
        /// The actor.
        entity: EntityId,
        /// The requested time.
        requested: SimTime,
        /// Time of the previous advance.
        last: SimTime,
    },

    /// The factory has no template with this id.
    #[error("unknown entity template '{0}'")]
    UnknownTemplate(String),

    /// No behavior graph is registered under this id.
    #[error("unknown behavior '{0}'")]
    UnknownBehavior(String),

    /// A behavior graph failed validation.
    #[error("behavior '{behavior}' is invalid: {}", format_errors(.errors))]
    InvalidBehavior {
        /// The behavior id.
        behavior: String,
        /// Every problem found.
        errors: Vec<ValidationError>,
    },

    /// A unique plugin was added twice.
    #[error("plugin '{0}' is unique and was already added")]
    DuplicatePlugin(String),

    /// [`Simulation::finish`](crate::Simulation::finish) ran twice.
    #[error("simulation is already finished")]
    AlreadyFinished,

    /// Activity advancement failed.
    #[error(transparent)]
    Activity(#[from] ActivityError),

    /// An activity observer could not be registered.
    #[error(transparent)]
    Hook(#[from] HookRegistrationError),

    /// The event loop rejected an operation.
    #[error(transparent)]
    Event(#[from] EventError),

    /// Configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A snapshot could not be encoded or decoded.
    #[error("snapshot serialization failed: {0}")]
    Snapshot(#[from] serde_json::Error),
}

fn format_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
