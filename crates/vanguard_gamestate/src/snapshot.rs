//! Serializable activity state of an entity.

use serde::{Deserialize, Serialize};
use vanguard_activity::NodeId;
use vanguard_curve::SimTime;

use crate::command::Command;
use crate::entity::EntityId;
use crate::error::GameStateError;

/// An entity's activity pointer, wake timer and pending commands.
///
/// Graphs are not part of a snapshot: restoring requires the entity to run
/// the same behavior graph it was taken from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivitySnapshot {
    /// The entity.
    pub entity: EntityId,
    /// Current node, `None` before initialization.
    pub node: Option<NodeId>,
    /// Armed wake timer.
    #[serde(default)]
    pub timer: Option<SimTime>,
    /// Whether the activity was still running.
    #[serde(default = "default_active")]
    pub active: bool,
    /// Pending commands in pop order.
    #[serde(default)]
    pub commands: Vec<(SimTime, Command)>,
}

fn default_active() -> bool {
    true
}

impl ActivitySnapshot {
    /// Encodes the snapshot as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`GameStateError::Snapshot`] if encoding fails.
    pub fn to_json(&self) -> Result<String, GameStateError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decodes a snapshot from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`GameStateError::Snapshot`] for malformed input.
    pub fn from_json(json: &str) -> Result<Self, GameStateError> {
        Ok(serde_json::from_str(json)?)
    }
}
