//! Actor commands.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::coord::Phys3;
use crate::entity::EntityId;

/// An intent queued on an actor.
///
/// Commands are immutable once enqueued; the queue's timestamp is their
/// ordering key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Command {
    /// Do nothing.
    Idle,
    /// Move to a position.
    Move {
        /// Destination.
        target: Phys3,
    },
    /// Attack another entity.
    Attack {
        /// The entity to attack.
        target: EntityId,
    },
}

/// Discriminant of [`Command`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// [`Command::Idle`].
    Idle,
    /// [`Command::Move`].
    Move,
    /// [`Command::Attack`].
    Attack,
}

impl Command {
    /// Returns the command's kind.
    #[must_use]
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Idle => CommandKind::Idle,
            Command::Move { .. } => CommandKind::Move,
            Command::Attack { .. } => CommandKind::Attack,
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CommandKind::Idle => "idle",
            CommandKind::Move => "move",
            CommandKind::Attack => "attack",
        };
        f.write_str(name)
    }
}
