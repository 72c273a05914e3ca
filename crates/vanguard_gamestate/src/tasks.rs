//! Task actions for behavior graphs.

use tracing::debug;
use vanguard_activity::{Task, TaskError};

use crate::command::Command;
use crate::component::{Activity, CommandQueue};
use crate::entity::GameEntity;
use crate::system::Move;

/// Executes the due `Move` command and arms the activity timer for the end
/// of the movement.
#[must_use]
pub fn move_command() -> Task<GameEntity> {
    Task::new(|time, entity: &mut GameEntity| {
        let runtime = Move::move_command(entity, time).map_err(TaskError::failed)?;
        entity
            .get_mut::<Activity>()
            .map_err(TaskError::failed)?
            .set_timer(time + runtime);
        Ok(())
    })
}

/// Consumes the due command. Anything other than `Idle` is discarded.
#[must_use]
pub fn idle() -> Task<GameEntity> {
    Task::new(|time, entity: &mut GameEntity| {
        let id = entity.id();
        let queue = entity
            .get_mut::<CommandQueue>()
            .map_err(TaskError::failed)?;
        match queue.pop_command(time) {
            Some(Command::Idle) | None => {}
            Some(other) => {
                debug!(entity = %id, command = %other.kind(), "discarding unsupported command");
            }
        }
        Ok(())
    })
}
