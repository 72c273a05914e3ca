use tracing::{debug, trace};
use vanguard_curve::{Coord, SimTime};

use crate::command::Command;
use crate::component::{CommandQueue, MoveAbility, Position, TurnAbility};
use crate::coord::Phys3;
use crate::entity::GameEntity;
use crate::error::GameStateError;

/// Movement along a straight line at the entity's move speed.
pub struct Move;

impl Move {
    /// Moves the entity to the destination of the `Move` command due at
    /// `start`, consuming the command.
    ///
    /// Returns the runtime of the movement. If no command is due, or the
    /// front command is not a move, nothing happens and the runtime is zero.
    ///
    /// # Errors
    ///
    /// See [`move_default`](Self::move_default). The command stays queued
    /// when the entity cannot move at all.
    pub fn move_command(
        entity: &mut GameEntity,
        start: SimTime,
    ) -> Result<SimTime, GameStateError> {
        let id = entity.id();
        let destination = match entity.get::<CommandQueue>()?.front(start) {
            Some(Command::Move { target }) => *target,
            other => {
                trace!(entity = %id, command = ?other, "no move command due");
                return Ok(SimTime::ZERO);
            }
        };
        entity.get::<MoveAbility>()?;
        entity.get::<Position>()?;

        entity.get_mut::<CommandQueue>()?.pop_command(start);
        Self::move_default(entity, destination, start)
    }

    /// Moves the entity from its position at `start` to `destination`.
    ///
    /// Turns to face the destination first if the entity has a positive
    /// turn speed, then writes position keyframes at `start` and
    /// `start + runtime`. Returns the runtime. An entity without positive
    /// speed stays put and the runtime is zero.
    ///
    /// # Errors
    ///
    /// Returns [`GameStateError::ComponentNotFound`] without a position or
    /// move ability.
    pub fn move_default(
        entity: &mut GameEntity,
        destination: Phys3,
        start: SimTime,
    ) -> Result<SimTime, GameStateError> {
        let speed = entity.get::<MoveAbility>()?.speed;
        let can_turn = entity
            .get::<TurnAbility>()
            .is_ok_and(|turn| turn.turn_speed > Coord::ZERO);
        let id = entity.id();

        let position = entity.get_mut::<Position>()?;
        let current = position.get_position(start);

        if speed <= SimTime::ZERO {
            debug!(entity = %id, speed = %speed, "entity cannot move");
            return Ok(SimTime::ZERO);
        }
        if let Some(heading) = current.heading_to(destination).filter(|_| can_turn) {
            position.set_angle(start, heading);
        }

        let distance = current.distance(destination);
        let runtime = distance.checked_div(speed).unwrap_or(SimTime::ZERO);

        position.set_position(start, current);
        position.set_position(start + runtime, destination);

        debug!(
            entity = %id,
            from = %current,
            to = %destination,
            time = %start,
            runtime = %runtime,
            "move started"
        );
        Ok(runtime)
    }
}
