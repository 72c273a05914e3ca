use serde::{Deserialize, Serialize};
use vanguard_curve::Coord;

/// Ability to move, supplied by the entity's template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveAbility {
    /// Distance covered per unit of simulation time.
    pub speed: Coord,
}

/// Ability to turn, supplied by the entity's template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnAbility {
    /// Degrees turned per unit of simulation time. Turning is applied
    /// instantly at the start of a move; a non-positive speed disables it.
    pub turn_speed: Coord,
}
