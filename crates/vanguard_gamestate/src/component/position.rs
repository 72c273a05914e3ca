use vanguard_curve::{Continuous, Discrete, SimTime};

use crate::coord::{Angle, Phys3, WORLD_ORIGIN, normalize_angle};

/// Position and heading of an entity over time.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    position: Continuous<Phys3>,
    angle: Discrete<Angle>,
}

impl Default for Position {
    fn default() -> Self {
        Self::new(WORLD_ORIGIN)
    }
}

impl Position {
    /// Creates a component resting at `initial` with a heading of zero.
    #[must_use]
    pub fn new(initial: Phys3) -> Self {
        Self {
            position: Continuous::new(initial),
            angle: Discrete::new(Angle::ZERO),
        }
    }

    /// Position at `time`, interpolated between keyframes.
    #[must_use]
    pub fn get_position(&self, time: SimTime) -> Phys3 {
        self.position.get(time)
    }

    /// Sets the position at `time`, dropping every later keyframe.
    pub fn set_position(&mut self, time: SimTime, position: Phys3) {
        self.position.set_last(time, position);
    }

    /// Heading at `time`.
    #[must_use]
    pub fn get_angle(&self, time: SimTime) -> Angle {
        *self.angle.get(time)
    }

    /// Sets the heading at `time`, wrapped into `[0, 360)`.
    pub fn set_angle(&mut self, time: SimTime, angle: Angle) {
        self.angle.set_last(time, normalize_angle(angle));
    }

    /// The position curve.
    #[must_use]
    pub fn positions(&self) -> &Continuous<Phys3> {
        &self.position
    }
}
