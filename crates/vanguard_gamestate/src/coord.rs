//! World-space coordinates.

use core::fmt;
use core::ops::{Add, Sub};

use serde::{Deserialize, Serialize};
use vanguard_curve::time::FRACTIONAL_BITS;
use vanguard_curve::{Coord, FixedPoint, Interpolate};

/// Heading in degrees, `[0, 360)`, counter-clockwise from the positive x
/// axis.
pub type Angle = FixedPoint;

/// Full circle in degrees.
const FULL_TURN: i64 = 360;

/// A point in physics space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Phys3 {
    /// East-west component.
    pub x: Coord,
    /// North-south component.
    pub y: Coord,
    /// Elevation.
    pub z: Coord,
}

/// Spawn position used when a request does not name one.
pub const WORLD_ORIGIN: Phys3 = Phys3 {
    x: Coord::ZERO,
    y: Coord::ZERO,
    z: Coord::ZERO,
};

impl Phys3 {
    /// Creates a point from its components.
    #[must_use]
    pub const fn new(x: Coord, y: Coord, z: Coord) -> Self {
        Self { x, y, z }
    }

    /// Creates a point from integer components.
    #[must_use]
    pub const fn from_ints(x: i64, y: i64, z: i64) -> Self {
        Self::new(Coord::from_int(x), Coord::from_int(y), Coord::from_int(z))
    }

    /// Euclidean length of this point treated as a vector.
    #[must_use]
    pub fn length(self) -> Coord {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Self) -> Coord {
        (other - self).length()
    }

    /// Heading from `self` towards `other` in the ground plane, or `None`
    /// if both points share the same ground position.
    #[must_use]
    pub fn heading_to(self, other: Self) -> Option<Angle> {
        let delta = other - self;
        if delta.x == Coord::ZERO && delta.y == Coord::ZERO {
            return None;
        }
        Some(atan2_degrees(delta.y, delta.x))
    }
}

/// `atan(2^-i)` in degrees, scaled by `2^32`.
const ATAN_STEPS: [i64; 32] = [
    193_273_528_320,
    114_096_026_022,
    60_285_206_653,
    30_601_712_202,
    15_360_239_180,
    7_687_607_525,
    3_844_741_810,
    1_922_488_225,
    961_258_780,
    480_631_223,
    240_315_841,
    120_157_949,
    60_078_978,
    30_039_490,
    15_019_745,
    7_509_872,
    3_754_936,
    1_877_468,
    938_734,
    469_367,
    234_684,
    117_342,
    58_671,
    29_335,
    14_668,
    7_334,
    3_667,
    1_833,
    917,
    458,
    229,
    115,
];

/// Magnitude the CORDIC input is normalized to, in bits.
const CORDIC_BITS: u32 = 40;

/// Integer CORDIC arctangent in `[0, 360)`. Uses no floating point, so the
/// result is identical on every target. `(y, x)` must not both be zero.
fn atan2_degrees(y: Coord, x: Coord) -> Angle {
    let (mut x, mut y) = (i128::from(x.raw()), i128::from(y.raw()));
    if y == 0 {
        return if x > 0 { Angle::ZERO } else { Angle::from_int(180) };
    }
    if x == 0 {
        return if y > 0 { Angle::from_int(90) } else { Angle::from_int(270) };
    }

    let mut base = 0;
    if x < 0 {
        x = -x;
        y = -y;
        base = 180;
    }
    while x.abs().max(y.abs()) >= 1 << (CORDIC_BITS + 1) {
        x >>= 1;
        y >>= 1;
    }
    while x.abs().max(y.abs()) < 1 << CORDIC_BITS {
        x <<= 1;
        y <<= 1;
    }

    // rotate (x, y) onto the positive x axis, summing the rotation
    let mut sum: i128 = 0;
    for (shift, step) in ATAN_STEPS.iter().enumerate() {
        let (dx, dy) = (y >> shift, x >> shift);
        if y > 0 {
            x += dx;
            y -= dy;
            sum += i128::from(*step);
        } else {
            x -= dx;
            y += dy;
            sum -= i128::from(*step);
        }
    }

    let half = 1_i128 << (FRACTIONAL_BITS - 1);
    let raw = (sum + half) >> FRACTIONAL_BITS;
    let raw = i64::try_from(raw).unwrap_or_default();
    normalize_angle(Angle::from_raw(raw) + Angle::from_int(base))
}

/// Wraps an angle into `[0, 360)`.
#[must_use]
pub fn normalize_angle(angle: Angle) -> Angle {
    let full = Angle::from_int(FULL_TURN).raw();
    Angle::from_raw(angle.raw().rem_euclid(full))
}

impl Add for Phys3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Phys3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Interpolate for Phys3 {
    fn lerp(&self, other: &Self, fraction: FixedPoint) -> Self {
        Self::new(
            self.x.lerp(&other.x, fraction),
            self.y.lerp(&other.y, fraction),
            self.z.lerp(&other.z, fraction),
        )
    }
}

impl fmt::Display for Phys3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}
