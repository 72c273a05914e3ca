//! Fixed-point values for simulation time and world coordinates.
//!
//! All scheduling decisions are taken on [`SimTime`], a signed 64-bit fixed
//! point number with [`FRACTIONAL_BITS`] fractional bits. Arithmetic saturates
//! so that [`SimTime::MAX`] behaves as "never": adding a runtime to an
//! infinite prediction stays infinite.

use core::fmt;
use core::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// Number of fractional bits in a [`FixedPoint`] value.
pub const FRACTIONAL_BITS: u32 = 16;

const SCALE: i64 = 1 << FRACTIONAL_BITS;

/// A signed fixed-point number with 16 fractional bits.
///
/// Ordering, equality and hashing operate on the raw representation, so two
/// values compare equal exactly when they are bit-identical.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct FixedPoint(i64);

/// Simulation timestamp.
pub type SimTime = FixedPoint;

/// World-space coordinate component.
pub type Coord = FixedPoint;

impl FixedPoint {
    /// The value `0`.
    pub const ZERO: Self = Self(0);
    /// The value `1`.
    pub const ONE: Self = Self(SCALE);
    /// Smallest representable value ("negative infinity").
    pub const MIN: Self = Self(i64::MIN);
    /// Largest representable value ("never").
    pub const MAX: Self = Self(i64::MAX);

    /// Creates a value from its raw fixed-point representation.
    #[must_use]
    pub const fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    /// Returns the raw fixed-point representation.
    #[must_use]
    pub const fn raw(self) -> i64 {
        self.0
    }

    /// Creates a value from an integer, saturating on overflow.
    #[must_use]
    pub const fn from_int(value: i64) -> Self {
        Self(value.saturating_mul(SCALE))
    }

    /// Creates a value from a float, rounding to the nearest representable
    /// value and saturating on overflow.
    ///
    /// Intended for configuration and test input only.
    #[must_use]
    pub fn from_f64(value: f64) -> Self {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "float to int casts saturate, which is the intended behavior"
        )]
        let raw = (value * SCALE as f64).round() as i64;
        Self(raw)
    }

    /// Converts to a float. Lossy; for diagnostics only.
    #[must_use]
    pub fn to_f64(self) -> f64 {
        self.0 as f64 / SCALE as f64
    }

    /// Returns the integer part, rounded towards negative infinity.
    #[must_use]
    pub const fn to_int(self) -> i64 {
        self.0 >> FRACTIONAL_BITS
    }

    /// Returns `true` unless this value is [`MAX`](Self::MAX) or [`MIN`](Self::MIN).
    #[must_use]
    pub const fn is_finite(self) -> bool {
        self.0 != i64::MAX && self.0 != i64::MIN
    }

    /// Returns the absolute value, saturating at [`MAX`](Self::MAX).
    #[must_use]
    pub const fn abs(self) -> Self {
        Self(self.0.saturating_abs())
    }

    /// Divides by `rhs`, returning `None` on division by zero.
    #[must_use]
    pub fn checked_div(self, rhs: Self) -> Option<Self> {
        if rhs.0 == 0 {
            return None;
        }
        let wide = (i128::from(self.0) << FRACTIONAL_BITS) / i128::from(rhs.0);
        Some(Self(saturate(wide)))
    }

    /// Returns the square root, or zero for non-positive values.
    #[must_use]
    pub fn sqrt(self) -> Self {
        if self.0 <= 0 {
            return Self::ZERO;
        }
        let widened = u128::from(self.0.unsigned_abs()) << FRACTIONAL_BITS;
        Self(i64::try_from(widened.isqrt()).unwrap_or(i64::MAX))
    }
}

fn saturate(value: i128) -> i64 {
    i64::try_from(value).unwrap_or(if value < 0 { i64::MIN } else { i64::MAX })
}

impl Add for FixedPoint {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for FixedPoint {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for FixedPoint {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl SubAssign for FixedPoint {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Mul for FixedPoint {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        let wide = (i128::from(self.0) * i128::from(rhs.0)) >> FRACTIONAL_BITS;
        Self(saturate(wide))
    }
}

impl Neg for FixedPoint {
    type Output = Self;

    fn neg(self) -> Self {
        Self(self.0.saturating_neg())
    }
}

impl From<i32> for FixedPoint {
    fn from(value: i32) -> Self {
        Self::from_int(i64::from(value))
    }
}

impl fmt::Display for FixedPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::MAX => write!(f, "inf"),
            Self::MIN => write!(f, "-inf"),
            value => write!(f, "{}", value.to_f64()),
        }
    }
}
