//! Keyframe curves.
//!
//! A curve stores `(time, value)` keyframes and answers "what was the value at
//! time `t`". [`Discrete`] is a step function, [`Continuous`] interpolates
//! linearly between neighbouring keyframes.
//!
//! Both curves begin with an initial keyframe at [`SimTime::MIN`], so sampling
//! always yields a value.

use crate::time::{FixedPoint, SimTime};

/// Values that can be linearly interpolated.
pub trait Interpolate: Clone {
    /// Returns the value `fraction` of the way from `self` to `other`.
    ///
    /// `fraction` is in `[0, 1]`.
    #[must_use]
    fn lerp(&self, other: &Self, fraction: FixedPoint) -> Self;
}

impl Interpolate for FixedPoint {
    fn lerp(&self, other: &Self, fraction: FixedPoint) -> Self {
        *self + (*other - *self) * fraction
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Keyframes<T> {
    frames: Vec<(SimTime, T)>,
}

impl<T> Keyframes<T> {
    fn new(initial: T) -> Self {
        Self {
            frames: vec![(SimTime::MIN, initial)],
        }
    }

    /// Number of keyframes at or before `time`. Always at least one.
    fn split(&self, time: SimTime) -> usize {
        self.frames
            .partition_point(|(at, _)| *at <= time)
            .max(1)
    }

    fn at(&self, time: SimTime) -> &(SimTime, T) {
        &self.frames[self.split(time) - 1]
    }

    fn after(&self, time: SimTime) -> Option<&(SimTime, T)> {
        self.frames.get(self.split(time))
    }

    fn set_last(&mut self, time: SimTime, value: T) {
        let split = self.split(time);
        self.frames.truncate(split);
        self.frames.push((time, value));
    }

    fn set_insert(&mut self, time: SimTime, value: T) {
        let split = self.split(time);
        self.frames.insert(split, (time, value));
    }

    fn last(&self) -> &(SimTime, T) {
        // never empty: the initial keyframe cannot be removed
        &self.frames[self.frames.len() - 1]
    }
}

/// A step-function curve.
///
/// Sampling returns the value of the latest keyframe at or before the sample
/// time.
#[derive(Debug, Clone, PartialEq)]
pub struct Discrete<T> {
    keyframes: Keyframes<T>,
}

impl<T> Discrete<T> {
    /// Creates a curve holding `initial` for all time.
    #[must_use]
    pub fn new(initial: T) -> Self {
        Self {
            keyframes: Keyframes::new(initial),
        }
    }

    /// Returns the value at `time`.
    #[must_use]
    pub fn get(&self, time: SimTime) -> &T {
        &self.keyframes.at(time).1
    }

    /// Sets `value` from `time` on, erasing every keyframe after `time`.
    pub fn set_last(&mut self, time: SimTime, value: T) {
        self.keyframes.set_last(time, value);
    }

    /// Inserts a keyframe at `time` without erasing later keyframes.
    pub fn set_insert(&mut self, time: SimTime, value: T) {
        self.keyframes.set_insert(time, value);
    }

    /// Returns the latest keyframe.
    #[must_use]
    pub fn last(&self) -> (SimTime, &T) {
        let (time, value) = self.keyframes.last();
        (*time, value)
    }

    /// Iterates over all keyframes in time order.
    pub fn keyframes(&self) -> impl Iterator<Item = (SimTime, &T)> {
        self.keyframes.frames.iter().map(|(time, value)| (*time, value))
    }
}

impl<T: Default> Default for Discrete<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// A linearly interpolated curve.
#[derive(Debug, Clone, PartialEq)]
pub struct Continuous<T> {
    keyframes: Keyframes<T>,
}

impl<T: Interpolate> Continuous<T> {
    /// Creates a curve holding `initial` until the first keyframe.
    #[must_use]
    pub fn new(initial: T) -> Self {
        Self {
            keyframes: Keyframes::new(initial),
        }
    }

    /// Returns the value at `time`, interpolated between the surrounding
    /// keyframes.
    #[must_use]
    pub fn get(&self, time: SimTime) -> T {
        let (from_time, from) = self.keyframes.at(time);
        let Some((to_time, to)) = self.keyframes.after(time) else {
            return from.clone();
        };
        if !from_time.is_finite() {
            return from.clone();
        }
        let fraction = (time - *from_time)
            .checked_div(*to_time - *from_time)
            .unwrap_or(FixedPoint::ONE);
        from.lerp(to, fraction)
    }

    /// Sets `value` at `time`, erasing every keyframe after `time`.
    pub fn set_last(&mut self, time: SimTime, value: T) {
        self.keyframes.set_last(time, value);
    }

    /// Inserts a keyframe at `time` without erasing later keyframes.
    pub fn set_insert(&mut self, time: SimTime, value: T) {
        self.keyframes.set_insert(time, value);
    }

    /// Returns the latest keyframe.
    #[must_use]
    pub fn last(&self) -> (SimTime, &T) {
        let (time, value) = self.keyframes.last();
        (*time, value)
    }
}

impl<T: Interpolate + Default> Default for Continuous<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(value: i64) -> SimTime {
        SimTime::from_int(value)
    }

    #[test]
    fn discrete_steps() {
        let mut owner = Discrete::new(0_u32);
        owner.set_last(t(10), 1);
        owner.set_last(t(20), 2);

        assert_eq!(*owner.get(t(0)), 0);
        assert_eq!(*owner.get(t(10)), 1);
        assert_eq!(*owner.get(t(15)), 1);
        assert_eq!(*owner.get(t(25)), 2);
    }

    #[test]
    fn set_last_erases_future() {
        let mut curve = Discrete::new(0_u32);
        curve.set_last(t(10), 1);
        curve.set_last(t(20), 2);
        curve.set_last(t(15), 3);

        assert_eq!(*curve.get(t(25)), 3);
        assert_eq!(curve.last(), (t(15), &3));
    }

    #[test]
    fn set_insert_keeps_future() {
        let mut curve = Discrete::new(0_u32);
        curve.set_last(t(20), 2);
        curve.set_insert(t(10), 1);

        assert_eq!(*curve.get(t(15)), 1);
        assert_eq!(*curve.get(t(25)), 2);
    }

    #[test]
    fn continuous_interpolates() {
        let mut x = Continuous::new(FixedPoint::ZERO);
        x.set_last(t(0), t(0));
        x.set_last(t(10), t(100));

        assert_eq!(x.get(t(5)), t(50));
        assert_eq!(x.get(t(10)), t(100));
        assert_eq!(x.get(t(50)), t(100));
        assert_eq!(x.get(t(-5)), t(0));
    }
}
