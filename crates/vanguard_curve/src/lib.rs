//! Time primitives for Vanguard (Layer 0).
//!
//! `vanguard_curve` provides the continuous time model every other layer
//! schedules against. "Now" is a fixed-point timestamp rather than a frame
//! counter, so two simulations fed the same inputs observe bit-identical
//! timestamps.
//!
//! # Core Concepts
//!
//! - [`SimTime`] - Fixed-point simulation timestamp (16 fractional bits)
//! - [`Queue`] - Time-indexed FIFO that never goes backward
//! - [`Discrete`] - Step-function keyframe curve
//! - [`Continuous`] - Linearly interpolated keyframe curve
//!
//! # Example
//!
//! ```
//! use vanguard_curve::{Queue, SimTime};
//!
//! let mut queue = Queue::new();
//! queue.insert(SimTime::from_int(20), "move");
//! queue.insert(SimTime::from_int(10), "attack");
//!
//! assert_eq!(queue.pop_front(SimTime::from_int(5)), None);
//! assert_eq!(queue.pop_front(SimTime::from_int(15)), Some("attack"));
//! ```
//!
//! # Architecture
//!
//! - **Layer 0** (`vanguard_curve`): time and curves (this crate)
//! - **Layer 1** (`vanguard_event`): predictive event scheduler
//! - **Layer 1** (`vanguard_activity`): activity graph and executor
//! - **Layer 2** (`vanguard_gamestate`): actors, components, systems

/// Keyframe curves sampled at simulation time.
pub mod keyframe;

/// Time-indexed queue.
pub mod queue;

/// Fixed-point time and coordinate values.
pub mod time;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::keyframe::{Continuous, Discrete, Interpolate};
    pub use crate::queue::{Queue, QueueEntry};
    pub use crate::time::{Coord, FixedPoint, SimTime};
}

pub use keyframe::{Continuous, Discrete, Interpolate};
pub use queue::{Queue, QueueEntry};
pub use time::{Coord, FixedPoint, SimTime};
