//! A deterministic activity graph engine for real-time strategy simulations.
//!
//! Entities run behavior graphs (tasks, conditions and waits) that are
//! advanced by a predictive event loop: nothing is polled, every actor is
//! woken exactly when its next command or timer is due.
//!
//! See [`vanguard_gamestate::Simulation`] for an end-to-end example.

pub use vanguard_internal::*;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use vanguard_internal::prelude::*;
}
