//! Stateless systems operating on entities.
//!
//! - [`ActivitySystem`] advances an entity's behavior graph
//! - [`Move`] moves an entity towards a destination

mod activity;
mod movement;

pub use activity::ActivitySystem;
pub use movement::Move;
