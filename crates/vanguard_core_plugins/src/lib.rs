//! Core infrastructure plugins for Vanguard.
//!
//! - [`TracingPlugin`] - Logging via the `tracing` crate
//! - [`DiagnosticsPlugin`] - Activity event logging and counters
//!
//! # Example
//!
//! ```
//! use tracing::Level;
//! use vanguard_core_plugins::{ActivityStats, DiagnosticsPlugin, TracingPlugin};
//! use vanguard_gamestate::{Simulation, SimulationConfig, TemplateFactory};
//!
//! let mut simulation =
//!     Simulation::new(SimulationConfig::default(), TemplateFactory::default()).unwrap();
//! simulation
//!     .add_plugins(TracingPlugin::default().with_level(Level::WARN))
//!     .unwrap()
//!     .add_plugins(DiagnosticsPlugin)
//!     .unwrap();
//! simulation.finish().unwrap();
//!
//! assert!(simulation.contains_resource::<ActivityStats>());
//! ```
//!
//! # Architecture
//!
//! This crate is Layer 3: it only talks to the simulation through
//! [`Plugin`](vanguard_gamestate::Plugin) and the activity hooks.

mod diagnostics;
mod tracing_plugin;

pub use diagnostics::{ActivityStats, DIAGNOSTICS_HOOK, DiagnosticsPlugin};
pub use tracing_plugin::{TracingConfig, TracingFormat, TracingPlugin};
