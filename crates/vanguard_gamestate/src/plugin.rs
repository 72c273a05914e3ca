//! Plugin lifecycle for simulations.
//!
//! Plugins hook infrastructure such as tracing or diagnostics into a
//! [`Simulation`] without the simulation knowing about them.
//!
//! # Lifecycle
//!
//! 1. **Build** - `build()` is called in insertion order by
//!    [`Simulation::finish`]
//! 2. **Ready** - `ready()` is called in insertion order once every plugin
//!    is built
//! 3. **Cleanup** - `cleanup()` is called in reverse order by
//!    [`Simulation::cleanup`]
//!
//! Plugins added after `finish()` are built and readied immediately.
//!
//! # Example
//!
//! ```
//! use vanguard_gamestate::plugin::Plugin;
//! use vanguard_gamestate::{Simulation, SimulationConfig, TemplateFactory};
//!
//! struct StepBudget(usize);
//!
//! impl Plugin for StepBudget {
//!     fn build(&self, simulation: &mut Simulation) {
//!         simulation.insert_resource(self.0);
//!     }
//! }
//!
//! let mut simulation =
//!     Simulation::new(SimulationConfig::default(), TemplateFactory::default()).unwrap();
//! simulation.add_plugins(StepBudget(64)).unwrap();
//! simulation.finish().unwrap();
//!
//! assert_eq!(simulation.get_resource::<usize>(), Some(&64));
//! ```

use core::any::TypeId;

use crate::simulation::Simulation;

// ─────────────────────────────────────────────────────────────────────────────
// PluginId
// ─────────────────────────────────────────────────────────────────────────────

/// Unique identifier for a plugin type, used for duplicate detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PluginId {
    type_id: TypeId,
    type_name: &'static str,
}

impl PluginId {
    /// Creates a `PluginId` for the given plugin type.
    #[must_use]
    pub fn of<P: Plugin>() -> Self {
        Self {
            type_id: TypeId::of::<P>(),
            type_name: core::any::type_name::<P>(),
        }
    }

    /// Returns the underlying `TypeId`.
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the type name for debugging.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Plugin Trait
// ─────────────────────────────────────────────────────────────────────────────

/// A unit of simulation infrastructure.
pub trait Plugin: Send + Sync + 'static {
    /// Configures the simulation. Called once per plugin.
    ///
    /// Keep `build()` lightweight; installing global state (such as a
    /// `tracing` subscriber) belongs in `ready()`.
    fn build(&self, simulation: &mut Simulation);

    /// Called after all plugins have been built.
    fn ready(&self, _simulation: &mut Simulation) {}

    /// Called when the simulation shuts down, in reverse insertion order.
    fn cleanup(&self, _simulation: &mut Simulation) {}

    /// Returns the plugin's name for debugging and error messages.
    ///
    /// Default implementation returns the type name.
    fn name(&self) -> &str {
        core::any::type_name::<Self>()
    }

    /// Returns true if this plugin can only be added once.
    ///
    /// Default is `true`; adding the same plugin type twice is rejected.
    fn is_unique(&self) -> bool {
        true
    }
}

/// A plugin registered with a simulation.
pub(crate) struct PluginEntry {
    pub(crate) id: PluginId,
    pub(crate) plugin: Box<dyn Plugin>,
}

impl core::fmt::Debug for PluginEntry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PluginEntry")
            .field("id", &self.id.type_name())
            .field("name", &self.plugin.name())
            .finish()
    }
}
