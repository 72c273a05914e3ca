//! Simulation configuration.

use serde::{Deserialize, Serialize};
use vanguard_activity::ActivityExecutor;

use crate::error::GameStateError;

/// Tunables of a [`Simulation`](crate::Simulation).
///
/// Every field has a default, so partial JSON documents are accepted:
///
/// ```
/// use vanguard_gamestate::SimulationConfig;
///
/// let config = SimulationConfig::from_json_str(r#"{ "max_activity_steps": 64 }"#).unwrap();
/// assert_eq!(config.max_activity_steps, 64);
/// assert!(config.deactivate_on_error);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Bound on node executions per activity advance.
    pub max_activity_steps: usize,
    /// Deactivate an actor's activity when it fails instead of reporting
    /// the failure to the event loop.
    pub deactivate_on_error: bool,
    /// Log every node transition at `debug` level.
    pub log_transitions: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_activity_steps: ActivityExecutor::DEFAULT_MAX_STEPS,
            deactivate_on_error: true,
            log_transitions: false,
        }
    }
}

impl SimulationConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`GameStateError::Config`] for malformed input, unknown
    /// fields or a zero step bound.
    pub fn from_json_str(json: &str) -> Result<Self, GameStateError> {
        let config: Self =
            serde_json::from_str(json).map_err(|err| GameStateError::Config(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`GameStateError::Config`] if `max_activity_steps` is zero.
    pub fn validate(&self) -> Result<(), GameStateError> {
        if self.max_activity_steps == 0 {
            return Err(GameStateError::Config(
                "max_activity_steps must be at least 1".to_owned(),
            ));
        }
        Ok(())
    }

    /// Sets the step bound.
    #[must_use]
    pub fn with_max_activity_steps(mut self, steps: usize) -> Self {
        self.max_activity_steps = steps;
        self
    }

    /// Sets whether failing activities are deactivated.
    #[must_use]
    pub fn with_deactivate_on_error(mut self, enabled: bool) -> Self {
        self.deactivate_on_error = enabled;
        self
    }

    /// Sets whether transitions are logged.
    #[must_use]
    pub fn with_log_transitions(mut self, enabled: bool) -> Self {
        self.log_transitions = enabled;
        self
    }
}
