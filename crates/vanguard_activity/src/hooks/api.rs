//! Hook registration API for activity execution.
//!
//! [`ActivityHooks`] is a registry of observers invoked by the
//! [`ActivityExecutor`](crate::ActivityExecutor) as it walks a graph.
//! Observers are registered per [`ActivityEventKind`] and run in registration
//! order.
//!
//! # Example
//!
//! ```
//! use vanguard_activity::hooks::{ActivityEvent, ActivityEventKind, ActivityHooks};
//!
//! let hooks = ActivityHooks::new();
//! hooks
//!     .register_observer([ActivityEventKind::Finished], "logger", |event: &ActivityEvent| {
//!         tracing::info!(actor = event.actor(), "activity finished");
//!     })
//!     .unwrap();
//!
//! assert_eq!(hooks.hook_count(ActivityEventKind::Finished), 1);
//! ```

use std::sync::Arc;

use hashbrown::HashMap;
use parking_lot::RwLock;

use super::events::{ActivityEvent, ActivityEventKind};

type HookFn = dyn Fn(&ActivityEvent) + Send + Sync;

// ─────────────────────────────────────────────────────────────────────────────
// HookRegistrationError
// ─────────────────────────────────────────────────────────────────────────────

/// Errors that can occur during hook registration.
#[derive(Debug, Clone, thiserror::Error)]
pub enum HookRegistrationError {
    /// A hook with this name already exists for the event kind.
    #[error("hook '{name}' already registered for {kind:?}")]
    DuplicateName {
        /// The event kind where the duplicate was found.
        kind: ActivityEventKind,
        /// The duplicate hook name.
        name: String,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// HookEntry
// ─────────────────────────────────────────────────────────────────────────────

/// Entry in the hook registry.
struct HookEntry {
    /// Human-readable name for debugging and logging.
    name: String,
    hook: Arc<HookFn>,
}

// ─────────────────────────────────────────────────────────────────────────────
// ActivityHooks
// ─────────────────────────────────────────────────────────────────────────────

/// Registry of activity observers.
///
/// Uses interior mutability so plugins can register through a shared
/// reference while the executor holds the registry behind an [`Arc`].
#[derive(Default)]
pub struct ActivityHooks {
    hooks: RwLock<HashMap<ActivityEventKind, Vec<HookEntry>>>,
}

impl ActivityHooks {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an observer for each kind in `kinds`.
    ///
    /// # Errors
    ///
    /// Returns [`HookRegistrationError::DuplicateName`] if `name` is already
    /// taken for one of the kinds. Kinds before the duplicate stay
    /// registered.
    pub fn register_observer<K, F>(
        &self,
        kinds: K,
        name: impl Into<String>,
        hook: F,
    ) -> Result<&Self, HookRegistrationError>
    where
        K: IntoIterator<Item = ActivityEventKind>,
        F: Fn(&ActivityEvent) + Send + Sync + 'static,
    {
        let name = name.into();
        let hook: Arc<HookFn> = Arc::new(hook);

        let mut hooks = self.hooks.write();
        for kind in kinds {
            let entries = hooks.entry(kind).or_default();
            if entries.iter().any(|entry| entry.name == name) {
                return Err(HookRegistrationError::DuplicateName { kind, name });
            }
            entries.push(HookEntry {
                name: name.clone(),
                hook: Arc::clone(&hook),
            });
        }
        Ok(self)
    }

    /// Registers an observer for every event kind.
    ///
    /// # Errors
    ///
    /// See [`register_observer`](Self::register_observer).
    pub fn register_all<F>(
        &self,
        name: impl Into<String>,
        hook: F,
    ) -> Result<&Self, HookRegistrationError>
    where
        F: Fn(&ActivityEvent) + Send + Sync + 'static,
    {
        self.register_observer(ActivityEventKind::ALL, name, hook)
    }

    /// Invokes every observer registered for the event's kind.
    pub fn invoke(&self, event: &ActivityEvent) {
        let hooks = self.hooks.read();
        if let Some(entries) = hooks.get(&event.kind()) {
            for entry in entries {
                (entry.hook)(event);
            }
        }
    }

    /// Returns the number of observers registered for `kind`.
    #[must_use]
    pub fn hook_count(&self, kind: ActivityEventKind) -> usize {
        self.hooks.read().get(&kind).map_or(0, Vec::len)
    }

    /// Checks if a hook with the given name exists for `kind`.
    #[must_use]
    pub fn contains_hook(&self, kind: ActivityEventKind, name: &str) -> bool {
        self.hooks
            .read()
            .get(&kind)
            .is_some_and(|entries| entries.iter().any(|entry| entry.name == name))
    }

    /// Returns `true` if no observer is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hooks.read().values().all(Vec::is_empty)
    }
}

impl core::fmt::Debug for ActivityHooks {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let hooks = self.hooks.read();
        let mut names: Vec<(ActivityEventKind, &str)> = hooks
            .iter()
            .flat_map(|(kind, entries)| entries.iter().map(|entry| (*kind, entry.name.as_str())))
            .collect();
        names.sort_by_key(|(kind, name)| (format!("{kind:?}"), *name));
        f.debug_struct("ActivityHooks").field("hooks", &names).finish()
    }
}
