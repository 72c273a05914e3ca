//! Activity diagnostics.
//!
//! [`DiagnosticsPlugin`] observes every [`ActivityEvent`] of a simulation,
//! logs it at `trace` level and counts it in the [`ActivityStats`]
//! resource.

use std::sync::Arc;

use hashbrown::HashMap;
use parking_lot::Mutex;
use tracing::{info, trace, warn};
use vanguard_activity::{ActivityEvent, ActivityEventKind};
use vanguard_gamestate::{Plugin, Simulation};

/// Observer name the plugin registers under.
pub const DIAGNOSTICS_HOOK: &str = "vanguard::diagnostics";

// ─────────────────────────────────────────────────────────────────────────────
// ActivityStats Resource
// ─────────────────────────────────────────────────────────────────────────────

/// Counters of observed activity events.
///
/// Cloning is cheap; clones share the same counters.
#[derive(Debug, Clone, Default)]
pub struct ActivityStats {
    inner: Arc<Mutex<StatsInner>>,
}

#[derive(Debug, Default)]
struct StatsInner {
    by_kind: HashMap<ActivityEventKind, u64>,
    by_actor: HashMap<u64, u64>,
}

impl ActivityStats {
    fn record(&self, event: &ActivityEvent) {
        let mut inner = self.inner.lock();
        *inner.by_kind.entry(event.kind()).or_default() += 1;
        *inner.by_actor.entry(event.actor()).or_default() += 1;
    }

    /// Number of events of `kind` seen so far.
    #[must_use]
    pub fn count(&self, kind: ActivityEventKind) -> u64 {
        self.inner.lock().by_kind.get(&kind).copied().unwrap_or(0)
    }

    /// Number of events seen for one actor.
    #[must_use]
    pub fn actor_count(&self, actor: u64) -> u64 {
        self.inner.lock().by_actor.get(&actor).copied().unwrap_or(0)
    }

    /// Total number of events seen.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.inner.lock().by_kind.values().sum()
    }

    /// Failed tasks plus divergent graphs.
    #[must_use]
    pub fn failures(&self) -> u64 {
        self.count(ActivityEventKind::TaskFailed) + self.count(ActivityEventKind::Diverged)
    }

    /// Resets every counter.
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.by_kind.clear();
        inner.by_actor.clear();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// DiagnosticsPlugin
// ─────────────────────────────────────────────────────────────────────────────

/// Logs and counts every activity transition.
///
/// # Resources Provided
///
/// | Resource | Description |
/// |----------|-------------|
/// | [`ActivityStats`] | Event counters, shared with the observer |
#[derive(Debug, Clone, Copy, Default)]
pub struct DiagnosticsPlugin;

impl Plugin for DiagnosticsPlugin {
    fn build(&self, simulation: &mut Simulation) {
        let stats = ActivityStats::default();
        let sink = stats.clone();
        let registered = simulation
            .hooks()
            .register_all(DIAGNOSTICS_HOOK, move |event: &ActivityEvent| {
                trace!(
                    kind = ?event.kind(),
                    actor = event.actor(),
                    node = %event.node(),
                    time = %event.time(),
                    "activity event"
                );
                sink.record(event);
            });
        if let Err(err) = registered {
            warn!(error = %err, "diagnostics observer not registered");
            return;
        }
        simulation.insert_resource(stats);
    }

    fn cleanup(&self, simulation: &mut Simulation) {
        if let Some(stats) = simulation.get_resource::<ActivityStats>() {
            info!(
                events = stats.total(),
                failures = stats.failures(),
                "activity diagnostics"
            );
        }
    }

    fn name(&self) -> &str {
        "vanguard::diagnostics"
    }
}
