//! Shared test utilities for `vanguard_activity` integration tests.
//!
//! Provides a minimal actor with a command queue and a wake timer, plus an
//! observer that records every [`ActivityEvent`].

#![allow(
    dead_code,
    missing_docs,
    reason = "shared test utilities, not all items used in every test binary"
)]

use std::sync::Arc;

use parking_lot::Mutex;
use vanguard_activity::{
    ActivityActor, ActivityEvent, ActivityExecutor, ActivityHooks, NodeId, WaitCondition,
};
use vanguard_curve::{Queue, SimTime};

pub fn t(value: i64) -> SimTime {
    SimTime::from_int(value)
}

// ═══════════════════════════════════════════════════════════════════════════════
// TEST ACTOR
// ═══════════════════════════════════════════════════════════════════════════════

/// Actor with a command queue of labels and an optional wake timer.
#[derive(Debug, Default)]
pub struct TestActor {
    pub id: u64,
    pub node: Option<NodeId>,
    pub commands: Queue<&'static str>,
    pub timer: Option<SimTime>,
    /// Labels appended by task actions.
    pub log: Vec<String>,
    pub position: i64,
}

impl TestActor {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }
}

impl ActivityActor for TestActor {
    fn actor_id(&self) -> u64 {
        self.id
    }

    fn current_node(&self) -> Option<NodeId> {
        self.node
    }

    fn set_current_node(&mut self, node: NodeId) {
        self.node = Some(node);
    }

    fn wait_ready(&self, condition: WaitCondition, time: SimTime) -> bool {
        match condition {
            WaitCondition::Command => self.commands.front(time).is_some(),
            WaitCondition::Timer => self.timer.is_some_and(|timer| timer <= time),
        }
    }

    fn wait_prediction(&self, condition: WaitCondition, not_before: SimTime) -> Option<SimTime> {
        let at = match condition {
            WaitCondition::Command => self.commands.next_time(),
            WaitCondition::Timer => self.timer,
        };
        at.map(|at| at.max(not_before))
    }

    fn on_wait_satisfied(&mut self, condition: WaitCondition, _time: SimTime) {
        if condition == WaitCondition::Timer {
            self.timer = None;
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// EVENT RECORDING
// ═══════════════════════════════════════════════════════════════════════════════

/// Collects every activity event seen by its hooks.
#[derive(Clone, Default)]
pub struct Recorder {
    events: Arc<Mutex<Vec<ActivityEvent>>>,
}

impl Recorder {
    pub fn events(&self) -> Vec<ActivityEvent> {
        self.events.lock().clone()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

/// Creates an executor whose hooks feed a [`Recorder`].
pub fn recording_executor() -> (ActivityExecutor, Recorder) {
    let recorder = Recorder::default();
    let hooks = Arc::new(ActivityHooks::new());
    let sink = recorder.clone();
    hooks
        .register_all("recorder", move |event| sink.events.lock().push(event.clone()))
        .expect("fresh registry");
    (ActivityExecutor::new().with_hooks(hooks), recorder)
}
