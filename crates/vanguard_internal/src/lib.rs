//! # Vanguard Internal Library
//!
//! Re-exports the core Vanguard crates for convenience.

/// Layer 0: simulation time and curves.
pub use vanguard_curve;

/// Layer 0: predictive event loop.
pub use vanguard_event;

/// Layer 1: activity graphs and their executor.
pub use vanguard_activity;

/// Layer 2: entities, systems and simulation orchestration.
pub use vanguard_gamestate;

/// Layer 3: infrastructure plugins.
pub use vanguard_core_plugins;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use vanguard_activity::{
        ActivityActor, ActivityError, ActivityEvent, ActivityEventKind, ActivityExecutor,
        ActivityGraph, ActivityHooks, AdvanceOutcome, Condition, Node, NodeId, NodeType, Task,
        TaskError, WaitCondition,
    };
    pub use vanguard_core_plugins::{
        ActivityStats, DiagnosticsPlugin, TracingConfig, TracingFormat, TracingPlugin,
    };
    pub use vanguard_curve::prelude::*;
    pub use vanguard_event::{
        EventEntity, EventError, EventHandler, EventId, EventLoop, ReachReport, TargetId,
        TriggerType,
    };
    pub use vanguard_gamestate::prelude::*;
}
