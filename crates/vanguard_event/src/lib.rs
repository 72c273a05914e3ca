//! Predictive event scheduling for Vanguard (Layer 1).
//!
//! `vanguard_event` provides the global discrete-event scheduler that drives
//! the simulation. Instead of polling every actor each frame, each event
//! carries a *predicted* invocation time computed by its handler. When
//! something an event depends on changes, the prediction is recomputed.
//!
//! # Core Concepts
//!
//! - [`EventLoop`] - Ordered store of pending events, invoked by time
//! - [`EventHandler`] - Prediction and invocation logic for one event family
//! - [`TriggerType`] - How an event reacts to changes of its dependencies
//! - [`ReachReport`] - Outcome of advancing the loop to a time
//!
//! # Ordering
//!
//! Events run in non-decreasing predicted time. Events predicted at the same
//! time run in creation order, and a re-predicted event keeps its original
//! place among equals, so two runs with identical inputs invoke identical
//! sequences.
//!
//! # Failure isolation
//!
//! A failing handler is reported through [`ReachReport::failures`] and a
//! `warn!` log line. The loop keeps draining the remaining events.

pub mod error;
pub mod event;
pub mod event_loop;
pub mod handler;

pub use error::EventError;
pub use event::{EventFailure, EventId, ReachReport};
pub use event_loop::EventLoop;
pub use handler::{BoxError, EventEntity, EventHandler, TargetId, TriggerType};
