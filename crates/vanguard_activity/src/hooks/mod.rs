//! Lifecycle hooks for activity execution.
//!
//! Observers registered on [`ActivityHooks`] see every step the executor
//! takes: node transitions, task runs, branch selections, waits and
//! terminations. Typical uses are tracing, diagnostics and recording
//! transition sequences for replay checks.
//!
//! # Design Principles
//!
//! - Hooks execute in registration order
//! - Hooks observe only; they cannot alter the traversal
//!
//! # Architecture
//!
//! - **Events** ([`events`]): `ActivityEvent` enum carrying context to hooks
//! - **API** ([`api`]): Registration and invocation mechanism

pub mod api;
pub mod events;

pub use api::{ActivityHooks, HookRegistrationError};
pub use events::{ActivityEvent, ActivityEventKind};
