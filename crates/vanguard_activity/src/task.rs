//! Task actions and branch conditions.
//!
//! Both are type-erased closures over the actor type `A`, shared through an
//! [`Arc`] so a graph can be cloned into many actors cheaply.
//!
//! - [`Task<A>`] - Action run when a task node is visited, `Fn(time, &mut A)`
//! - [`Condition<A>`] - Predicate selecting a branch, `Fn(time, &A)`

use core::fmt;
use std::sync::Arc;

use vanguard_curve::SimTime;

use crate::error::BoxError;

/// Errors returned by task actions.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    /// The task was visited without an action being set.
    #[error("task action is not set")]
    Unset,

    /// The action failed.
    #[error("{0}")]
    Failed(#[source] BoxError),
}

impl TaskError {
    /// Creates a [`Failed`](Self::Failed) error.
    pub fn failed(error: impl Into<BoxError>) -> Self {
        Self::Failed(error.into())
    }
}

type TaskFn<A> = dyn Fn(SimTime, &mut A) -> Result<(), TaskError> + Send + Sync;

/// Action executed when a task node is visited.
///
/// The default task is a placeholder that fails with [`TaskError::Unset`],
/// so a forgotten action surfaces on the first visit.
pub struct Task<A> {
    action: Option<Arc<TaskFn<A>>>,
}

impl<A> Task<A> {
    /// Creates a task from a fallible action.
    pub fn new<F>(action: F) -> Self
    where
        F: Fn(SimTime, &mut A) -> Result<(), TaskError> + Send + Sync + 'static,
    {
        Self {
            action: Some(Arc::new(action)),
        }
    }

    /// Creates a task from an action that cannot fail.
    pub fn infallible<F>(action: F) -> Self
    where
        F: Fn(SimTime, &mut A) + Send + Sync + 'static,
    {
        Self::new(move |time, actor| {
            action(time, actor);
            Ok(())
        })
    }

    /// Returns the placeholder task.
    #[must_use]
    pub fn unset() -> Self {
        Self { action: None }
    }

    /// Returns `true` for the placeholder task.
    #[must_use]
    pub fn is_unset(&self) -> bool {
        self.action.is_none()
    }

    /// Runs the action.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Unset`] for the placeholder task, or whatever the
    /// action returns.
    pub fn run(&self, time: SimTime, actor: &mut A) -> Result<(), TaskError> {
        match &self.action {
            Some(action) => action(time, actor),
            None => Err(TaskError::Unset),
        }
    }
}

impl<A> Clone for Task<A> {
    fn clone(&self) -> Self {
        Self {
            action: self.action.clone(),
        }
    }
}

impl<A> Default for Task<A> {
    fn default() -> Self {
        Self::unset()
    }
}

impl<A> fmt::Debug for Task<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unset() {
            f.write_str("Task(unset)")
        } else {
            f.write_str("Task(..)")
        }
    }
}

type ConditionFn<A> = dyn Fn(SimTime, &A) -> bool + Send + Sync;

/// Side-effect free predicate over an actor.
pub struct Condition<A> {
    predicate: Arc<ConditionFn<A>>,
}

impl<A> Condition<A> {
    /// Creates a condition from a predicate.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(SimTime, &A) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
        }
    }

    /// Evaluates the predicate.
    #[must_use]
    pub fn evaluate(&self, time: SimTime, actor: &A) -> bool {
        (self.predicate)(time, actor)
    }
}

impl<A> Clone for Condition<A> {
    fn clone(&self) -> Self {
        Self {
            predicate: Arc::clone(&self.predicate),
        }
    }
}

impl<A> fmt::Debug for Condition<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Condition(..)")
    }
}
