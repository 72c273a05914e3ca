use vanguard_curve::{Queue, SimTime};

use crate::command::Command;

/// Commands queued on an entity, ordered by timestamp then insertion order.
///
/// Producers add commands; the entity's tasks pop them. The queue never goes
/// backward: a command added before the last popped timestamp is keyed at
/// that timestamp instead.
#[derive(Debug, Clone, Default)]
pub struct CommandQueue {
    queue: Queue<Command>,
    revision: u64,
    last_added: Option<SimTime>,
}

impl CommandQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `command` at `time` and returns the timestamp it was keyed at.
    pub fn add_command(&mut self, time: SimTime, command: Command) -> SimTime {
        let keyed = self.queue.insert(time, command);
        self.revision += 1;
        self.last_added = Some(keyed);
        keyed
    }

    /// Number of commands added so far. Popping does not change it.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Timestamp the most recently added command was keyed at.
    #[must_use]
    pub fn last_added_time(&self) -> Option<SimTime> {
        self.last_added
    }

    /// Removes and returns the earliest command due at `time`.
    pub fn pop_command(&mut self, time: SimTime) -> Option<Command> {
        self.queue.pop_front(time)
    }

    /// Returns the earliest command due at `time` without removing it.
    #[must_use]
    pub fn front(&self, time: SimTime) -> Option<&Command> {
        self.queue.front(time)
    }

    /// Returns `true` if a command is due at `time`.
    #[must_use]
    pub fn has_command(&self, time: SimTime) -> bool {
        self.queue.front(time).is_some()
    }

    /// Timestamp of the earliest pending command.
    #[must_use]
    pub fn next_command_time(&self) -> Option<SimTime> {
        self.queue.next_time()
    }

    /// Read-only view of the underlying queue.
    #[must_use]
    pub fn get_queue(&self) -> &Queue<Command> {
        &self.queue
    }

    /// Number of pending commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns `true` if no command is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Pending commands with their timestamps, in pop order.
    #[must_use]
    pub fn entries(&self) -> Vec<(SimTime, Command)> {
        self.queue
            .iter()
            .map(|(time, command)| (time, *command))
            .collect()
    }

    /// Replaces the pending commands.
    pub(crate) fn replace(&mut self, entries: impl IntoIterator<Item = (SimTime, Command)>) {
        self.queue.clear();
        for (time, command) in entries {
            self.queue.insert(time, command);
        }
    }
}
