use vanguard_curve::{Discrete, SimTime};

/// Identity of a player.
pub type PlayerId = u64;

/// Owning player of an entity over time.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Ownership {
    owner: Discrete<PlayerId>,
}

impl Ownership {
    /// Creates a component owned by `owner` from the beginning of time.
    #[must_use]
    pub fn new(owner: PlayerId) -> Self {
        Self {
            owner: Discrete::new(owner),
        }
    }

    /// Owner at `time`.
    #[must_use]
    pub fn get_owner(&self, time: SimTime) -> PlayerId {
        *self.owner.get(time)
    }

    /// Transfers ownership at `time`.
    pub fn set_owner(&mut self, time: SimTime, owner: PlayerId) {
        self.owner.set_last(time, owner);
    }
}
