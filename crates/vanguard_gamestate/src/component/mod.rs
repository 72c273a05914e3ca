//! Entity components.
//!
//! Components form a closed set keyed by [`ComponentKind`]. Each concrete
//! component type implements [`ComponentType`], which lets
//! [`GameEntity::get`](crate::GameEntity::get) hand out typed references
//! without downcasting.
//!
//! | kind | type | role |
//! |------|------|------|
//! | `Position` | [`Position`] | position and heading curves |
//! | `Ownership` | [`Ownership`] | owning player |
//! | `CommandQueue` | [`CommandQueue`] | time-ordered commands |
//! | `Activity` | [`Activity`] | behavior graph and its pointer |
//! | `Move` | [`MoveAbility`] | movement speed |
//! | `Turn` | [`TurnAbility`] | turn capability |

mod ability;
mod activity;
mod command_queue;
mod ownership;
mod position;

pub use ability::{MoveAbility, TurnAbility};
pub use activity::Activity;
pub use command_queue::CommandQueue;
pub use ownership::{Ownership, PlayerId};
pub use position::Position;

use core::fmt;

// ─────────────────────────────────────────────────────────────────────────────
// ComponentKind
// ─────────────────────────────────────────────────────────────────────────────

/// Tag identifying a component slot on an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ComponentKind {
    /// [`Position`].
    Position,
    /// [`Ownership`].
    Ownership,
    /// [`CommandQueue`].
    CommandQueue,
    /// [`Activity`].
    Activity,
    /// [`MoveAbility`].
    Move,
    /// [`TurnAbility`].
    Turn,
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ComponentKind::Position => "position",
            ComponentKind::Ownership => "ownership",
            ComponentKind::CommandQueue => "command queue",
            ComponentKind::Activity => "activity",
            ComponentKind::Move => "move",
            ComponentKind::Turn => "turn",
        };
        f.write_str(name)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Component
// ─────────────────────────────────────────────────────────────────────────────

/// A component value stored on an entity.
#[derive(Debug, Clone)]
pub enum Component {
    /// Position and heading.
    Position(Position),
    /// Owning player.
    Ownership(Ownership),
    /// Queued commands.
    CommandQueue(CommandQueue),
    /// Behavior graph state.
    Activity(Activity),
    /// Movement capability.
    Move(MoveAbility),
    /// Turn capability.
    Turn(TurnAbility),
}

impl Component {
    /// Returns the slot this component occupies.
    #[must_use]
    pub fn kind(&self) -> ComponentKind {
        match self {
            Component::Position(_) => ComponentKind::Position,
            Component::Ownership(_) => ComponentKind::Ownership,
            Component::CommandQueue(_) => ComponentKind::CommandQueue,
            Component::Activity(_) => ComponentKind::Activity,
            Component::Move(_) => ComponentKind::Move,
            Component::Turn(_) => ComponentKind::Turn,
        }
    }
}

/// A concrete component type with a fixed [`ComponentKind`].
pub trait ComponentType: Sized {
    /// The slot this type occupies.
    const KIND: ComponentKind;

    /// Borrows `Self` out of a stored component.
    fn from_component(component: &Component) -> Option<&Self>;

    /// Mutably borrows `Self` out of a stored component.
    fn from_component_mut(component: &mut Component) -> Option<&mut Self>;

    /// Wraps `self` for storage.
    fn into_component(self) -> Component;
}

macro_rules! component_type {
    ($ty:ty, $variant:ident) => {
        impl ComponentType for $ty {
            const KIND: ComponentKind = ComponentKind::$variant;

            fn from_component(component: &Component) -> Option<&Self> {
                match component {
                    Component::$variant(inner) => Some(inner),
                    _ => None,
                }
            }

            fn from_component_mut(component: &mut Component) -> Option<&mut Self> {
                match component {
                    Component::$variant(inner) => Some(inner),
                    _ => None,
                }
            }

            fn into_component(self) -> Component {
                Component::$variant(self)
            }
        }

        impl From<$ty> for Component {
            fn from(value: $ty) -> Self {
                Component::$variant(value)
            }
        }
    };
}

component_type!(Position, Position);
component_type!(Ownership, Ownership);
component_type!(CommandQueue, CommandQueue);
component_type!(Activity, Activity);
component_type!(MoveAbility, Move);
component_type!(TurnAbility, Turn);
