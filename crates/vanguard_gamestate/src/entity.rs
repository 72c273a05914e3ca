//! Game entities.
//!
//! A [`GameEntity`] is an id plus a set of components. Capabilities are
//! looked up by [`ComponentKind`]; asking for a component the entity lacks
//! yields [`GameStateError::ComponentNotFound`].

use core::fmt;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use tracing::warn;
use vanguard_activity::{ActivityActor, NodeId, WaitCondition};
use vanguard_curve::SimTime;
use vanguard_event::TargetId;

use crate::component::{Activity, CommandQueue, Component, ComponentKind, ComponentType};
use crate::error::GameStateError;

/// Identity of a game entity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EntityId(pub u64);

impl EntityId {
    /// Returns the raw id value.
    #[must_use]
    pub fn raw(self) -> u64 {
        self.0
    }

    /// The event target for this entity's manager.
    #[must_use]
    pub fn target(self) -> TargetId {
        TargetId(self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity_{}", self.0)
    }
}

/// An actor in the simulation.
#[derive(Debug, Clone)]
pub struct GameEntity {
    id: EntityId,
    template: String,
    components: HashMap<ComponentKind, Component>,
}

impl GameEntity {
    /// Creates an entity without components.
    #[must_use]
    pub fn new(id: EntityId, template: impl Into<String>) -> Self {
        Self {
            id,
            template: template.into(),
            components: HashMap::new(),
        }
    }

    /// The entity's id.
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// The template the entity was built from.
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Adds or replaces a component, returning the previous one.
    pub fn add_component(&mut self, component: impl Into<Component>) -> Option<Component> {
        let component = component.into();
        self.components.insert(component.kind(), component)
    }

    /// Builder form of [`add_component`](Self::add_component).
    #[must_use]
    pub fn with_component(mut self, component: impl Into<Component>) -> Self {
        self.add_component(component);
        self
    }

    /// Returns `true` if the entity has a component of this kind.
    #[must_use]
    pub fn has_component(&self, kind: ComponentKind) -> bool {
        self.components.contains_key(&kind)
    }

    /// Looks up a component by kind.
    ///
    /// # Errors
    ///
    /// Returns [`GameStateError::ComponentNotFound`] if absent.
    pub fn get_component(&self, kind: ComponentKind) -> Result<&Component, GameStateError> {
        self.components
            .get(&kind)
            .ok_or(GameStateError::ComponentNotFound {
                entity: self.id,
                kind,
            })
    }

    /// Typed component access.
    ///
    /// # Errors
    ///
    /// Returns [`GameStateError::ComponentNotFound`] if absent.
    pub fn get<T: ComponentType>(&self) -> Result<&T, GameStateError> {
        self.components
            .get(&T::KIND)
            .and_then(T::from_component)
            .ok_or(GameStateError::ComponentNotFound {
                entity: self.id,
                kind: T::KIND,
            })
    }

    /// Typed mutable component access.
    ///
    /// # Errors
    ///
    /// Returns [`GameStateError::ComponentNotFound`] if absent.
    pub fn get_mut<T: ComponentType>(&mut self) -> Result<&mut T, GameStateError> {
        let id = self.id;
        self.components
            .get_mut(&T::KIND)
            .and_then(T::from_component_mut)
            .ok_or(GameStateError::ComponentNotFound {
                entity: id,
                kind: T::KIND,
            })
    }
}

impl ActivityActor for GameEntity {
    fn actor_id(&self) -> u64 {
        self.id.raw()
    }

    fn current_node(&self) -> Option<NodeId> {
        self.get::<Activity>().ok()?.current_node()
    }

    fn set_current_node(&mut self, node: NodeId) {
        match self.get_mut::<Activity>() {
            Ok(activity) => activity.set_current_node(Some(node)),
            Err(error) => warn!(entity = %self.id, %error, "cannot move activity pointer"),
        }
    }

    fn wait_ready(&self, condition: WaitCondition, time: SimTime) -> bool {
        match condition {
            WaitCondition::Command => self
                .get::<CommandQueue>()
                .is_ok_and(|queue| queue.has_command(time)),
            WaitCondition::Timer => self
                .get::<Activity>()
                .ok()
                .and_then(Activity::timer)
                .is_some_and(|timer| timer <= time),
        }
    }

    fn wait_prediction(&self, condition: WaitCondition, not_before: SimTime) -> Option<SimTime> {
        let at = match condition {
            WaitCondition::Command => self.get::<CommandQueue>().ok()?.next_command_time(),
            WaitCondition::Timer => self.get::<Activity>().ok()?.timer(),
        };
        at.map(|at| at.max(not_before))
    }

    fn on_wait_satisfied(&mut self, condition: WaitCondition, _time: SimTime) {
        if condition != WaitCondition::Timer {
            return;
        }
        if let Ok(activity) = self.get_mut::<Activity>() {
            activity.clear_timer();
        }
    }
}
