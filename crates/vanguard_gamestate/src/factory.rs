//! Entity construction.
//!
//! The core never decides what an entity is made of. It asks an
//! [`EntityFactory`] to build one from an opaque template id and only
//! positions the result and initializes its activity.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;
use vanguard_curve::Coord;

use crate::behavior::BehaviorRegistry;
use crate::component::{
    Activity, CommandQueue, MoveAbility, Ownership, Position, TurnAbility,
};
use crate::entity::{EntityId, GameEntity};
use crate::error::GameStateError;

/// Builds entities from template ids.
pub trait EntityFactory: Send + Sync + 'static {
    /// Creates the entity `id` from `template`.
    ///
    /// The returned entity must carry position, ownership and activity
    /// components for spawning to succeed.
    ///
    /// # Errors
    ///
    /// Returns [`GameStateError::UnknownTemplate`] for templates the factory
    /// does not know, or [`GameStateError::UnknownBehavior`] if the template
    /// names an unregistered behavior.
    fn create_entity(&self, id: EntityId, template: &str) -> Result<GameEntity, GameStateError>;
}

/// Capabilities and behavior of an entity template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityTemplate {
    /// Behavior id looked up in the [`BehaviorRegistry`].
    pub behavior: String,
    /// Movement speed, if the entity can move.
    #[serde(default)]
    pub move_speed: Option<Coord>,
    /// Turn speed, if the entity can turn.
    #[serde(default)]
    pub turn_speed: Option<Coord>,
}

impl EntityTemplate {
    /// Creates a template for an immobile entity running `behavior`.
    #[must_use]
    pub fn new(behavior: impl Into<String>) -> Self {
        Self {
            behavior: behavior.into(),
            move_speed: None,
            turn_speed: None,
        }
    }

    /// Adds a move ability.
    #[must_use]
    pub fn with_move_speed(mut self, speed: Coord) -> Self {
        self.move_speed = Some(speed);
        self
    }

    /// Adds a turn ability.
    #[must_use]
    pub fn with_turn_speed(mut self, turn_speed: Coord) -> Self {
        self.turn_speed = Some(turn_speed);
        self
    }
}

/// [`EntityFactory`] backed by a table of [`EntityTemplate`]s.
#[derive(Debug, Clone, Default)]
pub struct TemplateFactory {
    templates: IndexMap<String, EntityTemplate>,
    behaviors: BehaviorRegistry,
}

impl TemplateFactory {
    /// Creates a factory with no templates, drawing graphs from `behaviors`.
    #[must_use]
    pub fn new(behaviors: BehaviorRegistry) -> Self {
        Self {
            templates: IndexMap::new(),
            behaviors,
        }
    }

    /// Adds or replaces a template.
    #[must_use]
    pub fn with_template(mut self, id: impl Into<String>, template: EntityTemplate) -> Self {
        self.add_template(id, template);
        self
    }

    /// Adds or replaces a template.
    pub fn add_template(&mut self, id: impl Into<String>, template: EntityTemplate) {
        self.templates.insert(id.into(), template);
    }

    /// Looks up a template.
    #[must_use]
    pub fn template(&self, id: &str) -> Option<&EntityTemplate> {
        self.templates.get(id)
    }

    /// The behavior registry.
    #[must_use]
    pub fn behaviors(&self) -> &BehaviorRegistry {
        &self.behaviors
    }

    /// Mutable access to the behavior registry.
    pub fn behaviors_mut(&mut self) -> &mut BehaviorRegistry {
        &mut self.behaviors
    }
}

impl EntityFactory for TemplateFactory {
    fn create_entity(&self, id: EntityId, template: &str) -> Result<GameEntity, GameStateError> {
        let entry = self
            .templates
            .get(template)
            .ok_or_else(|| GameStateError::UnknownTemplate(template.to_owned()))?;
        let graph = self.behaviors.get(&entry.behavior)?;

        let mut entity = GameEntity::new(id, template)
            .with_component(Position::default())
            .with_component(Ownership::default())
            .with_component(CommandQueue::new())
            .with_component(Activity::new(graph));
        if let Some(speed) = entry.move_speed {
            entity.add_component(MoveAbility { speed });
        }
        if let Some(turn_speed) = entry.turn_speed {
            entity.add_component(TurnAbility { turn_speed });
        }

        debug!(entity = %id, template, behavior = %entry.behavior, "entity created");
        Ok(entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::STANDARD_UNIT_BEHAVIOR;
    use crate::component::ComponentKind;

    fn factory() -> TemplateFactory {
        TemplateFactory::new(BehaviorRegistry::with_standard_behaviors().unwrap())
            .with_template(
                "scout",
                EntityTemplate::new(STANDARD_UNIT_BEHAVIOR).with_move_speed(Coord::from_int(2)),
            )
            .with_template("tower", EntityTemplate::new(STANDARD_UNIT_BEHAVIOR))
    }

    #[test]
    fn template_decides_abilities() {
        let factory = factory();
        let scout = factory.create_entity(EntityId(1), "scout").unwrap();
        let tower = factory.create_entity(EntityId(2), "tower").unwrap();

        assert!(scout.has_component(ComponentKind::Move));
        assert!(!tower.has_component(ComponentKind::Move));
        assert!(tower.has_component(ComponentKind::Activity));
        assert_eq!(scout.template(), "scout");
    }

    #[test]
    fn unknown_template_is_rejected() {
        assert!(matches!(
            factory().create_entity(EntityId(1), "dragon"),
            Err(GameStateError::UnknownTemplate(name)) if name == "dragon"
        ));
    }

    #[test]
    fn unknown_behavior_is_reported() {
        let factory = TemplateFactory::default().with_template("ghost", EntityTemplate::new("haunt"));
        assert!(matches!(
            factory.create_entity(EntityId(1), "ghost"),
            Err(GameStateError::UnknownBehavior(_))
        ));
    }

    #[test]
    fn template_parses_from_json() {
        let template: EntityTemplate =
            serde_json::from_str(r#"{ "behavior": "unit.standard", "move_speed": 131072 }"#)
                .unwrap();
        assert_eq!(template.move_speed, Some(Coord::from_int(2)));
        assert_eq!(template.turn_speed, None);
    }
}
