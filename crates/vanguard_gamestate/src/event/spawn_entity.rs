use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;
use vanguard_curve::SimTime;
use vanguard_event::{BoxError, EventEntity, EventHandler, EventLoop, TargetId, TriggerType};

use crate::component::{Ownership, PlayerId, Position};
use crate::coord::{Angle, Phys3, WORLD_ORIGIN};
use crate::entity::EntityId;
use crate::factory::EntityFactory;
use crate::state::GameState;
use crate::system::ActivitySystem;

/// Handler id of entity spawning.
pub const SPAWN_ENTITY_HANDLER_ID: &str = "game.spawn_entity";

/// Target of spawn events. Entity ids start above it.
pub const SPAWNER_TARGET: TargetId = TargetId(0);

/// Heading of freshly spawned entities, in degrees.
const SPAWN_HEADING: i64 = 315;

/// The event entity spawn events are scheduled against.
#[derive(Debug, Clone, Copy, Default)]
pub struct Spawner;

impl EventEntity for Spawner {
    fn target_id(&self) -> TargetId {
        SPAWNER_TARGET
    }

    fn idstr(&self) -> &str {
        "spawner"
    }
}

/// Parameters of a spawn event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnRequest {
    /// Caller-chosen id echoed in the [`SpawnResponse`].
    pub request_id: u64,
    /// Template handed to the [`EntityFactory`].
    pub template: String,
    /// Initial position.
    pub position: Phys3,
    /// Initial owner.
    pub owner: PlayerId,
}

impl SpawnRequest {
    /// Creates a request for `template` at the world origin, owned by
    /// player 0.
    #[must_use]
    pub fn new(request_id: u64, template: impl Into<String>) -> Self {
        Self {
            request_id,
            template: template.into(),
            position: WORLD_ORIGIN,
            owner: 0,
        }
    }

    /// Sets the initial position.
    #[must_use]
    pub fn with_position(mut self, position: Phys3) -> Self {
        self.position = position;
        self
    }

    /// Sets the initial owner.
    #[must_use]
    pub fn with_owner(mut self, owner: PlayerId) -> Self {
        self.owner = owner;
        self
    }
}

/// Outcome of a spawn event, recorded in the game state's outbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnResponse {
    /// The request's id.
    pub request_id: u64,
    /// The spawned entity.
    pub entity: EntityId,
    /// Spawn time.
    pub time: SimTime,
}

/// Builds an entity through the factory, places it and starts its activity.
#[derive(Clone)]
pub struct SpawnEntityHandler {
    factory: Arc<dyn EntityFactory>,
}

impl SpawnEntityHandler {
    /// Creates a handler building entities with `factory`.
    #[must_use]
    pub fn new(factory: Arc<dyn EntityFactory>) -> Self {
        Self { factory }
    }
}

impl core::fmt::Debug for SpawnEntityHandler {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SpawnEntityHandler").finish_non_exhaustive()
    }
}

impl EventHandler<GameState> for SpawnEntityHandler {
    type Params = SpawnRequest;

    fn id(&self) -> &'static str {
        SPAWN_ENTITY_HANDLER_ID
    }

    fn trigger(&self) -> TriggerType {
        TriggerType::Once
    }

    fn predict_invoke_time(
        &self,
        _target: TargetId,
        _state: &GameState,
        not_before: SimTime,
    ) -> SimTime {
        not_before
    }

    fn invoke(
        &self,
        event_loop: &mut EventLoop<GameState>,
        _target: TargetId,
        state: &mut GameState,
        time: SimTime,
        request: &SpawnRequest,
    ) -> Result<(), BoxError> {
        let id = state.allocate_entity_id();
        let mut entity = self.factory.create_entity(id, &request.template)?;

        let position = entity.get_mut::<Position>()?;
        position.set_position(time, request.position);
        position.set_angle(time, Angle::from_int(SPAWN_HEADING));
        entity
            .get_mut::<Ownership>()?
            .set_owner(time, request.owner);

        ActivitySystem::init(&mut entity, time, state.executor())?;
        state.add_game_entity(entity);
        info!(
            entity = %id,
            template = %request.template,
            request = request.request_id,
            time = %time,
            "entity spawned"
        );
        // the entity exists from here on, even if its first advance fails
        state.push_spawn_response(SpawnResponse {
            request_id: request.request_id,
            entity: id,
            time,
        });

        let manager = state.manager(id)?.clone();
        manager.run_activity_system(event_loop, state, time)?;
        Ok(())
    }
}
