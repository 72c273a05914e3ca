//! Event handlers registered on the simulation's event loop.
//!
//! | id | trigger | handler |
//! |----|---------|---------|
//! | `game.activity` | dependency | [`ActivityHandler`] |
//! | `game.spawn_entity` | once | [`SpawnEntityHandler`] |

mod activity;
mod spawn_entity;

pub use activity::{ACTIVITY_HANDLER_ID, ActivityHandler};
pub use spawn_entity::{
    SPAWN_ENTITY_HANDLER_ID, SPAWNER_TARGET, SpawnEntityHandler, SpawnRequest, SpawnResponse,
    Spawner,
};
