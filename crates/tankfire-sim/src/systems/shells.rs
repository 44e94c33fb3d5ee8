//! Shell system: ballistic flight, then despawn of dead shells.

use hecs::{Entity, World};

use tankfire_core::components::Shell;
use tankfire_core::events::GameEvent;

use crate::collision::CollisionSystem;

/// Advance every shell one tick; despawn and deregister the ones that died,
/// including shells resolved by a collision earlier in the tick.
pub fn run(
    world: &mut World,
    collision: &mut CollisionSystem,
    events: &mut Vec<GameEvent>,
    despawn_buffer: &mut Vec<Entity>,
) {
    despawn_buffer.clear();
    for (entity, shell) in world.query_mut::<&mut Shell>() {
        if !shell.update(events) {
            despawn_buffer.push(entity);
        }
    }

    for entity in despawn_buffer.drain(..) {
        collision.remove_collider(entity);
        let _ = world.despawn(entity);
    }
}
