//! Tank system: update every tank against the tick's collidable list.

use hecs::{Entity, World};

use tankfire_core::commands::ControlInput;
use tankfire_core::components::{Shell, Tank};
use tankfire_core::events::GameEvent;
use tankfire_core::types::TankId;

use crate::collision::CollisionSystem;
use crate::tank::{self, TankContext};

/// Update tanks in id order, then spawn and register the shells they fired.
pub fn run(
    world: &mut World,
    collision: &mut CollisionSystem,
    ctx: &mut TankContext,
    events: &mut Vec<GameEvent>,
) {
    let collidables = collision.entries(world);

    let mut order: Vec<(TankId, Entity)> = world
        .query::<&Tank>()
        .iter()
        .map(|(entity, tank)| (tank.id, entity))
        .collect();
    order.sort_by_key(|(id, _)| *id);

    let mut fired: Vec<Shell> = Vec::new();
    for (_, entity) in order {
        let input = world
            .get::<&ControlInput>(entity)
            .map(|input| *input)
            .unwrap_or_default();
        let mut tank = match world.get::<&mut Tank>(entity) {
            Ok(tank) => tank,
            Err(_) => continue,
        };
        if let Some(shell) = tank::update(&mut tank, &input, &collidables, ctx) {
            fired.push(shell);
        }
    }

    for shell in fired {
        let Some(owner) = shell.owner else { continue };
        events.push(GameEvent::ShellFired {
            shell: shell.id,
            owner,
            origin: shell.position,
            direction: shell.velocity.normalize_or_zero(),
            speed: shell.velocity.length(),
        });
        let entity = world.spawn((shell,));
        collision.add_collider(entity);
    }
}
