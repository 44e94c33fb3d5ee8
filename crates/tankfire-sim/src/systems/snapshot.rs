//! Snapshot system: read-only view of the world for the host.

use hecs::World;

use tankfire_core::components::{Shell, Tank};
use tankfire_core::events::GameEvent;
use tankfire_core::state::{ShellView, SimSnapshot, TankView};
use tankfire_core::types::SimTime;

pub fn build_snapshot(
    world: &World,
    time: &SimTime,
    paused: bool,
    events: Vec<GameEvent>,
) -> SimSnapshot {
    SimSnapshot {
        time: *time,
        paused,
        tanks: build_tanks(world),
        shells: build_shells(world),
        events,
    }
}

pub fn tank_view(tank: &Tank) -> TankView {
    let autopilot = tank.autopilot();
    TankView {
        id: tank.id,
        control: tank.control_kind(),
        position: tank.position,
        hull_yaw: tank.hull_yaw,
        turret_yaw: tank.turret_yaw,
        barrel_pitch: tank.barrel_pitch,
        health: tank.health,
        destroyed: tank.destroyed,
        fire_state: tank.fire_state(),
        pattern: autopilot.map(|a| a.pattern.kind()),
        recovering: autopilot.map(|a| a.is_recovering()).unwrap_or(false),
        stats: tank.stats,
    }
}

fn build_tanks(world: &World) -> Vec<TankView> {
    let mut tanks: Vec<TankView> = world
        .query::<&Tank>()
        .iter()
        .map(|(_, tank)| tank_view(tank))
        .collect();
    tanks.sort_by_key(|t| t.id);
    tanks
}

/// Live shells only; resolved ones are already gone by snapshot time.
fn build_shells(world: &World) -> Vec<ShellView> {
    let mut shells: Vec<ShellView> = world
        .query::<&Shell>()
        .iter()
        .filter(|(_, shell)| shell.alive)
        .map(|(_, shell)| ShellView {
            id: shell.id,
            owner: shell.owner,
            position: shell.position,
            velocity: shell.velocity,
        })
        .collect();
    shells.sort_by_key(|s| s.id);
    shells
}
