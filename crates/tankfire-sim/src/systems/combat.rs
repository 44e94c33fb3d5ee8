//! Combat bookkeeping for the tick's destroy events: kill credit and
//! automatic respawn scheduling for autopilot tanks.

use std::collections::HashMap;

use hecs::{Entity, World};
use tracing::debug;

use tankfire_core::components::Tank;
use tankfire_core::events::GameEvent;
use tankfire_core::types::TankId;

use crate::scheduler::{ScheduledAction, Scheduler};

pub fn run(
    world: &mut World,
    index: &HashMap<TankId, Entity>,
    events: &[GameEvent],
    scheduler: &mut Scheduler,
    tick: u64,
    respawn_delay: u64,
) {
    for event in events {
        if let GameEvent::TankDestroyed { victim, source } = event {
            settle_kill(world, index, *victim, *source, scheduler, tick, respawn_delay);
        }
    }
}

/// Credit the killer and, for AI/remote victims, book the respawn.
pub fn settle_kill(
    world: &mut World,
    index: &HashMap<TankId, Entity>,
    victim: TankId,
    source: Option<TankId>,
    scheduler: &mut Scheduler,
    tick: u64,
    respawn_delay: u64,
) {
    if let Some(killer) = source.filter(|s| *s != victim) {
        if let Some(&entity) = index.get(&killer) {
            if let Ok(mut tank) = world.get::<&mut Tank>(entity) {
                tank.stats.kills += 1;
                debug!(tank = %killer, kills = tank.stats.kills, "kill credited");
            }
        }
    }

    let Some(&entity) = index.get(&victim) else {
        return;
    };
    let auto_respawn = world
        .get::<&Tank>(entity)
        .map(|tank| tank.autopilot().is_some())
        .unwrap_or(false);
    let action = ScheduledAction::Respawn(victim);
    if auto_respawn && !scheduler.is_pending(action) {
        scheduler.schedule(tick + respawn_delay, action);
        debug!(tank = %victim, due = tick + respawn_delay, "respawn scheduled");
    }
}
