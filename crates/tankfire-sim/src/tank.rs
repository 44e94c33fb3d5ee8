//! Per-tick tank behavior: driving, collision rollback, gun laying and firing.
//!
//! Player tanks move, then test the collidable list and roll back in the same
//! update. Autopilot tanks pick a target, then either chase it or run their
//! pattern, then test; a hit rolls them back and starts collision recovery.

use std::f64::consts::TAU;

use glam::DVec3;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use tankfire_ai::patterns::{self, PatternInput};
use tankfire_ai::profiles::{gunnery_profile, GunneryProfile};
use tankfire_ai::pursuit::{self, PursuitInput};
use tankfire_ai::targeting::{
    aim, normalize_angle, select_target, should_fire, AimParams, AimState, SelectionParams,
    TargetCandidate,
};
use tankfire_core::commands::ControlInput;
use tankfire_core::components::{ControlVariant, PlayerDrive, Shell, Tank};
use tankfire_core::config::Tuning;
use tankfire_core::constants::STOP_SPEED;
use tankfire_core::enums::ControlKind;
use tankfire_core::shapes::{penetration_depth, Collidable};
use tankfire_core::types::horizontal_distance;

use crate::collision::{line_of_sight, ColliderEntry};
use crate::ledger::FireLedger;

/// Height above a target's base that autopilots aim at.
const AIM_POINT_HEIGHT: f64 = 0.6;

/// Depth changes below this are float noise, not motion.
const BLOCK_EPSILON: f64 = 1e-9;

/// Shared mutable state for one tank-system pass.
pub struct TankContext<'a> {
    pub tuning: &'a Tuning,
    pub rng: &'a mut ChaCha8Rng,
    pub ledger: &'a mut FireLedger,
    pub tick: u64,
}

/// What each control variant does on its own.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VariantBehavior {
    pub follows_pattern: bool,
    /// Drop the pattern to chase a selected target.
    pub pursues: bool,
    pub aims: bool,
    /// Apply the personality's aim spread.
    pub inaccurate: bool,
    pub muzzle_speed: f64,
}

pub fn behavior(kind: ControlKind, tuning: &Tuning) -> VariantBehavior {
    match kind {
        ControlKind::Player => VariantBehavior {
            follows_pattern: false,
            pursues: false,
            aims: false,
            inaccurate: false,
            muzzle_speed: tuning.player_muzzle_speed,
        },
        ControlKind::Remote => VariantBehavior {
            follows_pattern: true,
            pursues: false,
            aims: true,
            inaccurate: false,
            muzzle_speed: tuning.remote_muzzle_speed,
        },
        ControlKind::Ai => VariantBehavior {
            follows_pattern: true,
            pursues: true,
            aims: true,
            inaccurate: true,
            muzzle_speed: tuning.ai_muzzle_speed,
        },
    }
}

/// Run one tick for `tank`. Returns the shell it fired, if any.
pub fn update(
    tank: &mut Tank,
    input: &ControlInput,
    collidables: &[ColliderEntry],
    ctx: &mut TankContext,
) -> Option<Shell> {
    if tank.destroyed {
        tank.moving = false;
        return None;
    }
    tank.tick_start_position = tank.position;
    tank.advance_reload();

    match tank.control_kind() {
        ControlKind::Player => update_player(tank, input, collidables, ctx),
        ControlKind::Remote | ControlKind::Ai => update_autopilot(tank, collidables, ctx),
    }
}

fn update_player(
    tank: &mut Tank,
    input: &ControlInput,
    collidables: &[ColliderEntry],
    ctx: &mut TankContext,
) -> Option<Shell> {
    let tuning = ctx.tuning;
    tank.hull_yaw = normalize_angle(tank.hull_yaw + input.steer() * tuning.hull_turn_rate);
    tank.turret_yaw = normalize_angle(tank.turret_yaw + input.traverse() * tuning.turret_turn_rate);
    tank.set_barrel_pitch(tank.barrel_pitch + input.elevate() * tuning.pitch_rate, tuning);

    let speed = match &mut tank.control {
        ControlVariant::Player(drive) => drive_speed(drive, input.throttle(), tuning),
        _ => 0.0,
    };
    translate(tank, speed);

    if tank.moving && is_blocked(tank, collidables) {
        tank.rollback();
        tank.moving = false;
        if let ControlVariant::Player(drive) = &mut tank.control {
            drive.speed = 0.0;
        }
        debug!(tank = %tank.id, "player move blocked");
    }

    if input.fire {
        fire(tank, ctx)
    } else {
        None
    }
}

/// Per-tick translation for a player tank.
///
/// The primary tank eases its acceleration toward the throttle and coasts
/// under drag; other player tanks move at throttle × speed.
pub fn drive_speed(drive: &mut PlayerDrive, throttle: f64, tuning: &Tuning) -> f64 {
    if !drive.primary {
        drive.speed = throttle * tuning.player_speed;
        return drive.speed;
    }

    let target = throttle * tuning.player_max_acceleration;
    drive.acceleration += (target - drive.acceleration) * tuning.acceleration_ease;
    if throttle == 0.0 {
        drive.speed *= tuning.drag;
        if drive.speed.abs() < STOP_SPEED {
            drive.speed = 0.0;
        }
    } else {
        drive.speed += drive.acceleration;
    }
    drive.speed = drive
        .speed
        .clamp(-tuning.player_max_speed, tuning.player_max_speed);
    drive.speed
}

fn translate(tank: &mut Tank, speed: f64) {
    if speed != 0.0 && speed.is_finite() {
        tank.position += tank.forward() * speed;
        tank.moving = true;
    } else {
        tank.moving = false;
    }
}

/// Whether this tick's move pushed the hull into, or deeper into, any
/// non-shell collidable but itself. Moves that back out of an existing
/// overlap are allowed.
fn is_blocked(tank: &Tank, collidables: &[ColliderEntry]) -> bool {
    let shape = tank.collider_shape();
    collidables.iter().any(|entry| {
        if entry.is_shell() || entry.tank == Some(tank.id) {
            return false;
        }
        let now = penetration_depth(&shape, tank.position, &entry.shape, entry.position);
        let before = penetration_depth(&shape, tank.tick_start_position, &entry.shape, entry.position);
        now > before + BLOCK_EPSILON
    })
}

fn update_autopilot(
    tank: &mut Tank,
    collidables: &[ColliderEntry],
    ctx: &mut TankContext,
) -> Option<Shell> {
    let tuning = ctx.tuning;
    let kind = tank.control_kind();
    let variant = behavior(kind, tuning);
    let (personality, synced) = match tank.autopilot() {
        Some(autopilot) => (autopilot.personality, autopilot.synced_tick == Some(ctx.tick)),
        None => return None,
    };
    let profile = gunnery_profile(&personality, tuning);
    tank.reload_ticks = match kind {
        ControlKind::Ai => profile.reload_ticks,
        _ => tuning.reload_ticks,
    };

    let target = if variant.aims {
        acquire(tank, collidables, &profile, tuning)
    } else {
        None
    };

    // Replicated remotes already hold this tick's authoritative pose.
    if variant.follows_pattern && !synced {
        let recovering = tank.autopilot().is_some_and(|a| a.is_recovering());
        let chase = match target {
            Some(target) if variant.pursues && !recovering => {
                let grudge = tank.last_attacker == Some(target.id);
                pursuit::wants_to_pursue(&personality, grudge, ctx.rng).then_some(target)
            }
            _ => None,
        };
        let step = match chase {
            Some(target) => {
                let input = PursuitInput {
                    position: tank.position,
                    heading: tank.hull_yaw,
                    target: target.position,
                    speed: tuning.ai_speed,
                };
                pursuit::pursue(&personality, &input, ctx.rng)
            }
            None => {
                let input = PatternInput {
                    position: tank.position,
                    heading: tank.hull_yaw,
                    tick: ctx.tick,
                    speed: tuning.ai_speed,
                    capture_radius: tuning.patrol_capture_radius,
                };
                match tank.autopilot_mut() {
                    Some(autopilot) => patterns::drive(autopilot, &input, ctx.rng),
                    None => return None,
                }
            }
        };
        tank.hull_yaw = normalize_angle(step.heading);
        translate(tank, step.speed);

        if tank.moving && is_blocked(tank, collidables) {
            tank.rollback();
            tank.moving = false;
            tank.begin_recovery(tuning.recovery_ticks);
        }
    } else {
        tank.moving = false;
    }

    engage(tank, target?, &profile, variant, ctx)
}

/// Choose this tick's target among visible tanks in range and remember it.
fn acquire(
    tank: &mut Tank,
    collidables: &[ColliderEntry],
    profile: &GunneryProfile,
    tuning: &Tuning,
) -> Option<TargetCandidate> {
    let pivot = tank.position + DVec3::Y * tuning.turret_height;
    let candidates: Vec<TargetCandidate> = collidables
        .iter()
        .filter(|entry| entry.is_tank() && entry.tank != Some(tank.id) && !entry.destroyed)
        .filter(|entry| horizontal_distance(tank.position, entry.position) <= profile.acquisition_range)
        .filter_map(|entry| {
            let id = entry.tank?;
            let eye = entry.position + DVec3::Y * tuning.turret_height;
            Some(TargetCandidate {
                id,
                position: entry.position,
                health: entry.health,
                destroyed: entry.destroyed,
                visible: line_of_sight(collidables, pivot, eye),
            })
        })
        .collect();

    let (tactical_iq, current_target) = match tank.autopilot() {
        Some(autopilot) => (autopilot.personality.tactical_iq, autopilot.target),
        None => return None,
    };
    let params = SelectionParams {
        acquisition_range: profile.acquisition_range,
        tactical_iq,
        last_attacker: tank.last_attacker,
        current_target,
    };
    let id = tank.id;
    let target = select_target(id, tank.position, &candidates, &params);
    if let Some(autopilot) = tank.autopilot_mut() {
        if autopilot.target != target.map(|t| t.id) {
            debug!(tank = %id, new_target = ?target.map(|t| t.id), "target changed");
        }
        autopilot.target = target.map(|t| t.id);
    }
    target
}

/// Lay the gun one step toward `target` and maybe fire.
fn engage(
    tank: &mut Tank,
    target: TargetCandidate,
    profile: &GunneryProfile,
    variant: VariantBehavior,
    ctx: &mut TankContext,
) -> Option<Shell> {
    let tuning = ctx.tuning;
    let state = AimState {
        position: tank.position,
        hull_yaw: tank.hull_yaw,
        turret_yaw: tank.turret_yaw,
        barrel_pitch: tank.barrel_pitch,
    };
    let aim_params = AimParams {
        turret_rate: profile.turret_rate,
        pitch_rate: tuning.pitch_rate,
        jitter: if variant.inaccurate { profile.jitter } else { 0.0 },
        min_elevation: tuning.min_elevation,
        max_elevation: tuning.max_elevation,
        muzzle_speed: variant.muzzle_speed,
        gravity: tuning.gravity,
        turret_height: tuning.turret_height,
    };
    let aim_point = target.position + DVec3::Y * AIM_POINT_HEIGHT;
    let update = aim(&state, aim_point, &aim_params, ctx.rng);
    tank.turret_yaw = update.turret_yaw;
    tank.set_barrel_pitch(update.barrel_pitch, tuning);

    let ready = tank.is_ready_to_fire();
    if should_fire(ready, update.distance, profile.fire_range, profile.fire_chance, ctx.rng) {
        fire(tank, ctx)
    } else {
        None
    }
}

/// Launch a shell from the muzzle if the gun is loaded and the ledger allows it.
pub fn fire(tank: &mut Tank, ctx: &mut TankContext) -> Option<Shell> {
    if !tank.is_ready_to_fire() {
        return None;
    }
    let variant = behavior(tank.control_kind(), ctx.tuning);
    let shell_id = ctx.ledger.try_fire(tank.id, ctx.tick)?;

    let shell = Shell::new(
        shell_id,
        Some(tank.id),
        tank.muzzle_position(ctx.tuning),
        tank.fire_direction(),
        variant.muzzle_speed,
        ctx.tuning,
    );
    tank.start_reload();
    tank.stats.shots_fired += 1;
    debug!(tank = %tank.id, shell = %shell_id, tick = ctx.tick, "shell fired");
    Some(shell)
}

/// Where a tank comes back when no position is given.
///
/// The primary player returns to the origin; everyone else lands on a random
/// point of the spawn ring.
pub fn default_spawn_position<R: Rng + ?Sized>(tank: &Tank, tuning: &Tuning, rng: &mut R) -> DVec3 {
    if tank.is_primary() {
        return DVec3::ZERO;
    }
    ring_position(tuning, rng)
}

/// Uniform angle, uniform radius within the spawn ring, on the ground plane.
pub fn ring_position<R: Rng + ?Sized>(tuning: &Tuning, rng: &mut R) -> DVec3 {
    let angle = rng.gen_range(0.0..TAU);
    let radius = rng.gen_range(tuning.spawn_ring_min..=tuning.spawn_ring_max);
    DVec3::new(radius * angle.cos(), 0.0, radius * angle.sin())
}

/// Revive `tank` at `position` or its default spawn. Returns where it landed.
pub fn respawn<R: Rng + ?Sized>(
    tank: &mut Tank,
    position: Option<DVec3>,
    tuning: &Tuning,
    rng: &mut R,
) -> DVec3 {
    let position = match position {
        Some(p) if p.is_finite() => p,
        _ => default_spawn_position(tank, tuning, rng),
    };
    tank.reset_for_respawn(position);
    info!(tank = %tank.id, x = position.x, z = position.z, "tank respawned");
    position
}
