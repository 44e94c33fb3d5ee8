//! Aiming geometry and target selection.
//!
//! Angles follow the world convention: yaw θ faces `(sin θ, 0, cos θ)`,
//! positive pitch is up. Turret yaw is relative to the hull.

use std::f64::consts::{FRAC_PI_4, PI, TAU};

use glam::DVec3;
use rand::Rng;

use tankfire_core::constants::{JITTER_DISTANCE_SCALE, MAX_HEALTH};
use tankfire_core::types::{horizontal_distance, TankId};

/// Wrap an angle into `(-π, π]`. Non-finite input maps to zero.
pub fn normalize_angle(angle: f64) -> f64 {
    if !angle.is_finite() {
        return 0.0;
    }
    let wrapped = angle.rem_euclid(TAU);
    if wrapped > PI {
        wrapped - TAU
    } else {
        wrapped
    }
}

/// World yaw that faces from `from` toward `to` on the ground plane.
pub fn yaw_to(from: DVec3, to: DVec3) -> f64 {
    (to.x - from.x).atan2(to.z - from.z)
}

/// Rotate `current` toward `desired` along the shorter arc by at most `max_rate`.
///
/// The result is not wrapped, so a steadily turning heading stays continuous.
pub fn step_toward_angle(current: f64, desired: f64, max_rate: f64) -> f64 {
    let error = normalize_angle(desired - current);
    let rate = max_rate.abs();
    if error.abs() <= rate {
        current + error
    } else {
        current + rate * error.signum()
    }
}

fn approach(current: f64, desired: f64, max_rate: f64) -> f64 {
    let delta = desired - current;
    let rate = max_rate.abs();
    if delta.abs() <= rate {
        desired
    } else {
        current + rate * delta.signum()
    }
}

/// Barrel pitch needed to reach a point `height_delta` above the muzzle and
/// `horizontal_distance` away: the sight-line angle plus the low-arc drop
/// compensation, or the maximum-range angle when out of reach. Clamped.
pub fn required_pitch(
    height_delta: f64,
    horizontal_distance: f64,
    muzzle_speed: f64,
    gravity: f64,
    min_elevation: f64,
    max_elevation: f64,
) -> f64 {
    let distance = horizontal_distance.max(f64::EPSILON);
    let sight = height_delta.atan2(distance);
    let drop = if gravity > 0.0 && muzzle_speed > 0.0 {
        let k = gravity * distance / (muzzle_speed * muzzle_speed);
        if k <= 1.0 {
            0.5 * k.asin()
        } else {
            FRAC_PI_4
        }
    } else {
        0.0
    };
    (sight + drop).clamp(min_elevation, max_elevation)
}

/// Gun-laying limits and ballistics for one tank.
#[derive(Debug, Clone, Copy)]
pub struct AimParams {
    pub turret_rate: f64,
    pub pitch_rate: f64,
    /// Base aim spread in radians; zero for perfect aim.
    pub jitter: f64,
    pub min_elevation: f64,
    pub max_elevation: f64,
    pub muzzle_speed: f64,
    pub gravity: f64,
    pub turret_height: f64,
}

/// Orientation of the gun before aiming.
#[derive(Debug, Clone, Copy)]
pub struct AimState {
    pub position: DVec3,
    pub hull_yaw: f64,
    pub turret_yaw: f64,
    pub barrel_pitch: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct AimUpdate {
    pub turret_yaw: f64,
    pub barrel_pitch: f64,
    pub distance: f64,
}

/// One tick of gun laying toward `target`.
pub fn aim<R: Rng + ?Sized>(
    state: &AimState,
    target: DVec3,
    params: &AimParams,
    rng: &mut R,
) -> AimUpdate {
    let pivot = state.position + DVec3::Y * params.turret_height;
    let distance = horizontal_distance(pivot, target);

    let mut desired_yaw = normalize_angle(yaw_to(pivot, target) - state.hull_yaw);
    let mut desired_pitch = required_pitch(
        target.y - pivot.y,
        distance,
        params.muzzle_speed,
        params.gravity,
        params.min_elevation,
        params.max_elevation,
    );

    if params.jitter > 0.0 {
        let spread = params.jitter * (1.0 + distance / JITTER_DISTANCE_SCALE);
        desired_yaw += rng.gen_range(-spread..=spread);
        desired_pitch += rng.gen_range(-spread..=spread) * 0.5;
    }

    let turret_yaw = normalize_angle(step_toward_angle(
        state.turret_yaw,
        desired_yaw,
        params.turret_rate,
    ));
    let barrel_pitch = approach(
        state.barrel_pitch,
        desired_pitch.clamp(params.min_elevation, params.max_elevation),
        params.pitch_rate,
    )
    .clamp(params.min_elevation, params.max_elevation);

    AimUpdate {
        turret_yaw,
        barrel_pitch,
        distance,
    }
}

/// Trigger gate: loaded, in range, and the per-tick roll succeeds.
pub fn should_fire<R: Rng + ?Sized>(
    ready: bool,
    distance: f64,
    fire_range: f64,
    fire_chance: f64,
    rng: &mut R,
) -> bool {
    if !ready || !(distance < fire_range) {
        return false;
    }
    rng.gen_bool(fire_chance.clamp(0.0, 1.0))
}

/// A tank the autopilot could shoot at.
#[derive(Debug, Clone, Copy)]
pub struct TargetCandidate {
    pub id: TankId,
    pub position: DVec3,
    pub health: f64,
    pub destroyed: bool,
    /// Unobstructed line of sight from the chooser.
    pub visible: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct SelectionParams {
    pub acquisition_range: f64,
    pub tactical_iq: f64,
    pub last_attacker: Option<TankId>,
    pub current_target: Option<TankId>,
}

/// Score every live, visible candidate in range and return the best.
///
/// Closer is better; clever gunners favour damaged tanks; grudges against
/// the last attacker and sticking with the current target break ties.
pub fn select_target(
    chooser: TankId,
    origin: DVec3,
    candidates: &[TargetCandidate],
    params: &SelectionParams,
) -> Option<TargetCandidate> {
    let range = params.acquisition_range.max(f64::EPSILON);
    let mut best: Option<(f64, TargetCandidate)> = None;

    for candidate in candidates {
        if candidate.id == chooser || candidate.destroyed || !candidate.visible {
            continue;
        }
        let distance = horizontal_distance(origin, candidate.position);
        if distance > range {
            continue;
        }

        let mut score = 1.0 - distance / range;
        score += (1.0 - candidate.health / MAX_HEALTH) * params.tactical_iq * 0.5;
        if params.last_attacker == Some(candidate.id) {
            score += 0.5;
        }
        if params.current_target == Some(candidate.id) {
            score += 0.2;
        }

        let better = match &best {
            Some((best_score, best_candidate)) => {
                score > *best_score || (score == *best_score && candidate.id < best_candidate.id)
            }
            None => true,
        };
        if better {
            best = Some((score, *candidate));
        }
    }

    best.map(|(_, candidate)| candidate)
}
