//! Movement patterns for pattern-driven tanks.
//!
//! Each tick the autopilot either sits out a collision recovery or asks its
//! pattern for a heading and speed. The caller moves the hull and tests
//! collisions afterwards; a collision puts the autopilot back into recovery.
//!
//! Tanks far from the arena centre are pulled home: free-roaming patterns
//! bend their turns inward and sometimes steer straight for the centre.

use std::f64::consts::{FRAC_PI_2, PI};

use glam::DVec3;
use rand::Rng;
use tracing::debug;

use tankfire_core::components::{Autopilot, MovementPattern};
use tankfire_core::constants::*;
use tankfire_core::enums::PatternKind;
use tankfire_core::types::horizontal_distance;

use crate::targeting::{normalize_angle, step_toward_angle, yaw_to};

/// Per-tick input to a pattern.
#[derive(Debug, Clone, Copy)]
pub struct PatternInput {
    pub position: DVec3,
    pub heading: f64,
    pub tick: u64,
    /// Cruise speed.
    pub speed: f64,
    pub capture_radius: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatternStep {
    pub heading: f64,
    pub speed: f64,
}

fn random_heading<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.gen_range(-PI..PI)
}

fn next_change<R: Rng + ?Sized>(tick: u64, rng: &mut R) -> u64 {
    tick + rng.gen_range(HEADING_CHANGE_MIN_TICKS..=HEADING_CHANGE_MAX_TICKS)
}

/// Build a fresh pattern of `kind` for a tank spawned at `spawn`.
///
/// Patrols get a square of random size centred on the spawn point.
pub fn make_pattern<R: Rng + ?Sized>(
    kind: PatternKind,
    spawn: DVec3,
    tick: u64,
    rng: &mut R,
) -> MovementPattern {
    match kind {
        PatternKind::Circle => MovementPattern::Circle {
            turn_rate: CIRCLE_TURN_RATE,
        },
        PatternKind::Zigzag => MovementPattern::Zigzag {
            base_heading: random_heading(rng),
            phase: 0.0,
            next_change_tick: next_change(tick, rng),
        },
        PatternKind::RandomWalk => MovementPattern::RandomWalk {
            target_heading: random_heading(rng),
            next_change_tick: next_change(tick, rng),
        },
        PatternKind::Patrol => {
            let half = rng.gen_range(PATROL_SQUARE_MIN..=PATROL_SQUARE_MAX) * 0.5;
            let corners = [(-half, -half), (half, -half), (half, half), (-half, half)];
            MovementPattern::Patrol {
                waypoints: corners
                    .iter()
                    .map(|(dx, dz)| DVec3::new(spawn.x + dx, 0.0, spawn.z + dz))
                    .collect(),
                index: 0,
            }
        }
    }
}

/// Advance the pattern by one tick.
pub fn step_pattern<R: Rng + ?Sized>(
    pattern: &mut MovementPattern,
    input: &PatternInput,
    rng: &mut R,
) -> PatternStep {
    match pattern {
        MovementPattern::Circle { turn_rate } => PatternStep {
            heading: input.heading + turn_rate.abs(),
            speed: input.speed,
        },
        MovementPattern::Zigzag {
            base_heading,
            phase,
            next_change_tick,
        } => {
            if input.tick >= *next_change_tick {
                *base_heading = random_heading(rng);
                *next_change_tick = next_change(input.tick, rng);
            }
            *phase += ZIGZAG_FREQUENCY;
            PatternStep {
                heading: *base_heading + ZIGZAG_AMPLITUDE * phase.sin(),
                speed: input.speed,
            }
        }
        MovementPattern::RandomWalk {
            target_heading,
            next_change_tick,
        } => {
            if input.tick >= *next_change_tick {
                *target_heading = random_heading(rng);
                *next_change_tick = next_change(input.tick, rng);
            }
            PatternStep {
                heading: step_toward_angle(input.heading, *target_heading, WANDER_TURN_RATE),
                speed: input.speed,
            }
        }
        MovementPattern::Patrol { waypoints, index } => {
            if waypoints.is_empty() {
                return PatternStep {
                    heading: input.heading,
                    speed: input.speed,
                };
            }
            *index %= waypoints.len();
            if horizontal_distance(input.position, waypoints[*index]) < input.capture_radius {
                *index = (*index + 1) % waypoints.len();
            }
            PatternStep {
                heading: yaw_to(input.position, waypoints[*index]),
                speed: input.speed,
            }
        }
    }
}

/// One tick of autopilot driving: recovery countdown, or the pattern.
///
/// While recovering the tank holds still. On the last recovery tick it turns
/// to roughly the reverse of the heading it had when it collided. Otherwise
/// the pattern step is bent by the homeward pull.
pub fn drive<R: Rng + ?Sized>(
    autopilot: &mut Autopilot,
    input: &PatternInput,
    rng: &mut R,
) -> PatternStep {
    if let Some(recovery) = autopilot.recovery.as_mut() {
        recovery.remaining = recovery.remaining.saturating_sub(1);
        if recovery.remaining > 0 {
            return PatternStep {
                heading: input.heading,
                speed: 0.0,
            };
        }

        let jitter = rng.gen_range(-RECOVERY_HEADING_JITTER..=RECOVERY_HEADING_JITTER);
        let heading = normalize_angle(recovery.prior_heading + PI + jitter);
        autopilot.recovery = None;
        reseed_heading(&mut autopilot.pattern, heading);
        debug!(heading, "recovery finished");
        return PatternStep {
            heading,
            speed: 0.0,
        };
    }

    let step = step_pattern(&mut autopilot.pattern, input, rng);
    steer_home(&autopilot.pattern, step, input, rng)
}

/// Strength of the pull toward the arena centre, in `[0, HOME_PULL_MAX]`.
pub fn home_bias(position: DVec3) -> f64 {
    let distance = horizontal_distance(position, DVec3::ZERO);
    ((distance - HOME_PULL_START) / HOME_PULL_SPAN).clamp(0.0, HOME_PULL_MAX)
}

/// Bend a free-roaming step toward the arena centre. Patrols keep their route.
///
/// Far out, the pull sometimes takes over and turns straight for home at a
/// higher speed. Otherwise an orbit turns less while it faces home and more
/// while it faces away, and every pattern gets a small speed boost.
fn steer_home<R: Rng + ?Sized>(
    pattern: &MovementPattern,
    step: PatternStep,
    input: &PatternInput,
    rng: &mut R,
) -> PatternStep {
    if matches!(pattern, MovementPattern::Patrol { .. }) {
        return step;
    }
    let bias = home_bias(input.position);
    if bias <= 0.0 {
        return step;
    }

    let home = yaw_to(input.position, DVec3::ZERO);
    if bias > HOME_OVERRIDE_BIAS && rng.gen_bool((bias * 0.4).min(1.0)) {
        return PatternStep {
            heading: step_toward_angle(input.heading, home, 0.02 + bias * 0.03),
            speed: input.speed * (1.0 + bias * 0.7),
        };
    }

    let mut heading = step.heading;
    if let MovementPattern::Circle { .. } = pattern {
        let facing_home = normalize_angle(home - input.heading).abs() < FRAC_PI_2;
        let scale = if facing_home {
            1.0 - bias * 0.4
        } else {
            1.0 + bias * 0.6
        };
        heading = input.heading + (step.heading - input.heading) * scale;
    }
    PatternStep {
        heading,
        speed: step.speed * (1.0 + bias * 0.3),
    }
}

/// Point heading-holding patterns at `heading` so they do not snap back.
fn reseed_heading(pattern: &mut MovementPattern, heading: f64) {
    match pattern {
        MovementPattern::Zigzag {
            base_heading,
            phase,
            ..
        } => {
            *base_heading = heading;
            *phase = 0.0;
        }
        MovementPattern::RandomWalk { target_heading, .. } => *target_heading = heading,
        MovementPattern::Circle { .. } | MovementPattern::Patrol { .. } => {}
    }
}
