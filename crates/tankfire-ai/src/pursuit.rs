//! Pursuit: closing on a selected target and holding a fighting range.
//!
//! Aggressive autopilots (or ones holding a grudge against their target)
//! drop their movement pattern and drive relative to the target instead.
//! Clever ones back off when crowded and swing out to flank.

use glam::DVec3;
use rand::Rng;

use tankfire_core::components::Personality;
use tankfire_core::constants::*;
use tankfire_core::types::horizontal_distance;

use crate::patterns::PatternStep;
use crate::targeting::{normalize_angle, step_toward_angle, yaw_to};

/// Closer than this share of the preferred range, clever tanks reverse away.
const BACK_OFF_RATIO: f64 = 0.7;
/// Farther than this share of the preferred range, tanks close in.
const CLOSE_IN_RATIO: f64 = 1.3;
/// Tactical IQ needed to back off instead of pushing on.
const BACK_OFF_IQ: f64 = 0.4;
/// Under this share of the preferred range, tanks drive harder to get clear.
const CROWDED_RATIO: f64 = 0.5;

#[derive(Debug, Clone, Copy)]
pub struct PursuitInput {
    pub position: DVec3,
    pub heading: f64,
    pub target: DVec3,
    /// Cruise speed.
    pub speed: f64,
}

/// Preferred distance to the target for a given tactical IQ.
pub fn ideal_range(tactical_iq: f64) -> f64 {
    PURSUIT_RANGE_BASE + PURSUIT_RANGE_IQ * tactical_iq.clamp(0.0, 1.0)
}

/// Decide whether to chase the current target this tick.
///
/// Tanks below the flanking IQ commit whenever the likelihood clears the
/// threshold; cleverer ones still roll against it.
pub fn wants_to_pursue<R: Rng + ?Sized>(personality: &Personality, grudge: bool, rng: &mut R) -> bool {
    let mut likelihood = personality.aggressiveness.clamp(0.0, 1.0);
    if grudge {
        likelihood += GRUDGE_PURSUIT_BOOST;
    }
    if likelihood <= PURSUIT_THRESHOLD {
        return false;
    }
    personality.tactical_iq < FLANK_IQ || rng.gen_bool(likelihood.min(1.0))
}

/// One tick of driving relative to the target.
///
/// A negative speed reverses along the hull axis while still facing the target.
pub fn pursue<R: Rng + ?Sized>(
    personality: &Personality,
    input: &PursuitInput,
    rng: &mut R,
) -> PatternStep {
    let iq = personality.tactical_iq.clamp(0.0, 1.0);
    let distance = horizontal_distance(input.position, input.target);
    let bearing = yaw_to(input.position, input.target);
    let ideal = ideal_range(iq);

    let (desired, direction) = if distance < ideal * BACK_OFF_RATIO && iq > BACK_OFF_IQ {
        (bearing, -1.0)
    } else if distance > ideal * CLOSE_IN_RATIO {
        (bearing, 1.0)
    } else if iq > FLANK_IQ {
        // Swing out on whichever side the hull already favours.
        let side = if normalize_angle(input.heading - bearing) < 0.0 { -1.0 } else { 1.0 };
        (bearing + side * FLANK_ANGLE, 1.0)
    } else {
        (bearing, 1.0)
    };

    let pace = if distance < ideal * CROWDED_RATIO {
        1.2
    } else if (distance - ideal).abs() < PURSUIT_HOLD_BAND {
        0.6
    } else {
        1.0
    };
    let mut speed = input.speed * pace * direction;
    if iq > STOP_AND_SHOOT_IQ && rng.gen_bool(STOP_AND_SHOOT_CHANCE) {
        speed = 0.0;
    }

    PatternStep {
        heading: normalize_angle(step_toward_angle(input.heading, desired, PURSUIT_TURN_RATE)),
        speed,
    }
}
