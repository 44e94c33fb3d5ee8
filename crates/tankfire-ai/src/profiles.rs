//! Personality-driven gunnery profiles.
//!
//! Consolidates per-tank parameters derived from personality traits.

use rand::Rng;

use tankfire_core::components::Personality;
use tankfire_core::config::Tuning;
use tankfire_core::constants::MIN_RELOAD_TICKS;

/// Gunnery parameters for one autopilot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GunneryProfile {
    /// Base aim spread (radians).
    pub jitter: f64,
    /// Per-tick trigger probability once in range and loaded.
    pub fire_chance: f64,
    pub reload_ticks: u32,
    pub fire_range: f64,
    pub acquisition_range: f64,
    pub turret_rate: f64,
}

/// Roll a personality around `difficulty` (0 = rookie, 1 = ace).
///
/// Each trait is the difficulty plus the mean of three uniform draws, which
/// clusters results near the difficulty without a normal distribution.
pub fn roll_personality<R: Rng + ?Sized>(difficulty: f64, rng: &mut R) -> Personality {
    let center = difficulty.clamp(0.0, 1.0);
    let trait_value = |rng: &mut R| {
        let noise: f64 = (0..3).map(|_| rng.gen_range(-0.3..=0.3)).sum::<f64>() / 3.0;
        (center + noise).clamp(0.0, 1.0)
    };
    Personality {
        accuracy: trait_value(rng),
        aggressiveness: trait_value(rng),
        fire_rate: trait_value(rng),
        tactical_iq: trait_value(rng),
    }
}

/// Derive gunnery parameters from personality and tuning.
pub fn gunnery_profile(personality: &Personality, tuning: &Tuning) -> GunneryProfile {
    let accuracy = personality.accuracy.clamp(0.0, 1.0);
    let aggressiveness = personality.aggressiveness.clamp(0.0, 1.0);
    let fire_rate = personality.fire_rate.clamp(0.0, 1.0);
    let iq = personality.tactical_iq.clamp(0.0, 1.0);

    let reload = (tuning.reload_ticks as f64 * (1.5 - fire_rate)).round() as u32;

    GunneryProfile {
        jitter: (1.0 - accuracy) * tuning.base_jitter,
        fire_chance: (tuning.fire_chance * (0.5 + fire_rate)).clamp(0.0, 1.0),
        reload_ticks: reload.max(MIN_RELOAD_TICKS.min(tuning.reload_ticks)),
        fire_range: tuning.fire_range * (0.8 + 0.4 * aggressiveness),
        acquisition_range: tuning.acquisition_range * (0.8 + 0.4 * aggressiveness),
        turret_rate: tuning.turret_turn_rate * (0.8 + 0.4 * iq),
    }
}
