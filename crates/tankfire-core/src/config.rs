//! Gameplay tuning and config errors.
//!
//! `Tuning` mirrors the defaults in [`crate::constants`] and can be
//! overridden field by field from JSON; missing fields keep their defaults.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::*;

/// Error type for config loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error while reading a config file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Malformed JSON or wrong field types.
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
    /// Well-formed but out of range.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Every tunable gameplay value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // Tank body
    pub tank_radius: f64,
    pub turret_height: f64,
    pub barrel_length: f64,
    pub min_elevation: f64,
    pub max_elevation: f64,

    // Player drive
    pub player_speed: f64,
    pub player_max_speed: f64,
    pub player_max_acceleration: f64,
    pub acceleration_ease: f64,
    pub drag: f64,
    pub hull_turn_rate: f64,
    pub turret_turn_rate: f64,
    pub pitch_rate: f64,

    // Autopilot
    pub ai_speed: f64,
    pub patrol_capture_radius: f64,
    pub recovery_ticks: u32,
    pub acquisition_range: f64,
    pub fire_range: f64,
    pub fire_chance: f64,
    pub base_jitter: f64,

    // Weapons
    pub reload_ticks: u32,
    pub player_muzzle_speed: f64,
    pub remote_muzzle_speed: f64,
    pub ai_muzzle_speed: f64,
    pub shell_radius: f64,
    pub shell_lifetime_ticks: u32,
    pub gravity: f64,
    pub fire_dedup_ticks: u64,

    // Damage and respawn
    pub base_damage: f64,
    pub max_damage_per_hit: f64,
    pub respawn_delay_ticks: u64,
    pub spawn_ring_min: f64,
    pub spawn_ring_max: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            tank_radius: TANK_RADIUS,
            turret_height: TURRET_HEIGHT,
            barrel_length: BARREL_LENGTH,
            min_elevation: MIN_ELEVATION,
            max_elevation: MAX_ELEVATION,
            player_speed: PLAYER_SPEED,
            player_max_speed: PLAYER_MAX_SPEED,
            player_max_acceleration: PLAYER_MAX_ACCELERATION,
            acceleration_ease: ACCELERATION_EASE,
            drag: DRAG,
            hull_turn_rate: HULL_TURN_RATE,
            turret_turn_rate: TURRET_TURN_RATE,
            pitch_rate: PITCH_RATE,
            ai_speed: AI_SPEED,
            patrol_capture_radius: PATROL_CAPTURE_RADIUS,
            recovery_ticks: RECOVERY_TICKS,
            acquisition_range: ACQUISITION_RANGE,
            fire_range: FIRE_RANGE,
            fire_chance: FIRE_CHANCE,
            base_jitter: BASE_JITTER,
            reload_ticks: RELOAD_TICKS,
            player_muzzle_speed: PLAYER_MUZZLE_SPEED,
            remote_muzzle_speed: REMOTE_MUZZLE_SPEED,
            ai_muzzle_speed: AI_MUZZLE_SPEED,
            shell_radius: SHELL_RADIUS,
            shell_lifetime_ticks: SHELL_LIFETIME_TICKS,
            gravity: GRAVITY,
            fire_dedup_ticks: FIRE_DEDUP_TICKS,
            base_damage: BASE_DAMAGE,
            max_damage_per_hit: MAX_DAMAGE_PER_HIT,
            respawn_delay_ticks: RESPAWN_DELAY_TICKS,
            spawn_ring_min: SPAWN_RING_MIN,
            spawn_ring_max: SPAWN_RING_MAX,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) tuning table from JSON and validate it.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("tank_radius", self.tank_radius),
            ("shell_radius", self.shell_radius),
            ("barrel_length", self.barrel_length),
            ("player_muzzle_speed", self.player_muzzle_speed),
            ("remote_muzzle_speed", self.remote_muzzle_speed),
            ("ai_muzzle_speed", self.ai_muzzle_speed),
            ("patrol_capture_radius", self.patrol_capture_radius),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(ConfigError::Invalid(format!("{name} must be positive, got {value}")));
            }
        }
        if self.shell_lifetime_ticks == 0 {
            return Err(ConfigError::Invalid("shell_lifetime_ticks must be positive".into()));
        }
        if self.min_elevation > self.max_elevation {
            return Err(ConfigError::Invalid(format!(
                "min_elevation {} exceeds max_elevation {}",
                self.min_elevation, self.max_elevation
            )));
        }
        if self.spawn_ring_min > self.spawn_ring_max || self.spawn_ring_min < 0.0 {
            return Err(ConfigError::Invalid("spawn ring bounds are inverted".into()));
        }
        if !(0.0..=1.0).contains(&self.fire_chance) {
            return Err(ConfigError::Invalid(format!(
                "fire_chance must be within [0, 1], got {}",
                self.fire_chance
            )));
        }
        if !(0.0..=1.0).contains(&self.drag) {
            return Err(ConfigError::Invalid(format!(
                "drag must be within [0, 1], got {}",
                self.drag
            )));
        }
        Ok(())
    }
}
