//! Control input and host commands sent to the simulation.
//!
//! Commands are queued and processed at the next tick boundary.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::types::TankId;

/// Per-tick control snapshot for an input-driven tank.
///
/// Axis intensities are in `[0, 1]`; out-of-range values are clamped on use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlInput {
    pub forward: f64,
    pub backward: f64,
    pub turn_left: f64,
    pub turn_right: f64,
    pub turret_left: f64,
    pub turret_right: f64,
    pub barrel_up: f64,
    pub barrel_down: f64,
    pub fire: bool,
}

/// Digital (keyboard-style) input; converts into full-strength axes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputFlags {
    pub forward: bool,
    pub backward: bool,
    pub turn_left: bool,
    pub turn_right: bool,
    pub turret_left: bool,
    pub turret_right: bool,
    pub barrel_up: bool,
    pub barrel_down: bool,
    pub fire: bool,
}

fn axis(flag: bool) -> f64 {
    if flag {
        1.0
    } else {
        0.0
    }
}

fn unit(v: f64) -> f64 {
    if v.is_finite() {
        v.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

impl ControlInput {
    pub fn from_flags(flags: InputFlags) -> Self {
        Self {
            forward: axis(flags.forward),
            backward: axis(flags.backward),
            turn_left: axis(flags.turn_left),
            turn_right: axis(flags.turn_right),
            turret_left: axis(flags.turret_left),
            turret_right: axis(flags.turret_right),
            barrel_up: axis(flags.barrel_up),
            barrel_down: axis(flags.barrel_down),
            fire: flags.fire,
        }
    }

    /// Net drive in `[-1, 1]`, positive forward.
    pub fn throttle(&self) -> f64 {
        unit(self.forward) - unit(self.backward)
    }

    /// Net hull turn in `[-1, 1]`, positive left.
    pub fn steer(&self) -> f64 {
        unit(self.turn_left) - unit(self.turn_right)
    }

    /// Net turret turn in `[-1, 1]`, positive left.
    pub fn traverse(&self) -> f64 {
        unit(self.turret_left) - unit(self.turret_right)
    }

    /// Net barrel motion in `[-1, 1]`, positive up.
    pub fn elevate(&self) -> f64 {
        unit(self.barrel_up) - unit(self.barrel_down)
    }
}

impl From<InputFlags> for ControlInput {
    fn from(flags: InputFlags) -> Self {
        Self::from_flags(flags)
    }
}

/// Authoritative state for a remote tank, as received from replication.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReplicatedState {
    pub position: DVec3,
    pub hull_yaw: f64,
    pub turret_yaw: f64,
    pub barrel_pitch: f64,
    pub health: f64,
}

/// All host-side actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerCommand {
    // --- Control ---
    /// Replace the held input of a player tank.
    SetInput { tank: TankId, input: ControlInput },

    // --- Lifecycle ---
    /// Respawn a tank at `position`, or at its variant's default spawn.
    Respawn {
        tank: TankId,
        position: Option<DVec3>,
    },
    /// Authoritative health override.
    SetHealth { tank: TankId, health: f64 },
    /// Apply replicated state to a remote tank.
    ReplicateState {
        tank: TankId,
        state: ReplicatedState,
    },

    // --- Simulation control ---
    Pause,
    Resume,
}
