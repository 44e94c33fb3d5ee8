//! Fundamental geometric and simulation types.
//!
//! World space is right-handed with y up. The ground plane is y = 0.
//! A yaw of θ faces `(sin θ, 0, cos θ)`; positive pitch tilts the barrel up.

use std::fmt;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::constants::DT;

/// Stable tank identity. Survives respawns; never reused within a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TankId(pub u32);

/// Shell identity, assigned by the fire ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShellId(pub u64);

impl fmt::Display for TankId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tank_{}", self.0)
    }
}

impl fmt::Display for ShellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "shell_{}", self.0)
    }
}

/// Simulation time tracking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SimTime {
    /// Current tick number (increments by 1 each tick).
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub elapsed_secs: f64,
}

impl SimTime {
    /// Advance by one tick.
    pub fn advance(&mut self) {
        self.tick += 1;
        self.elapsed_secs = self.tick as f64 * DT;
    }
}

/// Unit forward vector on the ground plane for a yaw angle.
pub fn forward_from_yaw(yaw: f64) -> DVec3 {
    DVec3::new(yaw.sin(), 0.0, yaw.cos())
}

/// Distance between two points ignoring height.
pub fn horizontal_distance(a: DVec3, b: DVec3) -> f64 {
    let dx = b.x - a.x;
    let dz = b.z - a.z;
    (dx * dx + dz * dz).sqrt()
}

/// Project a point onto the ground plane.
pub fn flatten(v: DVec3) -> DVec3 {
    DVec3::new(v.x, 0.0, v.z)
}
