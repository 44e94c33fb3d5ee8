//! Simulation snapshot: the complete visible state handed to the host each tick.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::components::TankStats;
use crate::enums::*;
use crate::events::GameEvent;
use crate::types::{ShellId, SimTime, TankId};

/// Complete state broadcast after each tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimSnapshot {
    pub time: SimTime,
    pub paused: bool,
    /// Sorted by tank id.
    pub tanks: Vec<TankView>,
    /// Sorted by shell id.
    pub shells: Vec<ShellView>,
    pub events: Vec<GameEvent>,
}

impl SimSnapshot {
    pub fn tank(&self, id: TankId) -> Option<&TankView> {
        self.tanks.iter().find(|t| t.id == id)
    }
}

/// Read-only view of one tank for rendering, radar and stats overlays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TankView {
    pub id: TankId,
    pub control: ControlKind,
    pub position: DVec3,
    pub hull_yaw: f64,
    pub turret_yaw: f64,
    pub barrel_pitch: f64,
    pub health: f64,
    pub destroyed: bool,
    pub fire_state: FireState,
    pub pattern: Option<PatternKind>,
    pub recovering: bool,
    pub stats: TankStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShellView {
    pub id: ShellId,
    pub owner: Option<TankId>,
    pub position: DVec3,
    pub velocity: DVec3,
}
