//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

use crate::constants::*;

/// Static obstacle subtype.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstacleKind {
    #[default]
    Tree,
    Rock,
    Building,
}

/// Type tag carried by every collidable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColliderKind {
    Tank,
    Shell,
    Obstacle(ObstacleKind),
}

impl ColliderKind {
    pub fn is_static(&self) -> bool {
        matches!(self, ColliderKind::Obstacle(_))
    }
}

/// Weapon sub-state of an active tank.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FireState {
    Reloading,
    #[default]
    ReadyToFire,
}

/// Which control variant drives a tank.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlKind {
    #[default]
    Player,
    Remote,
    Ai,
}

/// Movement pattern selector for pattern-driven tanks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatternKind {
    #[default]
    Circle,
    Zigzag,
    RandomWalk,
    Patrol,
}

impl PatternKind {
    pub const ALL: [PatternKind; 4] = [
        PatternKind::Circle,
        PatternKind::Zigzag,
        PatternKind::RandomWalk,
        PatternKind::Patrol,
    ];
}

/// Hit zone on a tank, chosen by impact height.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitLocation {
    Turret,
    #[default]
    Body,
    Tracks,
}

impl HitLocation {
    /// Classify an impact by its height above the hull origin.
    pub fn from_height(height: f64) -> Self {
        if height > TURRET_HIT_HEIGHT {
            HitLocation::Turret
        } else if height < TRACKS_HIT_HEIGHT {
            HitLocation::Tracks
        } else {
            HitLocation::Body
        }
    }

    /// Damage multiplier for this zone.
    pub fn multiplier(&self) -> f64 {
        match self {
            HitLocation::Turret => TURRET_DAMAGE_MULTIPLIER,
            HitLocation::Body => BODY_DAMAGE_MULTIPLIER,
            HitLocation::Tracks => TRACKS_DAMAGE_MULTIPLIER,
        }
    }
}

/// Why a shell stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImpactCause {
    Tank,
    Obstacle,
    Ground,
    Expired,
}
