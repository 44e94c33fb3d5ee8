//! Domain events emitted by the simulation for presentation, audio and replication.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::{ShellId, TankId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    /// Health reached zero. `source` is the shooter, if known.
    TankDestroyed {
        victim: TankId,
        source: Option<TankId>,
    },
    /// A shell damaged a live tank.
    TankHit {
        victim: TankId,
        source: Option<TankId>,
        amount: f64,
        location: HitLocation,
    },
    TankRespawned { tank: TankId, position: DVec3 },
    ShellFired {
        shell: ShellId,
        owner: TankId,
        origin: DVec3,
        direction: DVec3,
        speed: f64,
    },
    /// A shell stopped: hit something, reached the ground or ran out of time.
    ShellImpact {
        shell: ShellId,
        owner: Option<TankId>,
        position: DVec3,
        cause: ImpactCause,
        /// The tank struck, for `cause == Tank`.
        tank: Option<TankId>,
    },
}
