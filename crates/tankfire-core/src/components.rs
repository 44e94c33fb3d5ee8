//! ECS components for the simulation world.
//!
//! Tanks, shells and static obstacles are each a single component carrying
//! their own position. State transitions that need no outside context
//! (damage, reload, rollback, shell flight) live here as methods; behaviour
//! that needs the world, the RNG or other tanks lives in the sim crate.

use glam::{DQuat, DVec3};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::Tuning;
use crate::constants::*;
use crate::enums::*;
use crate::events::GameEvent;
use crate::shapes::{Collidable, ColliderShape};
use crate::types::{forward_from_yaw, ShellId, TankId};

// ---- Tank ----

/// Per-variant control state. One shared `Tank` struct, three behaviours.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlVariant {
    Player(PlayerDrive),
    Remote(Autopilot),
    Ai(Autopilot),
}

impl ControlVariant {
    pub fn kind(&self) -> ControlKind {
        match self {
            ControlVariant::Player(_) => ControlKind::Player,
            ControlVariant::Remote(_) => ControlKind::Remote,
            ControlVariant::Ai(_) => ControlKind::Ai,
        }
    }
}

/// Drive state for input-controlled tanks.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerDrive {
    /// The locally controlled tank: integrates with inertia and respawns at the origin.
    pub primary: bool,
    /// Signed speed along the hull forward axis (units/tick).
    pub speed: f64,
    /// Current acceleration, easing toward the input-derived target.
    pub acceleration: f64,
}

/// Gunner/driver traits for pattern-driven tanks, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Personality {
    pub accuracy: f64,
    pub aggressiveness: f64,
    pub fire_rate: f64,
    pub tactical_iq: f64,
}

impl Default for Personality {
    fn default() -> Self {
        Self {
            accuracy: 0.5,
            aggressiveness: 0.5,
            fire_rate: 0.5,
            tactical_iq: 0.5,
        }
    }
}

/// Movement pattern together with its running state.
#[derive(Debug, Clone, PartialEq)]
pub enum MovementPattern {
    /// Orbit: heading grows by `turn_rate` every tick.
    Circle { turn_rate: f64 },
    /// Sinusoidal heading offset around `base_heading`.
    Zigzag {
        base_heading: f64,
        phase: f64,
        next_change_tick: u64,
    },
    /// Turn toward `target_heading`, re-rolled at random intervals.
    RandomWalk {
        target_heading: f64,
        next_change_tick: u64,
    },
    /// Visit `waypoints` in order, looping.
    Patrol { waypoints: Vec<DVec3>, index: usize },
}

impl MovementPattern {
    pub fn kind(&self) -> PatternKind {
        match self {
            MovementPattern::Circle { .. } => PatternKind::Circle,
            MovementPattern::Zigzag { .. } => PatternKind::Zigzag,
            MovementPattern::RandomWalk { .. } => PatternKind::RandomWalk,
            MovementPattern::Patrol { .. } => PatternKind::Patrol,
        }
    }
}

/// Post-collision pause.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Recovery {
    pub remaining: u32,
    pub prior_heading: f64,
}

/// Control state for pattern-driven (AI and remote) tanks.
#[derive(Debug, Clone, PartialEq)]
pub struct Autopilot {
    pub pattern: MovementPattern,
    pub recovery: Option<Recovery>,
    pub personality: Personality,
    /// Current target, re-evaluated every tick.
    pub target: Option<TankId>,
    /// Tick of the last authoritative state sync (remote tanks only).
    pub synced_tick: Option<u64>,
}

impl Autopilot {
    pub fn new(pattern: MovementPattern, personality: Personality) -> Self {
        Self {
            pattern,
            recovery: None,
            personality,
            target: None,
            synced_tick: None,
        }
    }

    pub fn is_recovering(&self) -> bool {
        self.recovery.is_some()
    }
}

/// Per-tank scoreboard counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TankStats {
    pub kills: u32,
    pub deaths: u32,
    pub shots_fired: u32,
}

/// A combat tank: Active (Reloading / ReadyToFire) or Destroyed.
///
/// Invariant: `destroyed` holds exactly when `health == 0`.
#[derive(Debug, Clone, PartialEq)]
pub struct Tank {
    pub id: TankId,
    pub control: ControlVariant,
    pub position: DVec3,
    /// Position when the current (or last) update began; target of rollbacks.
    pub tick_start_position: DVec3,
    pub hull_yaw: f64,
    /// Relative to the hull.
    pub turret_yaw: f64,
    pub barrel_pitch: f64,
    pub health: f64,
    pub destroyed: bool,
    pub reload_remaining: u32,
    pub reload_ticks: u32,
    pub radius: f64,
    /// Whether the last update translated the hull.
    pub moving: bool,
    pub last_attacker: Option<TankId>,
    pub stats: TankStats,
}

impl Tank {
    pub fn new(id: TankId, control: ControlVariant, position: DVec3, tuning: &Tuning) -> Self {
        Self {
            id,
            control,
            position,
            tick_start_position: position,
            hull_yaw: 0.0,
            turret_yaw: 0.0,
            barrel_pitch: 0.0_f64.clamp(tuning.min_elevation, tuning.max_elevation),
            health: MAX_HEALTH,
            destroyed: false,
            reload_remaining: 0,
            reload_ticks: tuning.reload_ticks,
            radius: tuning.tank_radius,
            moving: false,
            last_attacker: None,
            stats: TankStats::default(),
        }
    }

    pub fn control_kind(&self) -> ControlKind {
        self.control.kind()
    }

    pub fn is_primary(&self) -> bool {
        matches!(self.control, ControlVariant::Player(PlayerDrive { primary: true, .. }))
    }

    pub fn autopilot(&self) -> Option<&Autopilot> {
        match &self.control {
            ControlVariant::Remote(a) | ControlVariant::Ai(a) => Some(a),
            ControlVariant::Player(_) => None,
        }
    }

    pub fn autopilot_mut(&mut self) -> Option<&mut Autopilot> {
        match &mut self.control {
            ControlVariant::Remote(a) | ControlVariant::Ai(a) => Some(a),
            ControlVariant::Player(_) => None,
        }
    }

    pub fn fire_state(&self) -> FireState {
        if self.reload_remaining == 0 {
            FireState::ReadyToFire
        } else {
            FireState::Reloading
        }
    }

    pub fn is_ready_to_fire(&self) -> bool {
        !self.destroyed && self.fire_state() == FireState::ReadyToFire
    }

    pub fn advance_reload(&mut self) {
        self.reload_remaining = self.reload_remaining.saturating_sub(1);
    }

    pub fn start_reload(&mut self) {
        self.reload_remaining = self.reload_ticks;
    }

    /// Subtract `amount` from health, clamped at zero.
    ///
    /// Returns `true` only on the tick the tank becomes destroyed. Damage to a
    /// wreck is ignored.
    pub fn take_damage(&mut self, amount: f64) -> bool {
        if self.destroyed {
            return false;
        }
        let amount = if amount.is_finite() { amount.max(0.0) } else { 0.0 };
        self.health = (self.health - amount).max(0.0);
        self.settle_destroyed()
    }

    /// Authoritative health override with the same clamp/transition rule.
    ///
    /// A wreck stays a wreck: only [`Tank::reset_for_respawn`] revives.
    pub fn set_health(&mut self, value: f64) -> bool {
        if !value.is_finite() {
            warn!(tank = %self.id, value, "ignoring non-finite health");
            return false;
        }
        if self.destroyed {
            if value > 0.0 {
                debug!(tank = %self.id, value, "health override on destroyed tank ignored");
            }
            return false;
        }
        self.health = value.clamp(0.0, MAX_HEALTH);
        self.settle_destroyed()
    }

    fn settle_destroyed(&mut self) -> bool {
        debug_assert!((0.0..=MAX_HEALTH).contains(&self.health));
        if self.health > 0.0 || self.destroyed {
            return false;
        }
        self.health = 0.0;
        self.destroyed = true;
        self.moving = false;
        self.tick_start_position = self.position;
        self.stats.deaths += 1;
        if let Some(autopilot) = self.autopilot_mut() {
            autopilot.recovery = None;
            autopilot.target = None;
        }
        info!(tank = %self.id, deaths = self.stats.deaths, "tank destroyed");
        true
    }

    /// Bring the tank back at `position` with full health and a loaded gun.
    pub fn reset_for_respawn(&mut self, position: DVec3) {
        self.health = MAX_HEALTH;
        self.destroyed = false;
        self.position = position;
        self.tick_start_position = position;
        self.turret_yaw = 0.0;
        self.barrel_pitch = 0.0;
        self.reload_remaining = 0;
        self.moving = false;
        self.last_attacker = None;
        match &mut self.control {
            ControlVariant::Player(drive) => {
                drive.speed = 0.0;
                drive.acceleration = 0.0;
            }
            ControlVariant::Remote(autopilot) | ControlVariant::Ai(autopilot) => {
                autopilot.recovery = None;
                autopilot.target = None;
            }
        }
    }

    /// Revert the hull to where it stood when its update began.
    pub fn rollback(&mut self) {
        self.position = self.tick_start_position;
    }

    /// Enter the post-collision pause. No-op for player tanks or while already recovering.
    pub fn begin_recovery(&mut self, ticks: u32) {
        let heading = self.hull_yaw;
        let id = self.id;
        if let Some(autopilot) = self.autopilot_mut() {
            if autopilot.recovery.is_none() && ticks > 0 {
                autopilot.recovery = Some(Recovery {
                    remaining: ticks,
                    prior_heading: heading,
                });
                debug!(tank = %id, ticks, "collision recovery");
            }
        }
    }

    pub fn set_barrel_pitch(&mut self, pitch: f64, tuning: &Tuning) {
        self.barrel_pitch = pitch.clamp(tuning.min_elevation, tuning.max_elevation);
    }

    pub fn forward(&self) -> DVec3 {
        forward_from_yaw(self.hull_yaw)
    }

    /// Hull yaw, then turret yaw, then barrel pitch: applied to a vector
    /// this rotates by pitch first and hull yaw last.
    pub fn barrel_rotation(&self) -> DQuat {
        DQuat::from_rotation_y(self.hull_yaw)
            * DQuat::from_rotation_y(self.turret_yaw)
            * DQuat::from_rotation_x(-self.barrel_pitch)
    }

    /// Unit vector along the barrel.
    pub fn fire_direction(&self) -> DVec3 {
        (self.barrel_rotation() * DVec3::Z).normalize()
    }

    /// World position of the muzzle.
    pub fn muzzle_position(&self, tuning: &Tuning) -> DVec3 {
        let pivot = self.position + DVec3::Y * tuning.turret_height;
        pivot + self.barrel_rotation() * DVec3::new(0.0, 0.0, tuning.barrel_length)
    }
}

impl Collidable for Tank {
    fn collider_shape(&self) -> ColliderShape {
        ColliderShape::Sphere { radius: self.radius }
    }

    fn position(&self) -> DVec3 {
        self.position
    }

    fn kind(&self) -> ColliderKind {
        ColliderKind::Tank
    }
}

// ---- Shell ----

/// A projectile in flight.
#[derive(Debug, Clone, PartialEq)]
pub struct Shell {
    pub id: ShellId,
    /// Identity of the firing tank; used only to skip self-collision.
    pub owner: Option<TankId>,
    pub position: DVec3,
    pub velocity: DVec3,
    pub radius: f64,
    pub gravity: f64,
    /// Ticks integrated so far.
    pub age: u32,
    pub lifetime: u32,
    pub alive: bool,
    /// Set once the shell has reacted to a collision.
    pub resolved: bool,
}

impl Shell {
    /// Launch along `direction` (normalized here) at `speed`.
    pub fn new(
        id: ShellId,
        owner: Option<TankId>,
        origin: DVec3,
        direction: DVec3,
        speed: f64,
        tuning: &Tuning,
    ) -> Self {
        Self {
            id,
            owner,
            position: origin,
            velocity: direction.normalize_or_zero() * speed,
            radius: tuning.shell_radius,
            gravity: tuning.gravity,
            age: 0,
            lifetime: tuning.shell_lifetime_ticks,
            alive: true,
            resolved: false,
        }
    }

    /// Alive and not yet resolved: eligible for collision tests.
    pub fn is_active(&self) -> bool {
        self.alive && !self.resolved
    }

    /// Advance one tick of flight. Returns whether the shell is still alive.
    ///
    /// The destruction transition and its impact event happen once; later
    /// calls leave the shell untouched and keep returning `false`.
    pub fn update(&mut self, events: &mut Vec<GameEvent>) -> bool {
        if !self.alive {
            return false;
        }

        self.position += self.velocity;
        self.velocity.y -= self.gravity;
        self.age += 1;

        let cause = if self.position.y < GROUND_LEVEL {
            self.position.y = GROUND_LEVEL;
            Some(ImpactCause::Ground)
        } else if self.age > self.lifetime {
            Some(ImpactCause::Expired)
        } else {
            None
        };

        match cause {
            Some(cause) => {
                self.alive = false;
                events.push(GameEvent::ShellImpact {
                    shell: self.id,
                    owner: self.owner,
                    position: self.position,
                    cause,
                    tank: None,
                });
                false
            }
            None => true,
        }
    }

    /// React to an overlap. Returns `true` if the shell resolved on it.
    pub fn on_collision(
        &mut self,
        other_kind: ColliderKind,
        other_tank: Option<TankId>,
        events: &mut Vec<GameEvent>,
    ) -> bool {
        if !self.is_active() {
            return false;
        }
        if let (Some(owner), Some(other)) = (self.owner, other_tank) {
            if owner == other {
                return false;
            }
        }

        let cause = match other_kind {
            ColliderKind::Tank => ImpactCause::Tank,
            ColliderKind::Obstacle(_) | ColliderKind::Shell => ImpactCause::Obstacle,
        };
        self.resolved = true;
        self.alive = false;
        events.push(GameEvent::ShellImpact {
            shell: self.id,
            owner: self.owner,
            position: self.position,
            cause,
            tank: other_tank,
        });
        true
    }
}

impl Collidable for Shell {
    fn collider_shape(&self) -> ColliderShape {
        ColliderShape::Sphere { radius: self.radius }
    }

    fn position(&self) -> DVec3 {
        self.position
    }

    fn kind(&self) -> ColliderKind {
        ColliderKind::Shell
    }
}

// ---- Static obstacles ----

/// Immutable scenery supplied at level load.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub kind: ObstacleKind,
    pub position: DVec3,
    pub shape: ColliderShape,
}

impl Obstacle {
    /// Tree trunk collider, scaled with the tree.
    pub fn tree(position: DVec3, scale: f64) -> Self {
        Self {
            kind: ObstacleKind::Tree,
            position,
            shape: ColliderShape::Sphere {
                radius: scale.abs(),
            },
        }
    }

    /// Boulder collider, slightly larger than the rock's nominal size.
    pub fn rock(position: DVec3, size: f64) -> Self {
        Self {
            kind: ObstacleKind::Rock,
            position,
            shape: ColliderShape::Sphere {
                radius: size.abs() * 1.2,
            },
        }
    }

    pub fn building(position: DVec3, half_extents: DVec3) -> Self {
        Self {
            kind: ObstacleKind::Building,
            position,
            shape: ColliderShape::Box { half_extents },
        }
    }
}

impl Collidable for Obstacle {
    fn collider_shape(&self) -> ColliderShape {
        self.shape
    }

    fn position(&self) -> DVec3 {
        self.position
    }

    fn kind(&self) -> ColliderKind {
        ColliderKind::Obstacle(self.kind)
    }
}
