//! Collision system: collider registry, tiered pair tests and reactions.
//!
//! Each tick the registered entities are flattened into `ColliderEntry`
//! records holding their tick-start positions. Pairs are tested in a fixed
//! order (shell×tank, shell×static, tank×tank on even ticks, tank×static for
//! moving tanks) and every colliding pair dispatches a reaction on both sides.
//! Physical contact only reacts when the pair sits deeper than it did at the
//! start of the last tank update, so overlapping tanks can always back apart.

use glam::DVec3;
use hecs::{Entity, World};
use tracing::{debug, info, warn};

use tankfire_core::components::{Obstacle, Shell, Tank};
use tankfire_core::config::Tuning;
use tankfire_core::constants::{LOS_SAMPLE_STEP, MAX_HEALTH};
use tankfire_core::enums::{ColliderKind, HitLocation};
use tankfire_core::events::GameEvent;
use tankfire_core::shapes::{
    penetration_depth, shape_contains, shapes_overlap, Collidable, ColliderShape,
};
use tankfire_core::types::TankId;

/// Depth changes below this are float noise, not motion.
const DEPTH_EPSILON: f64 = 1e-9;

/// Flattened view of one collidable as it stood when the entry was built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColliderEntry {
    pub entity: Entity,
    pub kind: ColliderKind,
    pub shape: ColliderShape,
    pub position: DVec3,
    /// Where the last tank update began; `position` for everything else.
    pub tick_start: DVec3,
    /// Identity of the tank, for tank entries.
    pub tank: Option<TankId>,
    /// Firing tank, for shell entries.
    pub owner: Option<TankId>,
    pub moving: bool,
    pub destroyed: bool,
    pub health: f64,
    /// False for shells that are dead or already resolved.
    pub active: bool,
}

impl ColliderEntry {
    fn from_collidable<C: Collidable>(entity: Entity, collidable: &C) -> Self {
        Self {
            entity,
            kind: collidable.kind(),
            shape: collidable.collider_shape(),
            position: collidable.position(),
            tick_start: collidable.position(),
            tank: None,
            owner: None,
            moving: false,
            destroyed: false,
            health: 0.0,
            active: true,
        }
    }

    pub fn from_tank(entity: Entity, tank: &Tank) -> Self {
        Self {
            tank: Some(tank.id),
            tick_start: tank.tick_start_position,
            moving: tank.moving,
            destroyed: tank.destroyed,
            health: tank.health,
            ..Self::from_collidable(entity, tank)
        }
    }

    pub fn from_shell(entity: Entity, shell: &Shell) -> Self {
        Self {
            owner: shell.owner,
            active: shell.is_active(),
            ..Self::from_collidable(entity, shell)
        }
    }

    pub fn from_obstacle(entity: Entity, obstacle: &Obstacle) -> Self {
        Self::from_collidable(entity, obstacle)
    }

    pub fn is_tank(&self) -> bool {
        self.kind == ColliderKind::Tank
    }

    pub fn is_shell(&self) -> bool {
        self.kind == ColliderKind::Shell
    }

    pub fn is_static(&self) -> bool {
        self.kind.is_static()
    }

    pub fn overlaps(&self, other: &ColliderEntry) -> bool {
        shapes_overlap(&self.shape, self.position, &other.shape, other.position)
    }

    pub fn contains(&self, point: DVec3) -> bool {
        shape_contains(&self.shape, self.position, point)
    }

    /// Whether the last update translated this entry.
    pub fn moved(&self) -> bool {
        self.position != self.tick_start
    }

    /// Whether the pair interpenetrates more now than at tick start.
    pub fn deepened(&self, other: &ColliderEntry) -> bool {
        let now = penetration_depth(&self.shape, self.position, &other.shape, other.position);
        let before = penetration_depth(&self.shape, self.tick_start, &other.shape, other.tick_start);
        now > before + DEPTH_EPSILON
    }
}

/// Build the entry for whichever collidable component `entity` carries.
pub fn read_collider(world: &World, entity: Entity) -> Option<ColliderEntry> {
    if let Ok(tank) = world.get::<&Tank>(entity) {
        return Some(ColliderEntry::from_tank(entity, &tank));
    }
    if let Ok(shell) = world.get::<&Shell>(entity) {
        return Some(ColliderEntry::from_shell(entity, &shell));
    }
    if let Ok(obstacle) = world.get::<&Obstacle>(entity) {
        return Some(ColliderEntry::from_obstacle(entity, &obstacle));
    }
    None
}

/// Pairs that are never tested, whatever their shapes.
pub fn is_excluded(a: &ColliderEntry, b: &ColliderEntry) -> bool {
    if a.entity == b.entity || (a.is_static() && b.is_static()) {
        return true;
    }
    let owns = |shell: &ColliderEntry, other: &ColliderEntry| {
        shell.is_shell() && shell.owner.is_some() && shell.owner == other.tank
    };
    owns(a, b) || owns(b, a)
}

/// Walk the segment in fixed steps; blocked if any sample is inside a static obstacle.
pub fn line_of_sight(entries: &[ColliderEntry], from: DVec3, to: DVec3) -> bool {
    let distance = from.distance(to);
    if !distance.is_finite() {
        return false;
    }
    let steps = (distance / LOS_SAMPLE_STEP).ceil() as usize;
    for i in 1..steps {
        let point = from.lerp(to, i as f64 / steps as f64);
        if entries.iter().any(|e| e.is_static() && e.contains(point)) {
            return false;
        }
    }
    true
}

/// Mutable context for reactions.
pub struct CollisionContext<'a> {
    pub tuning: &'a Tuning,
    pub events: &'a mut Vec<GameEvent>,
}

/// Registry of collidable entities plus the cached active set.
#[derive(Debug)]
pub struct CollisionSystem {
    registry: Vec<Entity>,
    active: Vec<Entity>,
    dirty: bool,
    tick: u64,
    last_reactions: usize,
}

impl Default for CollisionSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl CollisionSystem {
    pub fn new() -> Self {
        Self {
            registry: Vec::new(),
            active: Vec::new(),
            dirty: true,
            tick: 0,
            last_reactions: 0,
        }
    }

    pub fn add_collider(&mut self, entity: Entity) {
        if !self.registry.contains(&entity) {
            self.registry.push(entity);
            self.dirty = true;
        }
    }

    /// Returns whether the entity was registered.
    pub fn remove_collider(&mut self, entity: Entity) -> bool {
        let before = self.registry.len();
        self.registry.retain(|e| *e != entity);
        let removed = self.registry.len() != before;
        if removed {
            self.dirty = true;
        }
        removed
    }

    /// Registered entities in registration order.
    pub fn colliders(&self) -> &[Entity] {
        &self.registry
    }

    /// Detection ticks run so far; the next `check_collisions` runs tick `tick()`.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Number of colliding pairs that reacted during the last tick.
    pub fn last_reaction_count(&self) -> usize {
        self.last_reactions
    }

    /// Entries for every registered entity still present in `world`.
    pub fn entries(&self, world: &World) -> Vec<ColliderEntry> {
        self.registry
            .iter()
            .filter_map(|&entity| read_collider(world, entity))
            .collect()
    }

    /// Run one tick of detection and dispatch reactions.
    pub fn check_collisions(&mut self, world: &mut World, ctx: &mut CollisionContext) {
        let tick = self.tick;
        self.tick += 1;

        if self.dirty {
            self.active.clear();
            self.active.extend_from_slice(&self.registry);
            self.dirty = false;
        }

        let mut shells = Vec::new();
        let mut tanks = Vec::new();
        let mut statics = Vec::new();
        for &entity in &self.active {
            match read_collider(world, entity) {
                Some(entry) if entry.is_shell() => {
                    if entry.active {
                        shells.push(entry);
                    }
                }
                Some(entry) if entry.is_tank() => tanks.push(entry),
                Some(entry) => statics.push(entry),
                None => self.dirty = true,
            }
        }

        let mut reactions = 0;
        let mut resolved = vec![false; shells.len()];

        // 1. Shell × tank: never skipped.
        for (i, shell) in shells.iter().enumerate() {
            for tank in &tanks {
                if is_excluded(shell, tank) || !shell.overlaps(tank) {
                    continue;
                }
                if react_pair(world, shell, tank, ctx) {
                    reactions += 1;
                    resolved[i] = true;
                    break;
                }
            }
        }

        // 2. Shell × static, for shells still in flight.
        for (i, shell) in shells.iter().enumerate() {
            if resolved[i] {
                continue;
            }
            for obstacle in &statics {
                if is_excluded(shell, obstacle) || !shell.overlaps(obstacle) {
                    continue;
                }
                if react_pair(world, shell, obstacle, ctx) {
                    reactions += 1;
                    resolved[i] = true;
                    break;
                }
            }
        }

        if !shells.is_empty() {
            self.dirty = true;
        }

        // 3. Tank × tank, even ticks only.
        if tick % 2 == 0 {
            for (i, a) in tanks.iter().enumerate() {
                for b in &tanks[i + 1..] {
                    if !is_excluded(a, b) && a.overlaps(b) && react_pair(world, a, b, ctx) {
                        reactions += 1;
                    }
                }
            }
        }

        // 4. Tank × static, moving tanks only.
        for tank in tanks.iter().filter(|t| t.moving) {
            for obstacle in &statics {
                if !is_excluded(tank, obstacle)
                    && tank.overlaps(obstacle)
                    && react_pair(world, tank, obstacle, ctx)
                {
                    reactions += 1;
                    break;
                }
            }
        }

        self.last_reactions = reactions;
    }

    /// First registered collider whose shape contains `point`.
    pub fn check_point_collision(
        &self,
        world: &World,
        point: DVec3,
        exclude: Option<Entity>,
    ) -> Option<Entity> {
        self.registry
            .iter()
            .filter(|&&entity| Some(entity) != exclude)
            .filter_map(|&entity| read_collider(world, entity))
            .find(|entry| entry.active && entry.contains(point))
            .map(|entry| entry.entity)
    }

    /// Whether no static obstacle blocks the segment from `from` to `to`.
    pub fn has_line_of_sight(&self, world: &World, from: DVec3, to: DVec3) -> bool {
        let statics: Vec<ColliderEntry> = self
            .entries(world)
            .into_iter()
            .filter(|e| e.is_static())
            .collect();
        line_of_sight(&statics, from, to)
    }
}

/// Dispatch reactions for both members of a colliding pair.
///
/// Returns whether anything reacted. A shell that declines (owner, already
/// resolved) leaves the other side untouched.
fn react_pair(world: &mut World, a: &ColliderEntry, b: &ColliderEntry, ctx: &mut CollisionContext) -> bool {
    match (a.is_shell(), b.is_shell()) {
        (true, false) => shell_strike(world, a, b, ctx),
        (false, true) => shell_strike(world, b, a, ctx),
        (true, true) => false,
        (false, false) => {
            if !a.deepened(b) {
                return false;
            }
            let bumped_a = bump(world, a, b, ctx.tuning);
            let bumped_b = bump(world, b, a, ctx.tuning);
            bumped_a || bumped_b
        }
    }
}

fn shell_strike(
    world: &mut World,
    shell: &ColliderEntry,
    other: &ColliderEntry,
    ctx: &mut CollisionContext,
) -> bool {
    let resolved = match world.get::<&mut Shell>(shell.entity) {
        Ok(mut component) => component.on_collision(other.kind, other.tank, ctx.events),
        Err(_) => false,
    };
    if resolved && other.is_tank() {
        apply_hit(world, other.entity, shell, ctx);
    }
    resolved
}

/// Damage a live tank struck by `shell`, scaled by where it hit.
fn apply_hit(world: &mut World, entity: Entity, shell: &ColliderEntry, ctx: &mut CollisionContext) {
    let mut tank = match world.get::<&mut Tank>(entity) {
        Ok(tank) => tank,
        Err(_) => return,
    };
    if tank.destroyed {
        return;
    }

    let location = HitLocation::from_height(shell.position.y - tank.position.y);
    let amount = (ctx.tuning.base_damage * location.multiplier()).min(ctx.tuning.max_damage_per_hit);
    tank.last_attacker = shell.owner;
    let destroyed_now = tank.take_damage(amount);

    if !(0.0..=MAX_HEALTH).contains(&tank.health) {
        warn!(tank = %tank.id, health = tank.health, "health out of range after hit");
    }
    debug_assert!((0.0..=MAX_HEALTH).contains(&tank.health));

    debug!(victim = %tank.id, source = ?shell.owner, amount, ?location, health = tank.health, "tank hit");
    ctx.events.push(GameEvent::TankHit {
        victim: tank.id,
        source: shell.owner,
        amount,
        location,
    });
    if destroyed_now {
        info!(victim = %tank.id, source = ?shell.owner, "tank killed");
        ctx.events.push(GameEvent::TankDestroyed {
            victim: tank.id,
            source: shell.owner,
        });
    }
}

/// Physical contact with a non-shell: roll the tank back to where its last
/// update started. Autopilots also pause to recover.
///
/// Only a live tank that moved into the contact reacts; wrecks and tanks
/// that were hit while standing still stay put.
fn bump(world: &mut World, this: &ColliderEntry, other: &ColliderEntry, tuning: &Tuning) -> bool {
    if !this.is_tank() || other.is_shell() || !this.moved() {
        return false;
    }
    match world.get::<&mut Tank>(this.entity) {
        Ok(mut tank) => {
            if tank.destroyed {
                return false;
            }
            tank.rollback();
            tank.begin_recovery(tuning.recovery_ticks);
            debug!(tank = %tank.id, other = ?other.kind, "collision rollback");
            true
        }
        Err(_) => false,
    }
}
