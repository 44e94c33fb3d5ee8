//! Simulation engine.
//!
//! `SimulationEngine` owns the hecs ECS world, the collision registry, the
//! scheduler and fire ledger. It processes queued commands, runs the systems
//! in a fixed order and produces `SimSnapshot`s. Same seed, same commands,
//! same snapshots.

use std::collections::{HashMap, VecDeque};
use std::path::Path;

use glam::DVec3;
use hecs::{Entity, World};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use tankfire_ai::patterns::make_pattern;
use tankfire_ai::profiles::roll_personality;
use tankfire_ai::targeting::normalize_angle;
use tankfire_core::commands::{ControlInput, PlayerCommand, ReplicatedState};
use tankfire_core::components::{
    Autopilot, ControlVariant, MovementPattern, Obstacle, Personality, PlayerDrive, Tank,
};
use tankfire_core::config::{ConfigError, Tuning};
use tankfire_core::enums::{ControlKind, PatternKind};
use tankfire_core::events::GameEvent;
use tankfire_core::state::{SimSnapshot, TankView};
use tankfire_core::types::{SimTime, TankId};

use crate::collision::{CollisionContext, CollisionSystem};
use crate::ledger::FireLedger;
use crate::scheduler::{ScheduledAction, Scheduler};
use crate::systems;
use crate::tank::{self, TankContext};
use crate::world_setup;

/// Difficulty used when a spawn does not supply a personality.
pub const DEFAULT_DIFFICULTY: f64 = 0.5;

/// Configuration for starting a new simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// RNG seed for determinism. Same seed = same simulation.
    pub seed: u64,
    pub tuning: Tuning,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            tuning: Tuning::default(),
        }
    }
}

impl SimConfig {
    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.tuning.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error("unknown tank {0}")]
    UnknownTank(TankId),
    #[error("{0} is not a remote tank")]
    NotRemote(TankId),
}

/// Everything needed to put a new tank in the world.
#[derive(Debug, Clone, PartialEq)]
pub struct TankSpawn {
    pub control: ControlKind,
    /// Only meaningful for player tanks.
    pub primary: bool,
    /// `None` picks the variant's default spawn.
    pub position: Option<DVec3>,
    pub hull_yaw: f64,
    /// `None` picks a random pattern for autopilot tanks.
    pub pattern: Option<PatternKind>,
    /// Explicit patrol route; overrides the generated square.
    pub waypoints: Option<Vec<DVec3>>,
    /// `None` rolls one around `DEFAULT_DIFFICULTY`.
    pub personality: Option<Personality>,
}

impl TankSpawn {
    pub fn player(primary: bool, position: Option<DVec3>) -> Self {
        Self {
            control: ControlKind::Player,
            primary,
            position,
            hull_yaw: 0.0,
            pattern: None,
            waypoints: None,
            personality: None,
        }
    }

    pub fn ai(position: Option<DVec3>, pattern: Option<PatternKind>) -> Self {
        Self {
            control: ControlKind::Ai,
            primary: false,
            pattern,
            ..Self::player(false, position)
        }
    }

    pub fn remote(position: Option<DVec3>) -> Self {
        Self {
            control: ControlKind::Remote,
            primary: false,
            ..Self::player(false, position)
        }
    }

    pub fn with_hull_yaw(mut self, hull_yaw: f64) -> Self {
        self.hull_yaw = hull_yaw;
        self
    }

    pub fn with_personality(mut self, personality: Personality) -> Self {
        self.personality = Some(personality);
        self
    }

    pub fn with_waypoints(mut self, waypoints: Vec<DVec3>) -> Self {
        self.pattern = Some(PatternKind::Patrol);
        self.waypoints = Some(waypoints);
        self
    }
}

/// The simulation engine. Owns the ECS world and all sim state.
pub struct SimulationEngine {
    world: World,
    time: SimTime,
    paused: bool,
    tuning: Tuning,
    rng: ChaCha8Rng,
    collision: CollisionSystem,
    scheduler: Scheduler,
    ledger: FireLedger,
    tanks: HashMap<TankId, Entity>,
    next_tank_id: u32,
    command_queue: VecDeque<PlayerCommand>,
    despawn_buffer: Vec<Entity>,
    events: Vec<GameEvent>,
}

impl SimulationEngine {
    pub fn new(config: SimConfig) -> Self {
        let tuning = match config.tuning.validate() {
            Ok(()) => config.tuning,
            Err(err) => {
                warn!(%err, "invalid tuning, using defaults");
                Tuning::default()
            }
        };
        Self {
            world: World::new(),
            time: SimTime::default(),
            paused: false,
            ledger: FireLedger::new(tuning.fire_dedup_ticks),
            tuning,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            collision: CollisionSystem::new(),
            scheduler: Scheduler::new(),
            tanks: HashMap::new(),
            next_tank_id: 0,
            command_queue: VecDeque::new(),
            despawn_buffer: Vec::new(),
            events: Vec::new(),
        }
    }

    // --- World construction ---

    /// Spawn a tank and register it for collisions.
    pub fn spawn_tank(&mut self, spawn: TankSpawn) -> TankId {
        self.next_tank_id += 1;
        let id = TankId(self.next_tank_id);
        let tick = self.time.tick;

        let control = match spawn.control {
            ControlKind::Player => ControlVariant::Player(PlayerDrive {
                primary: spawn.primary,
                ..PlayerDrive::default()
            }),
            ControlKind::Remote | ControlKind::Ai => {
                let personality = spawn
                    .personality
                    .unwrap_or_else(|| roll_personality(DEFAULT_DIFFICULTY, &mut self.rng));
                // Placeholder until the spawn point is known.
                let autopilot = Autopilot::new(MovementPattern::Circle { turn_rate: 0.0 }, personality);
                if spawn.control == ControlKind::Ai {
                    ControlVariant::Ai(autopilot)
                } else {
                    ControlVariant::Remote(autopilot)
                }
            }
        };

        let mut tank = Tank::new(id, control, DVec3::ZERO, &self.tuning);
        let position = match spawn.position {
            Some(p) if p.is_finite() => p,
            _ => tank::default_spawn_position(&tank, &self.tuning, &mut self.rng),
        };
        tank.position = position;
        tank.tick_start_position = position;
        tank.hull_yaw = normalize_angle(spawn.hull_yaw);

        if tank.autopilot().is_some() {
            let kind = spawn
                .pattern
                .or_else(|| PatternKind::ALL.choose(&mut self.rng).copied())
                .unwrap_or_default();
            let pattern = match (kind, spawn.waypoints) {
                (PatternKind::Patrol, Some(waypoints)) => MovementPattern::Patrol { waypoints, index: 0 },
                (kind, _) => make_pattern(kind, position, tick, &mut self.rng),
            };
            if let Some(autopilot) = tank.autopilot_mut() {
                autopilot.pattern = pattern;
            }
        }

        let control = tank.control_kind();
        let entity = self.world.spawn((tank, ControlInput::default()));
        self.collision.add_collider(entity);
        self.tanks.insert(id, entity);
        info!(tank = %id, ?control, x = position.x, z = position.z, "tank spawned");
        id
    }

    pub fn add_obstacle(&mut self, obstacle: Obstacle) -> Entity {
        let entity = self.world.spawn((obstacle,));
        self.collision.add_collider(entity);
        entity
    }

    pub fn add_obstacles(&mut self, obstacles: impl IntoIterator<Item = Obstacle>) -> Vec<Entity> {
        obstacles.into_iter().map(|o| self.add_obstacle(o)).collect()
    }

    /// Populate an arena: `obstacles` (or the built-in layout), the primary
    /// player at the origin and `ai_tanks` autopilots on the spawn ring.
    pub fn setup_arena(&mut self, obstacles: Option<Vec<Obstacle>>, ai_tanks: usize) -> TankId {
        self.add_obstacles(obstacles.unwrap_or_else(world_setup::default_layout));
        let player = self.spawn_tank(TankSpawn::player(true, Some(DVec3::ZERO)));
        for _ in 0..ai_tanks {
            self.spawn_tank(TankSpawn::ai(None, None));
        }
        info!(ai_tanks, obstacles = self.collision.colliders().len(), "arena ready");
        player
    }

    // --- Commands ---

    /// Queue a player command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: PlayerCommand) {
        self.command_queue.push_back(command);
    }

    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = PlayerCommand>) {
        self.command_queue.extend(commands);
    }

    // --- Tick ---

    /// Advance the simulation by one tick and return the resulting snapshot.
    pub fn tick(&mut self) -> SimSnapshot {
        if !self.paused {
            self.run_scheduled();
        }
        self.process_commands();

        if !self.paused {
            self.run_systems();
            self.time.advance();
        }

        let events = std::mem::take(&mut self.events);
        systems::snapshot::build_snapshot(&self.world, &self.time, self.paused, events)
    }

    // --- Accessors ---

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Get a read-only reference to the ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn collision(&self) -> &CollisionSystem {
        &self.collision
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn tank_entity(&self, id: TankId) -> Option<Entity> {
        self.tanks.get(&id).copied()
    }

    pub fn tank(&self, id: TankId) -> Option<TankView> {
        let entity = self.tank_entity(id)?;
        let tank = self.world.get::<&Tank>(entity).ok()?;
        Some(systems::snapshot::tank_view(&tank))
    }

    pub fn tank_ids(&self) -> Vec<TankId> {
        let mut ids: Vec<TankId> = self.tanks.keys().copied().collect();
        ids.sort();
        ids
    }

    // --- Host operations ---

    /// Revive a tank at `position`, or at its default spawn.
    pub fn respawn_tank(&mut self, id: TankId, position: Option<DVec3>) -> Result<DVec3, SimError> {
        let entity = self.tank_entity(id).ok_or(SimError::UnknownTank(id))?;
        let mut tank = self
            .world
            .get::<&mut Tank>(entity)
            .map_err(|_| SimError::UnknownTank(id))?;
        let position = tank::respawn(&mut tank, position, &self.tuning, &mut self.rng);
        drop(tank);

        self.scheduler.cancel_for(id);
        self.ledger.forget(id);
        self.events.push(GameEvent::TankRespawned { tank: id, position });
        Ok(position)
    }

    /// Authoritative health override. Returns whether the tank was destroyed by it.
    pub fn set_tank_health(&mut self, id: TankId, health: f64) -> Result<bool, SimError> {
        let entity = self.tank_entity(id).ok_or(SimError::UnknownTank(id))?;
        let destroyed = self
            .world
            .get::<&mut Tank>(entity)
            .map_err(|_| SimError::UnknownTank(id))?
            .set_health(health);
        if destroyed {
            self.on_destroyed(id, None);
        }
        Ok(destroyed)
    }

    /// Apply replicated pose and health to a remote tank. It skips its own
    /// movement pattern for the rest of this tick.
    pub fn replicate_state(&mut self, id: TankId, state: ReplicatedState) -> Result<(), SimError> {
        let entity = self.tank_entity(id).ok_or(SimError::UnknownTank(id))?;
        let tick = self.time.tick;
        let destroyed = {
            let mut tank = self
                .world
                .get::<&mut Tank>(entity)
                .map_err(|_| SimError::UnknownTank(id))?;
            if tank.control_kind() != ControlKind::Remote {
                return Err(SimError::NotRemote(id));
            }
            if state.position.is_finite() {
                tank.position = state.position;
                tank.tick_start_position = state.position;
            }
            tank.hull_yaw = normalize_angle(state.hull_yaw);
            tank.turret_yaw = normalize_angle(state.turret_yaw);
            let pitch = if state.barrel_pitch.is_finite() { state.barrel_pitch } else { 0.0 };
            tank.set_barrel_pitch(pitch, &self.tuning);
            if let Some(autopilot) = tank.autopilot_mut() {
                autopilot.synced_tick = Some(tick);
            }
            tank.set_health(state.health)
        };
        if destroyed {
            self.on_destroyed(id, None);
        }
        Ok(())
    }

    /// Despawn a tank and drop it from the registry, index and scheduler.
    pub fn remove_tank(&mut self, id: TankId) -> Result<(), SimError> {
        let entity = self.tanks.remove(&id).ok_or(SimError::UnknownTank(id))?;
        self.collision.remove_collider(entity);
        self.scheduler.cancel_for(id);
        self.ledger.forget(id);
        let _ = self.world.despawn(entity);
        info!(tank = %id, "tank removed");
        Ok(())
    }

    fn on_destroyed(&mut self, victim: TankId, source: Option<TankId>) {
        self.events.push(GameEvent::TankDestroyed { victim, source });
        systems::combat::settle_kill(
            &mut self.world,
            &self.tanks,
            victim,
            source,
            &mut self.scheduler,
            self.time.tick,
            self.tuning.respawn_delay_ticks,
        );
    }

    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
        }
    }

    fn handle_command(&mut self, command: PlayerCommand) {
        let result = match command {
            PlayerCommand::SetInput { tank, input } => self.set_input(tank, input),
            PlayerCommand::Respawn { tank, position } => self.respawn_tank(tank, position).map(|_| ()),
            PlayerCommand::SetHealth { tank, health } => self.set_tank_health(tank, health).map(|_| ()),
            PlayerCommand::ReplicateState { tank, state } => self.replicate_state(tank, state),
            PlayerCommand::Pause => {
                self.paused = true;
                Ok(())
            }
            PlayerCommand::Resume => {
                self.paused = false;
                Ok(())
            }
        };
        if let Err(err) = result {
            warn!(%err, "command rejected");
        }
    }

    fn set_input(&mut self, id: TankId, input: ControlInput) -> Result<(), SimError> {
        let entity = self.tank_entity(id).ok_or(SimError::UnknownTank(id))?;
        let mut held = self
            .world
            .get::<&mut ControlInput>(entity)
            .map_err(|_| SimError::UnknownTank(id))?;
        *held = input;
        Ok(())
    }

    /// Run respawns that fell due. They never belong to the tick that booked them.
    fn run_scheduled(&mut self) {
        for action in self.scheduler.take_due(self.time.tick) {
            match action {
                ScheduledAction::Respawn(id) => {
                    if let Err(err) = self.respawn_tank(id, None) {
                        debug!(%err, "scheduled respawn skipped");
                    }
                }
            }
        }
    }

    /// Run all systems in order.
    fn run_systems(&mut self) {
        let first_new_event = self.events.len();

        // 1. Collision detection and reactions (tick-start positions)
        self.collision.check_collisions(
            &mut self.world,
            &mut CollisionContext {
                tuning: &self.tuning,
                events: &mut self.events,
            },
        );
        // 2. Kill credit and respawn booking for tanks destroyed by hits
        systems::combat::run(
            &mut self.world,
            &self.tanks,
            &self.events[first_new_event..],
            &mut self.scheduler,
            self.time.tick,
            self.tuning.respawn_delay_ticks,
        );
        // 3. Tanks: drive, aim, fire
        systems::tanks::run(
            &mut self.world,
            &mut self.collision,
            &mut TankContext {
                tuning: &self.tuning,
                rng: &mut self.rng,
                ledger: &mut self.ledger,
                tick: self.time.tick,
            },
            &mut self.events,
        );
        // 4. Shells: flight, expiry, despawn
        systems::shells::run(
            &mut self.world,
            &mut self.collision,
            &mut self.events,
            &mut self.despawn_buffer,
        );
    }
}
