//! Simulation engine for TANKFIRE.
//!
//! Owns the hecs ECS world, runs collision, tank and shell systems once per
//! tick, and produces `SimSnapshot`s for the host.

pub mod collision;
pub mod engine;
pub mod ledger;
pub mod scheduler;
pub mod systems;
pub mod tank;
pub mod world_setup;

pub use engine::{SimConfig, SimError, SimulationEngine, TankSpawn};
pub use tankfire_core as core;
