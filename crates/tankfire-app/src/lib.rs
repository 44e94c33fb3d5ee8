//! TANKFIRE headless host.
//!
//! Wires the simulation crates to a fixed-rate game loop thread fed by an
//! mpsc command channel, with settings taken from the environment.

pub mod config;
pub mod game_loop;
pub mod state;

pub use tankfire_core as core;
