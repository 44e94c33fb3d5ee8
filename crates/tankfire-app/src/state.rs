//! State shared between the host and the game loop thread.

use std::sync::{Arc, Mutex};

use tankfire_core::commands::PlayerCommand;
use tankfire_core::state::SimSnapshot;

/// Commands sent from the host to the game loop thread.
#[derive(Debug)]
pub enum GameLoopCommand {
    /// A player command to forward to the simulation engine.
    PlayerCommand(PlayerCommand),
    /// Shut down the game loop thread gracefully.
    Shutdown,
}

/// Latest snapshot, written by the loop after each tick.
pub type LatestSnapshot = Arc<Mutex<Option<SimSnapshot>>>;

/// Totals the loop reports when it stops.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoopSummary {
    pub ticks: u64,
    pub shells_fired: u64,
    pub hits: u64,
    pub tanks_destroyed: u64,
    pub respawns: u64,
}
