//! Game loop thread: runs the simulation engine at the tick rate.
//!
//! The engine moves into the thread, which owns it from then on. Commands
//! arrive via an `mpsc` channel; each tick's snapshot is stored in shared
//! state for polling and its events are logged and tallied.

use std::io;
use std::sync::mpsc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use tankfire_core::constants::TICK_RATE;
use tankfire_core::events::GameEvent;
use tankfire_core::state::SimSnapshot;
use tankfire_sim::SimulationEngine;

use crate::state::{GameLoopCommand, LatestSnapshot, LoopSummary};

/// Nominal duration of one tick.
pub const TICK_DURATION: Duration = Duration::from_nanos(1_000_000_000 / TICK_RATE as u64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopOptions {
    /// Stop after this many ticks; 0 runs until shutdown or disconnect.
    pub max_ticks: u64,
    /// Sleep between ticks to hold the tick rate.
    pub realtime: bool,
}

/// Spawns the game loop in a new thread.
///
/// Returns the command sender and a handle that yields the run's totals.
pub fn spawn_game_loop(
    engine: SimulationEngine,
    options: LoopOptions,
    latest_snapshot: LatestSnapshot,
) -> io::Result<(mpsc::Sender<GameLoopCommand>, JoinHandle<LoopSummary>)> {
    let (cmd_tx, cmd_rx) = mpsc::channel::<GameLoopCommand>();

    let handle = std::thread::Builder::new()
        .name("tankfire-game-loop".into())
        .spawn(move || run_game_loop(engine, cmd_rx, options, &latest_snapshot))?;

    Ok((cmd_tx, handle))
}

/// The game loop. Runs until Shutdown, channel disconnect, or the tick limit.
pub fn run_game_loop(
    mut engine: SimulationEngine,
    cmd_rx: mpsc::Receiver<GameLoopCommand>,
    options: LoopOptions,
    latest_snapshot: &std::sync::Mutex<Option<SimSnapshot>>,
) -> LoopSummary {
    let mut summary = LoopSummary::default();
    let mut next_tick_time = Instant::now();

    loop {
        // 1. Drain all pending commands
        loop {
            match cmd_rx.try_recv() {
                Ok(GameLoopCommand::PlayerCommand(cmd)) => engine.queue_command(cmd),
                Ok(GameLoopCommand::Shutdown) => {
                    info!(ticks = summary.ticks, "game loop shutdown");
                    return summary;
                }
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    // A headless run with a tick limit does not need a live host.
                    if options.max_ticks == 0 {
                        info!(ticks = summary.ticks, "command channel closed");
                        return summary;
                    }
                    break;
                }
            }
        }

        // 2. Advance one tick (engine handles pause internally)
        let snapshot = engine.tick();
        summary.ticks += 1;
        tally(&mut summary, &snapshot.events);

        // 3. Store latest snapshot for polling
        if let Ok(mut lock) = latest_snapshot.lock() {
            *lock = Some(snapshot);
        }

        if options.max_ticks > 0 && summary.ticks >= options.max_ticks {
            info!(ticks = summary.ticks, "tick limit reached");
            return summary;
        }

        // 4. Sleep until next tick
        if options.realtime {
            next_tick_time += TICK_DURATION;
            let now = Instant::now();
            if next_tick_time > now {
                std::thread::sleep(next_tick_time - now);
            } else if now - next_tick_time > TICK_DURATION * 2 {
                // Too far behind; reset to avoid a catch-up spiral
                debug!("game loop behind schedule, resetting pacing");
                next_tick_time = now;
            }
        }
    }
}

fn tally(summary: &mut LoopSummary, events: &[GameEvent]) {
    for event in events {
        match event {
            GameEvent::ShellFired { .. } => summary.shells_fired += 1,
            GameEvent::TankHit { .. } => summary.hits += 1,
            GameEvent::TankDestroyed { victim, source } => {
                summary.tanks_destroyed += 1;
                info!(victim = %victim, source = ?source, "tank destroyed");
            }
            GameEvent::TankRespawned { tank, .. } => {
                summary.respawns += 1;
                debug!(tank = %tank, "tank back in play");
            }
            GameEvent::ShellImpact { .. } => {}
        }
    }
}
