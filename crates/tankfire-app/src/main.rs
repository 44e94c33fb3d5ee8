use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use tracing::{error, info};

use tankfire_app::config::{AppError, Settings};
use tankfire_app::game_loop::{self, LoopOptions};
use tankfire_app::state::LatestSnapshot;
use tankfire_sim::SimulationEngine;

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

fn run(settings: &Settings) -> Result<(), AppError> {
    let config = settings.sim_config()?;
    let arena = settings.arena()?;
    info!(seed = config.seed, ticks = settings.ticks, ai_tanks = settings.ai_tanks, "starting battle");

    let mut engine = SimulationEngine::new(config);
    let player = engine.setup_arena(arena, settings.ai_tanks);

    let latest: LatestSnapshot = Arc::new(Mutex::new(None));
    let options = LoopOptions {
        max_ticks: settings.ticks,
        realtime: settings.realtime,
    };
    let (cmd_tx, handle) = game_loop::spawn_game_loop(engine, options, latest.clone())?;

    // The sender stays alive until the loop ends; with no tick limit that is
    // when the process is stopped.
    let summary = handle.join().map_err(|_| AppError::LoopPanicked)?;
    drop(cmd_tx);
    info!(
        ticks = summary.ticks,
        shells = summary.shells_fired,
        hits = summary.hits,
        destroyed = summary.tanks_destroyed,
        respawns = summary.respawns,
        "battle finished"
    );

    if let Ok(lock) = latest.lock() {
        if let Some(view) = lock.as_ref().and_then(|s| s.tank(player)) {
            info!(
                kills = view.stats.kills,
                deaths = view.stats.deaths,
                health = view.health,
                "player result"
            );
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    // Load .env locally; safe to ignore when not present.
    let _ = dotenvy::dotenv();
    init_tracing();

    let settings = Settings::from_env();
    match run(&settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "tankfire failed");
            ExitCode::FAILURE
        }
    }
}
