use std::env;
use std::path::PathBuf;

use thiserror::Error;

use tankfire_core::components::Obstacle;
use tankfire_core::config::ConfigError;
use tankfire_sim::world_setup;
use tankfire_sim::SimConfig;

// Runtime/host settings (not gameplay tuning).

pub const DEFAULT_TICKS: u64 = 3600;
pub const DEFAULT_AI_TANKS: usize = 4;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config: {0}")]
    Config(#[from] ConfigError),
    #[error("game loop thread: {0}")]
    Thread(#[from] std::io::Error),
    #[error("game loop thread panicked")]
    LoopPanicked,
}

/// Host settings read from `TANKFIRE_*` variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Overrides the seed from the config file.
    pub seed: Option<u64>,
    /// Ticks to run before shutting down; 0 runs until the channel closes.
    pub ticks: u64,
    pub config_path: Option<PathBuf>,
    /// JSON obstacle layout; the built-in arena when unset.
    pub arena_path: Option<PathBuf>,
    pub ai_tanks: usize,
    /// Pace ticks to wall-clock time instead of running flat out.
    pub realtime: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: None,
            ticks: DEFAULT_TICKS,
            config_path: None,
            arena_path: None,
            ai_tanks: DEFAULT_AI_TANKS,
            realtime: false,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from any key lookup. Unparseable values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            seed: lookup("TANKFIRE_SEED").and_then(|v| v.parse().ok()),
            ticks: lookup("TANKFIRE_TICKS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.ticks),
            config_path: lookup("TANKFIRE_CONFIG")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            arena_path: lookup("TANKFIRE_ARENA")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            ai_tanks: lookup("TANKFIRE_AI_TANKS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.ai_tanks),
            realtime: lookup("TANKFIRE_REALTIME")
                .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
                .unwrap_or(defaults.realtime),
        }
    }

    /// The config file (or defaults) with the seed override applied.
    pub fn sim_config(&self) -> Result<SimConfig, ConfigError> {
        let mut config = match &self.config_path {
            Some(path) => SimConfig::load(path)?,
            None => SimConfig::default(),
        };
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        Ok(config)
    }

    pub fn arena(&self) -> Result<Option<Vec<Obstacle>>, ConfigError> {
        self.arena_path
            .as_ref()
            .map(world_setup::load_layout)
            .transpose()
    }
}
