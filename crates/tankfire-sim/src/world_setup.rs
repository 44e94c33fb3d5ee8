//! Arena layouts: the obstacle set a battlefield starts with.
//!
//! Layouts are hand-placed or loaded from JSON; nothing here generates terrain.

use std::path::Path;

use glam::DVec3;

use tankfire_core::components::Obstacle;
use tankfire_core::config::ConfigError;

/// Obstacle-free radius around the origin where the primary player spawns.
pub const CLEAR_RADIUS: f64 = 30.0;

/// The built-in arena: a ring of buildings, rock clusters and two tree lines.
pub fn default_layout() -> Vec<Obstacle> {
    let mut obstacles = Vec::new();

    for (x, z) in [(120.0, 0.0), (-120.0, 0.0), (0.0, 160.0), (0.0, -160.0)] {
        obstacles.push(Obstacle::building(
            DVec3::new(x, 6.0, z),
            DVec3::new(10.0, 6.0, 8.0),
        ));
    }
    for (x, z) in [(260.0, 260.0), (-260.0, 260.0), (260.0, -260.0), (-260.0, -260.0)] {
        obstacles.push(Obstacle::building(
            DVec3::new(x, 8.0, z),
            DVec3::new(14.0, 8.0, 14.0),
        ));
    }

    for (cx, cz) in [(60.0, 80.0), (-80.0, -60.0), (180.0, -90.0), (-170.0, 120.0)] {
        for (dx, dz, size) in [(0.0, 0.0, 2.5), (4.0, 2.0, 1.5), (-3.0, 4.0, 1.8)] {
            obstacles.push(Obstacle::rock(DVec3::new(cx + dx, 0.0, cz + dz), size));
        }
    }

    for i in 0..12 {
        let offset = -220.0 + 40.0 * i as f64;
        obstacles.push(Obstacle::tree(DVec3::new(offset, 0.0, 320.0), 1.2));
        obstacles.push(Obstacle::tree(DVec3::new(-340.0, 0.0, offset), 1.0));
    }

    obstacles
}

/// Parse a JSON array of obstacles. Shapes must have positive sizes.
pub fn layout_from_json_str(json: &str) -> Result<Vec<Obstacle>, ConfigError> {
    let obstacles: Vec<Obstacle> = serde_json::from_str(json)?;
    if let Some(bad) = obstacles.iter().position(|o| !o.shape.is_valid()) {
        return Err(ConfigError::Invalid(format!("obstacle {bad} has a non-positive size")));
    }
    Ok(obstacles)
}

pub fn load_layout(path: impl AsRef<Path>) -> Result<Vec<Obstacle>, ConfigError> {
    let text = std::fs::read_to_string(path)?;
    layout_from_json_str(&text)
}
