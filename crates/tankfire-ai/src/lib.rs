//! Autopilot for TANKFIRE.
//!
//! Aiming geometry, movement patterns, pursuit and personality-driven gunnery
//! for pattern-driven tanks. Pure functions over plain data; no ECS dependency.

pub mod patterns;
pub mod profiles;
pub mod pursuit;
pub mod targeting;

pub use tankfire_core as core;

#[cfg(test)]
mod tests;
