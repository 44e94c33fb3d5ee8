//! ECS systems that operate on the simulation world each tick.
//!
//! Systems are free functions over `&mut World` plus whatever engine state
//! they need passed in explicitly. Component data lives in the world.

pub mod combat;
pub mod shells;
pub mod snapshot;
pub mod tanks;
