//! Core types and definitions for the TANKFIRE simulation.
//!
//! This crate defines the vocabulary shared across all other crates:
//! components, collider shapes, commands, state snapshots, events,
//! constants and tuning. It has no dependency on the ECS or any runtime.

pub mod commands;
pub mod components;
pub mod config;
pub mod constants;
pub mod enums;
pub mod events;
pub mod shapes;
pub mod state;
pub mod types;
