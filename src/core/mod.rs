//! # Core Module
//!
//! Crate-wide building blocks shared by every part of the terrain engine.
//!
//! ## Key Components
//! - `TerrainError` / `TerrainResult`: the error type every fallible operation returns
//! - `TerrainConfig`: engine parameters, read from TOML

pub mod config;
pub mod error;
