//! # Voxel Terrain Core
//!
//! Representing, streaming and editing the block terrain.
//!
//! ## Architecture
//!
//! * **Block**: block types, faces, the static catalog and the placed block record
//! * **Pool**: the arena every block instance lives in, with per-type free sets
//!   and the lattice index used for "is there a solid block here" queries
//! * **Chunk**: one square of terrain, generated from a height field or
//!   replayed from its saved block lists
//! * **World**: the sliding window of active chunks plus the registry of every
//!   chunk generated so far
//! * **Edit**: aiming, building, digging and hole covering
//! * **Tasks**: the window-follow and dig processes
//!
//! ## Data Flow
//!
//! 1. The grid generates or reloads chunks as the tracked entity moves
//! 2. Chunks take blocks from the pool and classify them through the catalog
//! 3. Edits go through the pool and mark the touched chunks changed
//! 4. Changed chunks are saved block by block, the rest as height maps

pub mod block;
pub mod chunk;
pub mod edit;
pub mod pool;
pub mod tasks;
pub mod world;
