//! # Voxel Terrain
//!
//! Procedural block terrain for a first-person building game: an endless
//! noise-generated ground surface, streamed in square chunks around a moving
//! viewpoint, editable one block at a time, and saved to disk.
//!
//! ## Key Modules
//!
//! * `core` - Errors and configuration
//! * `engine_state` - The session, the voxel terrain, the cooperative task scheduler and persistence
//!
//! ## Usage
//!
//! ```rust,ignore
//! use voxel_terrain::{
//!     core::config::TerrainConfig,
//!     engine_state::{persistence::store::FileSaveStore, EngineState},
//! };
//!
//! let config = TerrainConfig::load("terrain.toml")?;
//! let mut store = FileSaveStore::new(&config.save_directory);
//! let mut engine = EngineState::new_or_load(config, &store)?;
//!
//! // Every frame:
//! engine.move_entity(player_position);
//! engine.update(frame_time);
//!
//! engine.save(&mut store)?;
//! ```
//!
//! Rendering, input devices and physics stay outside the crate. They read the
//! pool's placed blocks and feed the tracked position and aim back in.

use std::time::Duration;

use cgmath::{Point3, Vector3};
use log::info;

pub mod core;
pub mod engine_state;

use crate::{
    core::{config::TerrainConfig, error::TerrainResult},
    engine_state::{input_state::EditMode, persistence::store::FileSaveStore, EngineState},
};

/// Configuration file read by [`run`].
pub const CONFIG_PATH: &str = "terrain.toml";

/// Virtual time advanced per simulated frame.
const FRAME_TIME: Duration = Duration::from_millis(50);

/// Frames spent walking in the headless session.
const WALK_FRAMES: usize = 120;

/// Distance walked per frame.
const WALK_SPEED: f32 = 0.25;

/// Upper bound on frames spent holding a dig.
const MAX_DIG_FRAMES: usize = 100;

/// Runs a headless session: load or create a world, walk across a few chunk
/// boundaries, dig and build once, then save.
pub fn run() -> TerrainResult<()> {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized");
    let session_start = web_time::Instant::now();

    let config = TerrainConfig::load(CONFIG_PATH)?;
    let mut store = FileSaveStore::new(&config.save_directory);
    let mut engine = EngineState::new_or_load(config, &store)?;

    let Some(mut position) = engine.tracked_entity() else {
        return Ok(());
    };
    for _ in 0..WALK_FRAMES {
        position.x += WALK_SPEED;
        position.z += WALK_SPEED / 2.0;
        engine.move_entity(position);
        engine.update(FRAME_TIME);
    }
    info!(
        "Walked to ({:.1}, {:.1}), {} chunks generated",
        position.x,
        position.z,
        engine.world.grid.chunk_count()
    );

    // Settle on the surface under the walker before editing.
    let surface = engine.world.grid.max_height() as f32 + 2.0;
    engine.set_aim(
        Point3::new(position.x, surface, position.z),
        Vector3::new(0.0, -1.0, 0.0),
    );
    if let Some(hit) = engine.world.aim_target() {
        engine.move_entity(Point3::new(position.x, hit.position.y as f32 + 1.0, position.z));
        engine.set_aim(
            Point3::new(position.x, hit.position.y as f32 + 2.0, position.z),
            Vector3::new(0.0, -1.0, 0.0),
        );
    }

    engine.set_mode(EditMode::Destroying);
    if engine.press_dig().is_some() {
        for _ in 0..MAX_DIG_FRAMES {
            engine.update(FRAME_TIME);
            if !engine.is_digging() {
                break;
            }
            engine.press_dig();
        }
    }
    engine.release_dig();

    engine.toggle_mode();
    if let Some(id) = engine.build()? {
        info!(
            "Built {:?} at {:?}",
            engine.world.pool.block_type(id),
            engine.world.pool.position(id)
        );
    }

    engine.save(&mut store)?;
    engine.world.pool.log_stats();
    info!("Session finished in {:?}", session_start.elapsed());
    Ok(())
}
