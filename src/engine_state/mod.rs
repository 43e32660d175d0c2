//! # Engine State Module
//!
//! The top-level terrain session owned by the game loop.
//!
//! ## Key Components
//!
//! * `WorldContext` - Every service the terrain needs, passed explicitly to whoever uses it
//! * `EngineState` - The session: world context plus the cooperative task manager
//! * `input_state` - Edit intent handed over by the input layer
//! * `persistence` - Save records and storage backends
//! * `task_management` - Cooperative single-threaded scheduler
//! * `voxels` - Blocks, chunks, the chunk grid and edits
//!
//! ## Frame Loop
//!
//! ```rust,ignore
//! let mut engine = EngineState::new_or_load(config, &store)?;
//! loop {
//!     engine.move_entity(player_position);
//!     engine.set_aim(eye, look_direction);
//!     for failure in engine.update(frame_time) {
//!         log::warn!("{} stopped: {}", failure.name, failure.error);
//!     }
//! }
//! ```

use std::time::Duration;

use cgmath::{Point3, Vector3};
use log::{debug, info, warn};

use crate::core::{
    config::TerrainConfig,
    error::{TerrainError, TerrainResult},
};

use input_state::{Aim, ButtonState, EditInput, EditMode};
use persistence::store::SaveStore;
use task_management::{TaskFailure, TaskId, TaskManager};
use voxels::{
    block::{block_type::BlockType, catalog::BlockCatalog, BlockId},
    edit::{EditEngine, RayHit},
    pool::BlockPool,
    tasks::{dig_task::DigTask, window_follow_task::WindowFollowTask},
    world::ChunkGrid,
};

pub mod input_state;
pub mod persistence;
pub mod task_management;
pub mod voxels;

/// Everything the terrain operates on.
///
/// Tasks receive this by mutable reference on every step, so the pool, the grid
/// and the entity position are never shared behind locks.
pub struct WorldContext {
    pub config: TerrainConfig,
    pub pool: BlockPool,
    pub grid: ChunkGrid,
    pub edit: EditEngine,
    /// Position of the entity the window follows, once it exists.
    pub tracked_entity: Option<Point3<f32>>,
    pub input: EditInput,
}

impl WorldContext {
    /// A context with an empty grid and pool.
    pub fn empty(config: TerrainConfig) -> Self {
        let grid = ChunkGrid::new(&config, BlockCatalog::standard());
        WorldContext {
            config,
            pool: BlockPool::new(),
            grid,
            edit: EditEngine::default(),
            tracked_entity: None,
            input: EditInput::default(),
        }
    }

    /// The visible block under the current aim, if any.
    pub fn aim_target(&self) -> Option<RayHit> {
        let aim = self.input.aim?;
        self.edit.target(&self.pool, aim.origin, aim.direction)
    }
}

/// A running terrain session.
pub struct EngineState {
    pub world: WorldContext,
    pub task_manager: TaskManager,
    follow_task: Option<TaskId>,
    dig_task: Option<TaskId>,
}

impl EngineState {
    /// Generates a fresh world and spawns the tracked entity on its centre.
    pub fn new_game(config: TerrainConfig) -> TerrainResult<Self> {
        config.validate()?;
        let mut world = WorldContext::empty(config);

        let start_offset = world.config.start_offset();
        world.grid.initialize(start_offset, &mut world.pool)?;
        let spawn = world.grid.center_position(&world.pool);
        world.tracked_entity = Some(spawn);
        info!(
            "New world from noise offset {:?}, spawning at ({}, {}, {})",
            start_offset, spawn.x, spawn.y, spawn.z
        );

        Ok(Self::start(world))
    }

    /// Restores the world saved in `store` and spawns the entity at the saved viewpoint.
    ///
    /// # Errors
    /// `PersistenceMiss` if the store holds no save.
    pub fn load_game(config: TerrainConfig, store: &dyn SaveStore) -> TerrainResult<Self> {
        config.validate()?;
        if !store.save_exists() {
            return Err(TerrainError::PersistenceMiss("no saved world".to_string()));
        }

        let world_record = store.load_world()?;
        let viewpoint: Point3<f32> = store.load_viewpoint()?.position.into();
        let mut world = WorldContext::empty(config);
        world.grid.restore(
            &world_record,
            |key| store.load_chunk(key),
            viewpoint,
            &mut world.pool,
        )?;
        world.tracked_entity = Some(viewpoint);
        info!("Loaded world with {} chunks", world.grid.chunk_count());

        Ok(Self::start(world))
    }

    /// Loads the saved world, or starts a new one when there is none.
    pub fn new_or_load(config: TerrainConfig, store: &dyn SaveStore) -> TerrainResult<Self> {
        match Self::load_game(config.clone(), store) {
            Err(TerrainError::PersistenceMiss(what)) => {
                info!("No save to load ({}), starting a new world", what);
                Self::new_game(config)
            }
            result => result,
        }
    }

    fn start(world: WorldContext) -> Self {
        let mut task_manager = TaskManager::new();
        let follow_task = task_manager.publish_task(Box::new(WindowFollowTask::new(&world.config)));
        EngineState {
            world,
            task_manager,
            follow_task: Some(follow_task),
            dig_task: None,
        }
    }

    /// Writes the world and the tracked entity's position to `store`.
    pub fn save(&self, store: &mut dyn SaveStore) -> TerrainResult<()> {
        let viewpoint = self
            .world
            .tracked_entity
            .unwrap_or(Point3::new(0.0, 0.0, 0.0));
        let snapshot = self.world.grid.save_snapshot(&self.world.pool, viewpoint)?;
        store.save(&snapshot)
    }

    /// Advances the session clock by `elapsed` and steps the running tasks.
    pub fn update(&mut self, elapsed: Duration) -> Vec<TaskFailure> {
        let failures = self.task_manager.tick(&mut self.world, elapsed);
        for failure in &failures {
            warn!("Task {} ended with {}", failure.name, failure.error);
        }

        if let Some(id) = self.dig_task {
            if !self.task_manager.is_running(id) {
                self.dig_task = None;
            }
        }
        if let Some(id) = self.follow_task {
            if !self.task_manager.is_running(id) {
                self.follow_task = None;
            }
        }
        failures
    }

    pub fn tracked_entity(&self) -> Option<Point3<f32>> {
        self.world.tracked_entity
    }

    /// Moves the tracked entity, restarting the window follow if it had stopped.
    pub fn move_entity(&mut self, position: Point3<f32>) {
        self.world.tracked_entity = Some(position);
        if self.follow_task.is_none() {
            debug!("Restarting window follow");
            let id = self
                .task_manager
                .publish_task(Box::new(WindowFollowTask::new(&self.world.config)));
            self.follow_task = Some(id);
        }
    }

    /// Removes the tracked entity; the window follow ends on its next check.
    pub fn remove_entity(&mut self) {
        self.world.tracked_entity = None;
    }

    pub fn set_aim(&mut self, origin: Point3<f32>, direction: Vector3<f32>) {
        self.world.input.aim = Some(Aim { origin, direction });
    }

    pub fn clear_aim(&mut self) {
        self.world.input.aim = None;
    }

    pub fn mode(&self) -> EditMode {
        self.world.input.mode
    }

    pub fn set_mode(&mut self, mode: EditMode) {
        self.world.input.mode = mode;
    }

    pub fn toggle_mode(&mut self) {
        self.world.input.mode = self.world.input.mode.toggled();
    }

    pub fn select_block(&mut self, block_type: BlockType) {
        self.world.input.selected_block = block_type;
    }

    /// Presses the dig button. In destroying mode this starts a dig on the aimed block.
    ///
    /// # Returns
    /// The dig task, if one was started.
    pub fn press_dig(&mut self) -> Option<TaskId> {
        self.set_dig_button(true);
        if !self.world.input.dig_button.is_just_pressed()
            || self.world.input.mode != EditMode::Destroying
        {
            return None;
        }

        let hit = self.world.aim_target()?;
        let seconds = self
            .world
            .grid
            .catalog()
            .destroy_time(hit.block_type)
            .unwrap_or(0.0)
            .max(0.0);
        if let Some(previous) = self.dig_task.take() {
            self.task_manager.cancel(previous);
        }
        let id = self.task_manager.publish_task(Box::new(DigTask::new(
            hit.position,
            Duration::from_secs_f32(seconds),
        )));
        self.dig_task = Some(id);
        Some(id)
    }

    /// Releases the dig button; a running dig stops on its next step.
    pub fn release_dig(&mut self) {
        self.set_dig_button(false);
    }

    fn set_dig_button(&mut self, pressed: bool) {
        let was_pressed = self.world.input.dig_button.is_active();
        self.world.input.dig_button = ButtonState::from_raw_states(was_pressed, pressed);
    }

    pub fn is_digging(&self) -> bool {
        self.dig_task
            .is_some_and(|id| self.task_manager.is_running(id))
    }

    /// In building mode, places the selected block against the aimed face.
    ///
    /// # Returns
    /// The placed block, or `None` when not building or not aiming at terrain.
    pub fn build(&mut self) -> TerrainResult<Option<BlockId>> {
        if self.world.input.mode != EditMode::Building {
            return Ok(None);
        }
        let Some(hit) = self.world.aim_target() else {
            return Ok(None);
        };

        let world = &mut self.world;
        world
            .edit
            .place_block(
                &mut world.grid,
                &mut world.pool,
                world.input.selected_block,
                hit.build_target(),
            )
            .map(Some)
    }
}
