//! # Dig Task
//!
//! Holds a dig on one block until its destroy time has elapsed.
//!
//! The dig is abandoned as soon as the dig button is released, the edit mode
//! leaves destroying, or the aim moves to another block. When the timer runs
//! out the block is removed and its hole covered within that same step.

use std::time::Duration;

use cgmath::Point3;
use log::{debug, info};

use crate::{
    core::error::TerrainResult,
    engine_state::{
        task_management::task::{Task, TaskStep},
        WorldContext,
    },
};

pub struct DigTask {
    target: Point3<i32>,
    destroy_time: Duration,
    started_at: Option<Duration>,
}

impl DigTask {
    pub fn new(target: Point3<i32>, destroy_time: Duration) -> Self {
        DigTask {
            target,
            destroy_time,
            started_at: None,
        }
    }

    pub fn target(&self) -> Point3<i32> {
        self.target
    }
}

impl Task for DigTask {
    fn name(&self) -> &str {
        "dig"
    }

    fn step(&mut self, world: &mut WorldContext, now: Duration) -> TerrainResult<TaskStep> {
        if !world.input.is_digging() {
            debug!("Dig at {:?} interrupted by input", self.target);
            return Ok(TaskStep::Complete);
        }
        let aimed = world.aim_target().map(|hit| hit.position);
        if aimed != Some(self.target) {
            debug!("Dig at {:?} interrupted, aim moved to {:?}", self.target, aimed);
            return Ok(TaskStep::Complete);
        }

        let started_at = *self.started_at.get_or_insert(now);
        if now.saturating_sub(started_at) < self.destroy_time {
            return Ok(TaskStep::Yield);
        }

        let dug = world
            .edit
            .dig_block(&mut world.grid, &mut world.pool, self.target)?;
        info!("Dug {:?} at {:?}", dug, self.target);
        Ok(TaskStep::Complete)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::config::TerrainConfig,
        engine_state::{
            input_state::{Aim, ButtonState, EditMode},
            voxels::{block::block_type::BlockType, pool::BlockPool, world::ChunkGrid},
        },
    };
    use cgmath::Vector3;

    /// Flat 0.9 terrain (StoneSnow surface at y = 9), aiming straight down at (5, 9, 5).
    fn digging_world() -> WorldContext {
        let mut world = WorldContext::empty(TerrainConfig::default());
        let mut pool = BlockPool::new();
        world.grid = ChunkGrid::flat_for_tests(0.9, &mut pool);
        world.pool = pool;
        world.input.mode = EditMode::Destroying;
        world.input.dig_button = ButtonState::Pressed;
        world.input.aim = Some(Aim {
            origin: Point3::new(5.0, 14.0, 5.0),
            direction: Vector3::new(0.0, -1.0, 0.0),
        });
        world
    }

    #[test]
    fn digs_after_the_destroy_time() {
        let mut world = digging_world();
        let target = Point3::new(5, 9, 5);
        let mut task = DigTask::new(target, Duration::from_millis(1500));

        assert_eq!(task.step(&mut world, Duration::from_secs(1)).unwrap(), TaskStep::Yield);
        world.input.dig_button = ButtonState::Held;
        assert_eq!(
            task.step(&mut world, Duration::from_millis(2400)).unwrap(),
            TaskStep::Yield
        );
        assert_eq!(world.pool.type_at(target), Some(BlockType::StoneSnow));

        assert_eq!(
            task.step(&mut world, Duration::from_millis(2500)).unwrap(),
            TaskStep::Complete
        );
        assert_eq!(world.pool.type_at(target), None);
        assert_eq!(world.pool.type_at(Point3::new(5, 8, 5)), Some(BlockType::Stone));
    }

    #[test]
    fn releasing_the_button_cancels() {
        let mut world = digging_world();
        let target = Point3::new(5, 9, 5);
        let mut task = DigTask::new(target, Duration::from_millis(1500));
        task.step(&mut world, Duration::ZERO).unwrap();

        world.input.dig_button = ButtonState::Released;
        assert_eq!(task.step(&mut world, Duration::from_secs(5)).unwrap(), TaskStep::Complete);
        assert_eq!(world.pool.type_at(target), Some(BlockType::StoneSnow));
    }

    #[test]
    fn leaving_destroy_mode_cancels() {
        let mut world = digging_world();
        let target = Point3::new(5, 9, 5);
        let mut task = DigTask::new(target, Duration::ZERO);

        world.input.mode = EditMode::Building;
        assert_eq!(task.step(&mut world, Duration::ZERO).unwrap(), TaskStep::Complete);
        assert_eq!(world.pool.type_at(target), Some(BlockType::StoneSnow));
    }

    #[test]
    fn moving_the_aim_cancels() {
        let mut world = digging_world();
        let target = Point3::new(5, 9, 5);
        let mut task = DigTask::new(target, Duration::from_millis(1500));
        task.step(&mut world, Duration::ZERO).unwrap();

        world.input.aim = Some(Aim {
            origin: Point3::new(6.0, 14.0, 5.0),
            direction: Vector3::new(0.0, -1.0, 0.0),
        });
        assert_eq!(task.step(&mut world, Duration::from_secs(5)).unwrap(), TaskStep::Complete);
        assert_eq!(world.pool.type_at(target), Some(BlockType::StoneSnow));
    }
}
