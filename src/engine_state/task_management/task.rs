//! # Task System Core Traits
//!
//! This module defines the fundamental building block of the cooperative
//! scheduler: a long-running process that advances in small steps.
//!
//! ## Task Lifecycle
//! 1. A `Task` is created and scheduled via `TaskManager::publish_task()`
//! 2. On every tick whose clock has reached the task's wake time, `step()` is called
//!    once with exclusive access to the world
//! 3. The returned [`TaskStep`] decides when the task runs next, or that it is done
//! 4. A step that returns an error ends the task; the error is reported by the tick
//!
//! All steps run on the thread that owns the world, so a step never observes
//! another step half-way through.

use std::time::Duration;

use crate::{core::error::TerrainResult, engine_state::WorldContext};

/// What a task wants after a step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskStep {
    /// Run again on the next tick.
    Yield,
    /// Run again once the clock has advanced by at least this much.
    Sleep(Duration),
    /// The task is finished and is dropped.
    Complete,
}

/// A cooperative process stepped by the [`TaskManager`](super::TaskManager).
///
/// # Implementation Guidelines
/// - Keep each step short; long work should be spread across several yields
/// - Finish any change that must look atomic to observers within a single step
pub trait Task {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Advances the task by one step.
    ///
    /// # Arguments
    /// * `world` - The world context the task operates on
    /// * `now` - The scheduler's clock at this tick
    fn step(&mut self, world: &mut WorldContext, now: Duration) -> TerrainResult<TaskStep>;
}
