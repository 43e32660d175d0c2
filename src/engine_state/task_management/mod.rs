//! # Task Management System
//!
//! This module provides a single-threaded cooperative task scheduler. Long-running
//! processes such as following the tracked entity or holding a dig are written as
//! [`Task`]s that advance one short step at a time and yield in between.
//!
//! ## Architecture Overview
//!
//! - `TaskManager`: owns the scheduled tasks and a virtual clock
//! - `Task`: a process with a `step()` method
//! - `TaskStep`: what the task asks for after a step (yield, sleep or finish)
//!
//! ## Clock
//!
//! The manager never reads wall time. The game loop passes the elapsed time to
//! [`TaskManager::tick`], which makes scheduling deterministic and lets tests
//! drive minutes of game time instantly.
//!
//! ## Example Usage
//! ```rust,ignore
//! let mut task_manager = TaskManager::new();
//! task_manager.publish_task(Box::new(WindowFollowTask::new(&config)));
//!
//! // In your main/game loop:
//! for failure in task_manager.tick(&mut world, frame_time) {
//!     log::warn!("{} stopped: {}", failure.name, failure.error);
//! }
//! ```

pub mod task;

use std::{collections::VecDeque, time::Duration};

use log::{debug, error};
use task::{Task, TaskStep};

use crate::core::error::TerrainError;

use super::WorldContext;

/// Handle returned by [`TaskManager::publish_task`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TaskId(pub u64);

/// A task that ended with an error during a tick.
#[derive(Debug)]
pub struct TaskFailure {
    pub id: TaskId,
    pub name: String,
    pub error: TerrainError,
}

struct ScheduledTask {
    id: TaskId,
    task: Box<dyn Task>,
    wake_at: Duration,
}

/// Steps cooperative tasks against a virtual clock.
///
/// Tasks run in the order they were published. A task that yields runs again on
/// the next tick; a sleeping task runs on the first tick at or after its wake time.
#[derive(Default)]
pub struct TaskManager {
    tasks: VecDeque<ScheduledTask>,
    clock: Duration,
    next_id: u64,
}

impl TaskManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `task` to take its first step on the next tick.
    pub fn publish_task(&mut self, task: Box<dyn Task>) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        debug!("Scheduling task {} as {:?}", task.name(), id);
        self.tasks.push_back(ScheduledTask {
            id,
            task,
            wake_at: self.clock,
        });
        id
    }

    /// Drops a scheduled task without stepping it again.
    ///
    /// # Returns
    /// `true` if the task was still scheduled.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|scheduled| scheduled.id != id);
        before != self.tasks.len()
    }

    pub fn is_running(&self, id: TaskId) -> bool {
        self.tasks.iter().any(|scheduled| scheduled.id == id)
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Current value of the virtual clock.
    pub fn now(&self) -> Duration {
        self.clock
    }

    /// Advances the clock by `elapsed` and steps every task that is due.
    ///
    /// Each due task takes exactly one step per tick.
    ///
    /// # Returns
    /// The tasks that ended with an error during this tick.
    pub fn tick(&mut self, world: &mut WorldContext, elapsed: Duration) -> Vec<TaskFailure> {
        self.clock += elapsed;
        let now = self.clock;
        let mut failures = Vec::new();

        for _ in 0..self.tasks.len() {
            let Some(mut scheduled) = self.tasks.pop_front() else {
                break;
            };
            if scheduled.wake_at > now {
                self.tasks.push_back(scheduled);
                continue;
            }

            match scheduled.task.step(world, now) {
                Ok(TaskStep::Yield) => {
                    scheduled.wake_at = now;
                    self.tasks.push_back(scheduled);
                }
                Ok(TaskStep::Sleep(duration)) => {
                    scheduled.wake_at = now + duration;
                    self.tasks.push_back(scheduled);
                }
                Ok(TaskStep::Complete) => {
                    debug!("Task {} completed", scheduled.task.name());
                }
                Err(error) => {
                    error!("Task {} failed: {}", scheduled.task.name(), error);
                    failures.push(TaskFailure {
                        id: scheduled.id,
                        name: scheduled.task.name().to_string(),
                        error,
                    });
                }
            }
        }

        failures
    }
}
