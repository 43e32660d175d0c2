//! # Window Follow Task
//!
//! Keeps the active chunk window centred on the tracked entity.
//!
//! The task first waits, for a bounded time, for the entity to exist. From then
//! on it checks the entity's position once per interval; when the entity sits
//! on a window edge it shifts the window once per touched edge, yielding after
//! each shift, and then sleeps until the next check. It ends when the entity
//! goes away.

use std::{collections::VecDeque, time::Duration};

use log::{debug, info};

use crate::{
    core::{
        config::TerrainConfig,
        error::{TerrainError, TerrainResult},
    },
    engine_state::{
        task_management::task::{Task, TaskStep},
        voxels::chunk::Direction,
        WorldContext,
    },
};

#[derive(Clone, Debug, PartialEq)]
enum FollowState {
    /// No entity seen yet. The deadline is set on the first step.
    Waiting { deadline: Option<Duration> },
    Check,
    /// Shifts still owed for the last check.
    Shifting(VecDeque<Direction>),
}

pub struct WindowFollowTask {
    state: FollowState,
    interval: Duration,
    wait_timeout: Duration,
}

impl WindowFollowTask {
    pub fn new(config: &TerrainConfig) -> Self {
        WindowFollowTask {
            state: FollowState::Waiting { deadline: None },
            interval: config.follow_interval(),
            wait_timeout: config.entity_wait_timeout(),
        }
    }
}

impl Task for WindowFollowTask {
    fn name(&self) -> &str {
        "window follow"
    }

    fn step(&mut self, world: &mut WorldContext, now: Duration) -> TerrainResult<TaskStep> {
        if let FollowState::Waiting { deadline } = self.state {
            if world.tracked_entity.is_none() {
                let deadline = deadline.unwrap_or(now + self.wait_timeout);
                if now >= deadline {
                    return Err(TerrainError::EntityUnavailable);
                }
                self.state = FollowState::Waiting {
                    deadline: Some(deadline),
                };
                return Ok(TaskStep::Yield);
            }
            debug!("Tracked entity available, following it");
            self.state = FollowState::Check;
        }

        match &mut self.state {
            FollowState::Check => {
                let Some(position) = world.tracked_entity else {
                    info!("Tracked entity removed, window follow stopped");
                    return Ok(TaskStep::Complete);
                };

                let mut pending: VecDeque<Direction> = world.grid.track_position(position).into();
                match pending.pop_front() {
                    Some(direction) => {
                        world.grid.shift(direction, &mut world.pool)?;
                        self.state = FollowState::Shifting(pending);
                        Ok(TaskStep::Yield)
                    }
                    None => Ok(TaskStep::Sleep(self.interval)),
                }
            }
            FollowState::Shifting(pending) => match pending.pop_front() {
                Some(direction) => {
                    world.grid.shift(direction, &mut world.pool)?;
                    Ok(TaskStep::Yield)
                }
                None => {
                    self.state = FollowState::Check;
                    Ok(TaskStep::Sleep(self.interval))
                }
            },
            FollowState::Waiting { .. } => Ok(TaskStep::Yield),
        }
    }
}
