//! # Voxel Task System
//!
//! Long-running terrain processes stepped by the
//! [`TaskManager`](crate::engine_state::task_management::TaskManager).

pub mod dig_task;
pub mod window_follow_task;
