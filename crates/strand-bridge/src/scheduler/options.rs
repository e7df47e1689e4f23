//! Scheduler thread configuration.

use crate::defaults::{DEFAULT_START_TIMEOUT, SCHEDULER_THREAD_NAME};
use std::time::Duration;

/// Options for spawning the scheduler thread.
#[derive(Debug, Clone)]
pub struct SchedulerOptions {
    /// Name given to the dedicated OS thread.
    pub thread_name: String,

    /// How long to wait for the thread's readiness signal before the spawn
    /// fails.
    pub start_timeout: Duration,
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self {
            thread_name: SCHEDULER_THREAD_NAME.to_string(),
            start_timeout: DEFAULT_START_TIMEOUT,
        }
    }
}
