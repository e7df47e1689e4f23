//! Completion token returned by `submit`.

use crate::sync::CompletionSignal;
use std::sync::Arc;
use std::time::Duration;

/// Completion token for one submitted unit.
///
/// The handle holds only the completion signal, never the unit's outcome,
/// so it cannot become a path through which a captured failure is retained.
/// The bridge discards it the instant the invocation resolves.
pub struct SchedulingHandle {
    signal: Arc<CompletionSignal>,
}

impl SchedulingHandle {
    pub(crate) fn new(signal: Arc<CompletionSignal>) -> Self {
        Self { signal }
    }

    /// Block until the unit completes or `timeout` elapses.
    ///
    /// Returns true once the unit has completed, or has been discarded
    /// without running to completion.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        self.signal.wait_timeout(timeout)
    }

    /// Poll completion without blocking.
    pub fn is_complete(&self) -> bool {
        self.signal.is_set()
    }
}
