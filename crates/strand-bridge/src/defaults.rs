//! Default constants for bridge configuration.

use std::time::Duration;

/// Default wait-loop poll interval for the invocation bridge.
///
/// Each expiry is a checkpoint where shutdown, scheduler death, or a
/// supervisor-issued interrupt can be observed.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Default time to wait for the scheduler thread's readiness signal.
pub const DEFAULT_START_TIMEOUT: Duration = Duration::from_secs(1);

/// Name given to the dedicated scheduler OS thread.
pub const SCHEDULER_THREAD_NAME: &str = "strand-scheduler";

/// Bound on how long `shutdown` waits for the scheduler thread to exit
/// before detaching it.
pub const SHUTDOWN_JOIN_TIMEOUT: Duration = Duration::from_secs(2);
