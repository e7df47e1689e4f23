//! Process-global lifecycle for the scheduler thread.
//!
//! The worker runtime acquires the shared instance lazily on first use and
//! tears it down exactly once during graceful exit. After teardown the
//! bridge is permanently unavailable; it is never reconstructed.

use crate::bridge::Bridge;
use crate::error::{BridgeError, RunError};
use crate::scheduler::{SchedulerOptions, SchedulerThread};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;

/// Lifecycle of the process-wide instance.
enum GlobalState {
    /// No scheduler thread has been started yet.
    Unstarted,
    /// The shared instance, started on first acquire.
    Running(Arc<SchedulerThread>),
    /// Torn down; stays unavailable for the rest of the process.
    ShutDown,
}

static GLOBAL: Lazy<Mutex<GlobalState>> = Lazy::new(|| Mutex::new(GlobalState::Unstarted));

/// Return the process-wide scheduler thread, starting it on first use.
///
/// Safe under concurrent first use: the guarding mutex ensures exactly one
/// instance is ever constructed. Fails with [`BridgeError::ShutDown`] once
/// [`shutdown`] has run.
pub fn acquire() -> Result<Arc<SchedulerThread>, BridgeError> {
    let mut global = GLOBAL.lock();
    match &*global {
        GlobalState::Running(scheduler) => Ok(scheduler.clone()),
        GlobalState::ShutDown => Err(BridgeError::ShutDown),
        GlobalState::Unstarted => {
            let scheduler = SchedulerThread::spawn(SchedulerOptions::default())?;
            *global = GlobalState::Running(scheduler.clone());
            Ok(scheduler)
        }
    }
}

/// Tear down the process-wide scheduler thread. Idempotent.
///
/// Invoked once by the worker runtime during graceful process exit. Also
/// safe to call before the first acquire, in which case the bridge simply
/// becomes unavailable.
pub fn shutdown() {
    let mut global = GLOBAL.lock();
    if let GlobalState::Running(scheduler) = &*global {
        scheduler.shutdown();
    }
    *global = GlobalState::ShutDown;
}

/// Run a unit on the process-wide scheduler thread with default settings.
///
/// The synchronous face of an async function for the task layer, without
/// managing a [`Bridge`] by hand.
pub fn run<F, T, E>(unit: F) -> Result<T, RunError<E>>
where
    F: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    let scheduler = acquire().map_err(RunError::Bridge)?;
    Bridge::new(scheduler).run(unit)
}
