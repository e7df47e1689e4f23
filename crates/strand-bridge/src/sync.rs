//! Cross-thread signaling primitives.

use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// One-shot completion signal shared between a waiting worker thread and
/// the scheduler thread.
///
/// The flag under the mutex records whether the signal has fired, so a
/// waiter that arrives after the fact never blocks.
pub struct CompletionSignal {
    fired: Mutex<bool>,
    condvar: Condvar,
}

impl CompletionSignal {
    /// Create an unfired signal.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            fired: Mutex::new(false),
            condvar: Condvar::new(),
        })
    }

    /// Fire the signal, waking every waiter.
    pub fn notify(&self) {
        let mut fired = self.fired.lock();
        *fired = true;
        self.condvar.notify_all();
    }

    /// Check whether the signal has fired, without blocking.
    pub fn is_set(&self) -> bool {
        *self.fired.lock()
    }

    /// Block until the signal fires or `timeout` elapses.
    ///
    /// Returns true once the signal has fired.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let mut fired = self.fired.lock();
        if !*fired {
            self.condvar.wait_for(&mut fired, timeout);
        }
        *fired
    }
}

/// Supervisor-issued abandonment flag.
///
/// The worker runtime sets this from another thread to make a blocked
/// `run_interruptible` call stop waiting at its next poll checkpoint.
#[derive(Clone, Default)]
pub struct InterruptFlag {
    flag: Arc<AtomicBool>,
}

impl InterruptFlag {
    /// Create an unset flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that the waiting thread abandon its wait.
    pub fn set(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Check whether an interrupt has been requested.
    pub fn is_set(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}
