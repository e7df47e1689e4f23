//! The invocation bridge: blocking entry into the scheduler thread.
//!
//! `run` makes a unit of asynchronous work look like an ordinary function
//! call: the calling thread blocks until the unit completes on the
//! scheduler thread, then receives its value or its failure exactly as if
//! the work had run in-line. Propagating a failure is memory-neutral: the
//! bridge retains nothing of the outcome once the call returns.

use crate::defaults::DEFAULT_POLL_INTERVAL;
use crate::error::{BridgeError, RunError};
use crate::invocation::{Failure, Invocation, InvocationState};
use crate::scheduler::SchedulerThread;
use crate::sync::InterruptFlag;
use futures_util::FutureExt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

/// Blocking bridge over the scheduler thread.
///
/// Cheap to clone; every worker thread can carry its own copy.
#[derive(Clone)]
pub struct Bridge {
    scheduler: Arc<SchedulerThread>,
    poll_interval: Duration,
}

impl Bridge {
    /// Create a bridge with the default poll interval.
    pub fn new(scheduler: Arc<SchedulerThread>) -> Self {
        Self::with_poll_interval(scheduler, DEFAULT_POLL_INTERVAL)
    }

    /// Create a bridge with a custom wait-loop poll interval.
    pub fn with_poll_interval(scheduler: Arc<SchedulerThread>, poll_interval: Duration) -> Self {
        Self {
            scheduler,
            poll_interval,
        }
    }

    /// The scheduler thread this bridge submits to.
    pub fn scheduler(&self) -> &Arc<SchedulerThread> {
        &self.scheduler
    }

    /// Run `unit` on the scheduler thread and block for its outcome.
    ///
    /// Returns the unit's value, or re-raises its failure: an `Err` comes
    /// back verbatim as [`RunError::Task`], a panic is resumed on this
    /// thread with its original payload.
    pub fn run<F, T, E>(&self, unit: F) -> Result<T, RunError<E>>
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
    {
        self.run_inner(unit, None)
    }

    /// Like [`run`](Self::run), but each poll checkpoint also observes a
    /// supervisor-issued interrupt.
    ///
    /// When the flag is set the wait is abandoned with
    /// [`RunError::Interrupted`]. Abandoning the wait never cancels the
    /// unit; it keeps executing on the scheduler thread.
    pub fn run_interruptible<F, T, E>(
        &self,
        unit: F,
        interrupt: &InterruptFlag,
    ) -> Result<T, RunError<E>>
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
    {
        self.run_inner(unit, Some(interrupt))
    }

    fn run_inner<F, T, E>(
        &self,
        unit: F,
        interrupt: Option<&InterruptFlag>,
    ) -> Result<T, RunError<E>>
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
    {
        let invocation = Arc::new(Invocation::new());

        // Supervisory wrapper: the only code that touches the raw outcome.
        // It stores into exactly one slot and never lets a failure escape
        // into the scheduler's own bookkeeping.
        let inv = invocation.clone();
        let wrapper = async move {
            inv.set_state(InvocationState::Running);
            match AssertUnwindSafe(unit).catch_unwind().await {
                Ok(Ok(value)) => inv.complete(value),
                Ok(Err(error)) => inv.capture(Failure::Error(error)),
                Err(payload) => inv.capture(Failure::Panic(payload)),
            }
        };

        invocation.set_state(InvocationState::Submitted);
        let handle = self.scheduler.submit(wrapper)?;

        // Bounded-timeout wait loop. Each expiry is a checkpoint where
        // shutdown, scheduler death, or a supervisor interrupt can be
        // observed and the wait abandoned; the unit itself is never
        // stopped from here.
        loop {
            if handle.wait_timeout(self.poll_interval) {
                break;
            }
            if let Some(flag) = interrupt {
                if flag.is_set() {
                    drop(handle);
                    invocation.release_and_collect();
                    return Err(RunError::Interrupted);
                }
            }
            if !self.scheduler.is_running() {
                drop(handle);
                invocation.release_and_collect();
                let reason = if self.scheduler.is_dead() {
                    BridgeError::Died
                } else {
                    BridgeError::ShutDown
                };
                return Err(RunError::Bridge(reason));
            }
        }

        // The handle is gone before the outcome is inspected; nothing the
        // bridge keeps can reach the slots from here on.
        drop(handle);

        if let Some(failure) = invocation.take_failure() {
            invocation.release_and_collect();
            match failure {
                Failure::Error(error) => return Err(RunError::Task(error)),
                Failure::Panic(payload) => panic::resume_unwind(payload),
            }
        }

        if let Some(value) = invocation.take_result() {
            invocation.release_and_collect();
            return Ok(value);
        }

        // Neither slot populated: the unit was discarded before it produced
        // an outcome. Surface the scheduler's fate if it has one; a
        // spontaneous abort is an internal defect, never a silent default.
        invocation.set_state(InvocationState::Aborted);
        invocation.release_and_collect();
        if self.scheduler.is_dead() {
            Err(RunError::Bridge(BridgeError::Died))
        } else if !self.scheduler.is_running() {
            Err(RunError::Bridge(BridgeError::ShutDown))
        } else {
            Err(RunError::Aborted)
        }
    }
}
