//! Invocation state and outcome containment.
//!
//! One `Invocation` exists per bridged call. Its outcome lives in an
//! explicit tagged pair of slots rather than behind the scheduling
//! primitive's own result accessor, so the bridge controls exactly when a
//! captured failure is dropped instead of depending on another object's
//! collection timing.

use parking_lot::Mutex;
use std::any::Any;

/// State of an invocation, from creation to cleanup.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum InvocationState {
    /// Just created, not yet handed to the scheduler thread.
    Created,
    /// Enqueued for cooperative execution.
    Submitted,
    /// Currently executing on the scheduler thread.
    Running,
    /// Finished with a value in the result slot.
    CompletedOk,
    /// Finished with a captured failure in the failure slot.
    CompletedError,
    /// Discarded before recording an outcome.
    Aborted,
    /// Both slots emptied; terminal. An invocation is never reused.
    Cleaned,
}

/// A failure captured as one atomic unit.
///
/// Holding the original value (or panic payload) keeps its classification,
/// message, and source chain intact for re-raising on the calling thread.
pub enum Failure<E> {
    /// The unit returned an error value.
    Error(E),
    /// The unit panicked; the payload is preserved for `resume_unwind`.
    Panic(Box<dyn Any + Send + 'static>),
}

impl<E> Failure<E> {
    /// Short classification of the failure, for log events.
    pub fn kind(&self) -> &'static str {
        match self {
            Failure::Error(_) => "error",
            Failure::Panic(_) => "panic",
        }
    }
}

/// One bridged call, end to end.
///
/// At most one of the two slots is ever populated. The supervisory wrapper
/// is the only writer; the bridge's wait loop is the only reader.
pub struct Invocation<T, E> {
    /// Current state.
    state: Mutex<InvocationState>,

    /// Result slot; populated on success, at most once.
    result: Mutex<Option<T>>,

    /// Failure slot; populated on error or panic, at most once.
    failure: Mutex<Option<Failure<E>>>,
}

impl<T, E> Invocation<T, E> {
    /// Create a fresh invocation in the `Created` state.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(InvocationState::Created),
            result: Mutex::new(None),
            failure: Mutex::new(None),
        }
    }

    /// Get the current state.
    pub fn state(&self) -> InvocationState {
        *self.state.lock()
    }

    /// Set the current state.
    pub fn set_state(&self, state: InvocationState) {
        *self.state.lock() = state;
    }

    /// Record a successful outcome.
    pub fn complete(&self, value: T) {
        *self.result.lock() = Some(value);
        self.set_state(InvocationState::CompletedOk);
    }

    /// Capture a failure into the failure slot as one atomic unit.
    ///
    /// The slot is the only place in the bridge that holds the captured
    /// value; the scheduling handle and the scheduler's bookkeeping keep no
    /// second reference to the same graph.
    pub fn capture(&self, failure: Failure<E>) {
        *self.failure.lock() = Some(failure);
        self.set_state(InvocationState::CompletedError);
    }

    /// Move the result out, leaving the slot empty.
    pub fn take_result(&self) -> Option<T> {
        self.result.lock().take()
    }

    /// Move the captured failure out, leaving the slot empty.
    pub fn take_failure(&self) -> Option<Failure<E>> {
        self.failure.lock().take()
    }

    /// True if either slot still holds an outcome.
    pub fn has_outcome(&self) -> bool {
        self.result.lock().is_some() || self.failure.lock().is_some()
    }

    /// Empty both slots, dropping whatever they still hold, and mark the
    /// invocation `Cleaned`.
    ///
    /// The drop happens synchronously, before control returns to the
    /// caller; reclamation never waits for a later collection cycle.
    pub fn release_and_collect(&self) {
        let result = self.result.lock().take();
        drop(result);
        let failure = self.failure.lock().take();
        drop(failure);
        self.set_state(InvocationState::Cleaned);
    }
}

impl<T, E> Default for Invocation<T, E> {
    fn default() -> Self {
        Self::new()
    }
}
