//! Bridge error types.

/// Fatal scheduler-thread errors.
///
/// None of these are retried internally; retry policy belongs to the
/// collaborator that submitted the work.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// The scheduler thread could not be spawned, or did not signal
    /// readiness within the start timeout.
    #[error("scheduler thread failed to start: {0}")]
    StartFailed(String),

    /// Submission attempted after `shutdown`.
    #[error("scheduler thread has been shut down")]
    ShutDown,

    /// The scheduler thread's driving loop terminated unexpectedly.
    #[error("scheduler thread terminated unexpectedly")]
    Died,
}

/// Why a bridged invocation did not produce a value.
#[derive(Debug, thiserror::Error)]
pub enum RunError<E> {
    /// The unit itself failed; the original error value is preserved.
    #[error("{0}")]
    Task(E),

    /// The scheduler thread is unavailable.
    #[error(transparent)]
    Bridge(#[from] BridgeError),

    /// The unit was discarded before it recorded an outcome.
    #[error("invocation aborted before an outcome was recorded")]
    Aborted,

    /// The wait was abandoned by a supervisor-issued interrupt. The unit
    /// keeps executing on the scheduler thread.
    #[error("invocation wait interrupted")]
    Interrupted,
}

impl<E> RunError<E> {
    /// Return the unit's own error, if this is a task failure.
    pub fn into_task(self) -> Option<E> {
        match self {
            RunError::Task(error) => Some(error),
            _ => None,
        }
    }

    /// True when the scheduler thread is gone for good and no further
    /// submission can succeed.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            RunError::Bridge(BridgeError::ShutDown) | RunError::Bridge(BridgeError::Died)
        )
    }
}
