//! Strand bridge: synchronous entry into a shared cooperative scheduler.
//!
//! Many ordinary worker threads each hand a unit of asynchronous work to a
//! single process-wide scheduler thread and block for its outcome, as if the
//! work had run in-line. The crate provides:
//! - A scheduler thread driving one single-threaded cooperative executor
//! - A blocking invocation bridge with synchronous return/raise semantics
//! - Explicit outcome containment so failed invocations retain no memory
//! - Lifecycle hooks for the surrounding worker runtime

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod bridge;
pub mod defaults;
pub mod error;
pub mod invocation;
pub mod lifecycle;
pub mod scheduler;
pub mod sync;

pub use bridge::Bridge;
pub use defaults::{DEFAULT_POLL_INTERVAL, DEFAULT_START_TIMEOUT};
pub use error::{BridgeError, RunError};
pub use invocation::{Failure, Invocation, InvocationState};
pub use scheduler::{SchedulerOptions, SchedulerThread, SchedulingHandle};
pub use sync::{CompletionSignal, InterruptFlag};
