//! The dedicated thread driving the cooperative executor.

use crate::defaults::SHUTDOWN_JOIN_TIMEOUT;
use crate::error::BridgeError;
use crate::scheduler::{SchedulerOptions, SchedulingHandle};
use crate::sync::CompletionSignal;
use crossbeam::channel;
use parking_lot::Mutex;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// A unit boxed for the submission channel.
type BoxedUnit = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// State shared between the public API and the driving thread.
struct Shared {
    /// Submission side of the channel; taken on shutdown so later senders
    /// fail fast.
    submit_tx: Mutex<Option<UnboundedSender<BoxedUnit>>>,

    /// Set when the driving loop terminates without a shutdown request.
    dead: AtomicBool,

    /// Cleared by `shutdown`; checked before accepting submissions.
    running: AtomicBool,
}

/// Fires the completion signal when the wrapped unit finishes, or when it
/// is discarded without running to completion.
struct SignalOnDrop(Arc<CompletionSignal>);

impl Drop for SignalOnDrop {
    fn drop(&mut self) {
        self.0.notify();
    }
}

/// Process-wide scheduler thread.
///
/// Owns exactly one single-threaded executor and the dedicated OS thread
/// driving it. Any number of other threads may submit units concurrently;
/// the submission channel is the sole synchronization boundary, and only
/// the scheduler thread ever touches executor state.
pub struct SchedulerThread {
    shared: Arc<Shared>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl SchedulerThread {
    /// Spawn the scheduler thread and wait for its readiness signal.
    ///
    /// Fails with [`BridgeError::StartFailed`] if the thread cannot be
    /// spawned, the executor cannot be built, or readiness is not signaled
    /// within `options.start_timeout`.
    pub fn spawn(options: SchedulerOptions) -> Result<Arc<Self>, BridgeError> {
        let (submit_tx, submit_rx) = mpsc::unbounded_channel::<BoxedUnit>();
        let (ready_tx, ready_rx) = channel::bounded::<Result<(), String>>(1);

        let shared = Arc::new(Shared {
            submit_tx: Mutex::new(Some(submit_tx)),
            dead: AtomicBool::new(false),
            running: AtomicBool::new(true),
        });

        tracing::info!(thread = %options.thread_name, "starting scheduler thread");

        let thread_shared = shared.clone();
        let handle = thread::Builder::new()
            .name(options.thread_name.clone())
            .spawn(move || {
                Self::drive(submit_rx, ready_tx, thread_shared);
            })
            .map_err(|e| BridgeError::StartFailed(e.to_string()))?;

        match ready_rx.recv_timeout(options.start_timeout) {
            Ok(Ok(())) => {}
            Ok(Err(message)) => {
                shared.running.store(false, Ordering::Release);
                shared.submit_tx.lock().take();
                return Err(BridgeError::StartFailed(message));
            }
            Err(_) => {
                // Close the channel so the loop, if it ever comes up, exits
                // instead of running detached forever.
                shared.running.store(false, Ordering::Release);
                shared.submit_tx.lock().take();
                return Err(BridgeError::StartFailed(
                    "no readiness signal within start timeout".to_string(),
                ));
            }
        }

        tracing::info!("scheduler thread is running");

        Ok(Arc::new(Self {
            shared,
            handle: Mutex::new(Some(handle)),
        }))
    }

    /// Submit a unit for cooperative execution. Thread-safe and
    /// non-blocking for the caller.
    ///
    /// The returned handle fires when the unit completes, or when it is
    /// discarded without completing (shutdown, scheduler death). Fails fast
    /// with [`BridgeError::ShutDown`] after shutdown and
    /// [`BridgeError::Died`] once the driving loop has terminated
    /// unexpectedly.
    pub fn submit<F>(&self, unit: F) -> Result<SchedulingHandle, BridgeError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.shared.dead.load(Ordering::Acquire) {
            return Err(BridgeError::Died);
        }
        if !self.shared.running.load(Ordering::Acquire) {
            return Err(BridgeError::ShutDown);
        }

        let signal = CompletionSignal::new();
        let guard = SignalOnDrop(signal.clone());
        let wrapped: BoxedUnit = Box::pin(async move {
            let _guard = guard;
            unit.await;
        });

        match self.shared.submit_tx.lock().as_ref() {
            Some(tx) => {
                if tx.send(wrapped).is_err() {
                    // Receiver gone while still nominally running: the
                    // driving loop is no longer there to execute anything.
                    self.shared.dead.store(true, Ordering::Release);
                    return Err(BridgeError::Died);
                }
            }
            None => return Err(BridgeError::ShutDown),
        }

        Ok(SchedulingHandle::new(signal))
    }

    /// Whether the scheduler accepts submissions.
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire) && !self.is_dead()
    }

    /// Whether the driving loop terminated unexpectedly.
    pub fn is_dead(&self) -> bool {
        self.shared.dead.load(Ordering::Acquire)
    }

    /// Stop the scheduler thread. Idempotent.
    ///
    /// Closes the submission channel, which ends the driving loop; dropping
    /// the executor cancels outstanding units, so their completion signals
    /// still fire and no waiter hangs.
    pub fn shutdown(&self) {
        if !self.shared.running.swap(false, Ordering::AcqRel) {
            return;
        }

        tracing::info!("stopping scheduler thread");

        // Closing the channel makes the driving loop exit once the queue
        // drains.
        self.shared.submit_tx.lock().take();

        if let Some(handle) = self.handle.lock().take() {
            Self::join_with_timeout(handle, SHUTDOWN_JOIN_TIMEOUT);
        }

        tracing::info!("scheduler thread stopped");
    }

    /// Join a thread with a bound, detaching it if stuck.
    fn join_with_timeout(handle: JoinHandle<()>, timeout: Duration) {
        let start = Instant::now();
        loop {
            if handle.is_finished() {
                let _ = handle.join();
                return;
            }
            if start.elapsed() > timeout {
                drop(handle);
                return;
            }
            thread::sleep(Duration::from_millis(5));
        }
    }

    /// Body of the dedicated thread: build the executor, signal readiness,
    /// then spawn every submitted unit until the channel closes.
    fn drive(
        mut submit_rx: UnboundedReceiver<BoxedUnit>,
        ready_tx: channel::Sender<Result<(), String>>,
        shared: Arc<Shared>,
    ) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(e) => {
                    let _ = ready_tx.send(Err(e.to_string()));
                    return;
                }
            };

            runtime.block_on(async move {
                let _ = ready_tx.send(Ok(()));

                // Every spawned unit is interleaved cooperatively on this
                // thread; the recv itself suspends between submissions.
                while let Some(unit) = submit_rx.recv().await {
                    tokio::spawn(unit);
                }
            });

            // Dropping the runtime here cancels still-pending units; their
            // signal-on-drop guards fire as the tasks are dropped.
        }));

        if outcome.is_err() || shared.running.load(Ordering::Acquire) {
            // The loop ended without a shutdown request. Mark the scheduler
            // dead so subsequent and in-flight submissions fail immediately.
            shared.dead.store(true, Ordering::Release);
            shared.submit_tx.lock().take();
            tracing::error!("scheduler thread terminated unexpectedly");
        }
    }
}

impl Drop for SchedulerThread {
    fn drop(&mut self) {
        self.shutdown();
    }
}
