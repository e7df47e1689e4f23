//! Invocation bridge behavior tests.
//!
//! Each caller must observe exactly its own unit's outcome, with the same
//! return/raise semantics as if the unit had executed in-line on the
//! calling thread.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use strand_bridge::{Bridge, BridgeError, InterruptFlag, RunError, SchedulerOptions, SchedulerThread};

/// Error type used by the test units; message comparison exercises the
/// classification-and-message guarantee of re-raised failures.
#[derive(Debug, PartialEq)]
struct UnitError {
    detail: String,
}

impl UnitError {
    fn new(detail: &str) -> Self {
        Self {
            detail: detail.to_string(),
        }
    }
}

impl fmt::Display for UnitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unit failed: {}", self.detail)
    }
}

impl std::error::Error for UnitError {}

fn spawn_bridge() -> Bridge {
    let scheduler = SchedulerThread::spawn(SchedulerOptions::default()).unwrap();
    Bridge::with_poll_interval(scheduler, Duration::from_millis(10))
}

#[test]
fn test_suspending_unit_returns_value() {
    let bridge = spawn_bridge();

    let result: Result<i32, RunError<UnitError>> = bridge.run(async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        Ok(42)
    });

    assert_eq!(result.unwrap(), 42);
    bridge.scheduler().shutdown();
}

#[test]
fn test_failing_unit_reraises_with_message() {
    let bridge = spawn_bridge();

    let result: Result<i32, RunError<UnitError>> =
        bridge.run(async { Err(UnitError::new("payload missing")) });

    match result {
        Err(RunError::Task(error)) => {
            assert_eq!(error, UnitError::new("payload missing"));
            assert_eq!(error.to_string(), "unit failed: payload missing");
        }
        other => panic!("expected task failure, got {:?}", other),
    }

    bridge.scheduler().shutdown();
}

#[test]
fn test_error_display_passes_through_run_error() {
    let bridge = spawn_bridge();

    let err = bridge
        .run::<_, i32, UnitError>(async { Err(UnitError::new("top of stack")) })
        .unwrap_err();

    // The re-raised failure reads exactly like the original.
    assert_eq!(err.to_string(), "unit failed: top of stack");
    bridge.scheduler().shutdown();
}

#[test]
fn test_panicking_unit_resumes_on_calling_thread() {
    let bridge = spawn_bridge();

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        let _: Result<i32, RunError<UnitError>> = bridge.run::<_, i32, UnitError>(async { panic!("boom") });
    }));

    let payload = outcome.unwrap_err();
    assert_eq!(payload.downcast_ref::<&str>(), Some(&"boom"));

    // The scheduler thread survives a unit panic; the bridge stays usable.
    let result: Result<i32, RunError<UnitError>> = bridge.run(async { Ok(7) });
    assert_eq!(result.unwrap(), 7);

    bridge.scheduler().shutdown();
}

#[test]
fn test_concurrent_callers_receive_own_outcome() {
    let bridge = spawn_bridge();

    let callers: Vec<_> = (0..20usize)
        .map(|index| {
            let bridge = bridge.clone();
            thread::spawn(move || {
                let sleep_ms = 1 + (index * 7) % 50;
                bridge.run::<_, usize, UnitError>(async move {
                    tokio::time::sleep(Duration::from_millis(sleep_ms as u64)).await;
                    Ok(index)
                })
            })
        })
        .collect();

    for (index, caller) in callers.into_iter().enumerate() {
        let result = caller.join().unwrap();
        assert_eq!(result.unwrap(), index, "caller {} got a foreign outcome", index);
    }

    bridge.scheduler().shutdown();
}

#[test]
fn test_sequential_reuse() {
    let bridge = spawn_bridge();

    for round in 0..25i64 {
        let value = bridge
            .run::<_, i64, UnitError>(async move { Ok(round * 2) })
            .unwrap();
        assert_eq!(value, round * 2);
    }

    bridge.scheduler().shutdown();
}

#[test]
fn test_run_after_shutdown_fails_fast() {
    let bridge = spawn_bridge();
    bridge.scheduler().shutdown();

    let start = Instant::now();
    let result: Result<i32, RunError<UnitError>> = bridge.run(async { Ok(1) });

    assert!(matches!(result, Err(RunError::Bridge(BridgeError::ShutDown))));
    assert!(start.elapsed() < Duration::from_secs(1), "must not hang");
}

#[test]
fn test_shutdown_resolves_in_flight_waiter() {
    let bridge = spawn_bridge();
    let scheduler = bridge.scheduler().clone();

    let caller = thread::spawn(move || {
        bridge.run::<_, i32, UnitError>(async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(1)
        })
    });

    // Let the unit reach its suspension point, then tear down.
    thread::sleep(Duration::from_millis(100));
    scheduler.shutdown();

    let result = caller.join().unwrap();
    assert!(result.unwrap_err().is_fatal());
}

#[test]
fn test_interrupt_abandons_wait() {
    let bridge = spawn_bridge();
    let flag = InterruptFlag::new();

    let remote = flag.clone();
    let supervisor = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        remote.set();
    });

    let start = Instant::now();
    let result = bridge.run_interruptible::<_, i32, UnitError>(
        async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(1)
        },
        &flag,
    );

    assert!(matches!(result, Err(RunError::Interrupted)));
    assert!(start.elapsed() < Duration::from_secs(5));

    supervisor.join().unwrap();
    bridge.scheduler().shutdown();
}

#[test]
fn test_interrupt_does_not_disturb_other_callers() {
    let bridge = spawn_bridge();
    let flag = InterruptFlag::new();
    flag.set();

    let interrupted = bridge.run_interruptible::<_, i32, UnitError>(
        async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(1)
        },
        &flag,
    );
    assert!(matches!(interrupted, Err(RunError::Interrupted)));

    // An unrelated invocation on the same scheduler still works.
    let value = bridge
        .run::<_, i32, UnitError>(async { Ok(99) })
        .unwrap();
    assert_eq!(value, 99);

    bridge.scheduler().shutdown();
}
