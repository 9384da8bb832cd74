#![cfg(feature = "async")]

//! The async twin of `use_cases.rs`: drives the tokio-task-backed retry engine through
//! the same outcomes, plus the concurrency guarantees that only make sense here --
//! independent actions progressing simultaneously on one runtime.

use retryer::{
    retry_async_action::RetryAsyncAction,
    ActionError, RetryConfig, Status, TaskResult,
    DEFAULT_RETRY_COUNT,
};
use std::{
    sync::{
        atomic::{AtomicU32, Ordering::Relaxed},
        Arc,
    },
    time::{Duration, Instant},
};
use futures::future::join_all;


/// Short enough to keep the suite fast, long enough to be a real sleep
const TEST_WAIT: Duration = Duration::from_millis(10);


#[ctor::ctor]
fn setup_logger() {
    simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Debug)
        .init()
        .expect("could not install the test logger");
}


/// Scenario: the async job fails on calls 1 to 3, then succeeds (with 42) on call 4.
#[tokio::test]
async fn recovers_within_the_attempt_budget() {
    let invocations = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&invocations);
    let job = move || {
        let counter = Arc::clone(&counter);
        async move {
            let attempt = counter.fetch_add(1, Relaxed) + 1;
            if attempt < 4 {
                TaskResult::from_failure(-1)
            } else {
                TaskResult::from_success(42)
            }
        }
    };
    let config = RetryConfig::new()
        .with_id("recovering-async-task")
        .with_retry_count(3)
        .with_wait_duration(TEST_WAIT);
    let response = retryer::retry_async_and_get_response(job, &config).await
        .expect("the action should have started")
        .expect("a task result should have been recorded");
    assert!(response.is_success(), "the 4th attempt should have succeeded");
    assert_eq!(*response.result(), 42);
    assert_eq!(invocations.load(Relaxed), 4, "expected 1 initial attempt + 3 retries");
}

/// Scenario: the async job never succeeds and the budget allows 2 extra attempts.
#[tokio::test]
async fn gives_up_after_exhausting_the_budget() {
    let invocations = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&invocations);
    let job = move || {
        let counter = Arc::clone(&counter);
        async move {
            let attempt = counter.fetch_add(1, Relaxed) + 1;
            TaskResult::from_failure(attempt as i32)
        }
    };
    let config = RetryConfig::new()
        .with_id("doomed-async-task")
        .with_retry_count(2)
        .with_wait_duration(TEST_WAIT);
    let mut action = retryer::retry_async(job, &config)
        .expect("the action should have started");
    action.join().await
        .expect("the action should have run to completion");
    assert_eq!(action.status(), Status::Failed);
    let response = action.execution_response()
        .expect("a task result should have been recorded");
    assert!(!response.is_success());
    assert_eq!(*response.result(), 3, "the retained response should be the last attempt's");
    assert_eq!(invocations.load(Relaxed), 3, "expected 1 initial attempt + 2 retries");
}

/// Unset config fields fall back to the documented defaults here as well.
#[tokio::test]
async fn unset_retry_count_falls_back_to_the_default() {
    let invocations = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&invocations);
    let job = move || {
        let counter = Arc::clone(&counter);
        async move {
            counter.fetch_add(1, Relaxed);
            TaskResult::from_failure(-1)
        }
    };
    let config = RetryConfig::new().with_wait_duration(Duration::ZERO);
    _ = retryer::retry_async_and_get_response(job, &config).await
        .expect("the action should have started");
    assert_eq!(invocations.load(Relaxed), 1 + DEFAULT_RETRY_COUNT as u32);
}

/// Several actions launched from one runtime progress simultaneously & independently:
/// each needs 2 re-attempts 100ms apart, yet the batch finishes in far less than the
/// sum of the sequential latencies.
#[tokio::test]
async fn actions_run_concurrently_and_independently() {
    const ACTIONS: u32 = 4;
    let start = Instant::now();
    let mut actions: Vec<_> = (0..ACTIONS)
        .map(|index| {
            let invocations = Arc::new(AtomicU32::new(0));
            let job = move || {
                let invocations = Arc::clone(&invocations);
                async move {
                    if invocations.fetch_add(1, Relaxed) + 1 < 3 {
                        TaskResult::from_failure(u32::MAX)
                    } else {
                        TaskResult::from_success(index)
                    }
                }
            };
            let config = RetryConfig::new()
                .with_id(format!("concurrent-task-{index}"))
                .with_retry_count(2)
                .with_wait_duration(Duration::from_millis(100));
            retryer::retry_async(job, &config)
                .expect("the action should have started")
        })
        .collect();
    let join_results = join_all(actions.iter_mut().map(|action| action.join())).await;
    let elapsed = start.elapsed();
    for join_result in join_results {
        join_result.expect("every action should have run to completion");
    }
    for (index, action) in actions.iter().enumerate() {
        assert_eq!(action.status(), Status::Success, "action {index} should have succeeded");
        let response = action.execution_response()
            .expect("a task result should have been recorded");
        assert_eq!(*response.result(), index as u32, "actions must not share state");
    }
    assert!(elapsed < Duration::from_millis(700),
            "4 actions x 2 sleeps of 100ms each should overlap, yet the batch took {elapsed:?}");
}

/// The documented panicking-job contract, async flavor: the execution task dies
/// mid-sequence, the status is stuck in `Pending` and `join()` reports the abort.
#[tokio::test]
async fn a_panicking_job_leaves_the_action_stuck_pending() {
    async fn exploding_job() -> TaskResult<i32> {
        panic!("the job blew up instead of reporting a failed TaskResult")
    }
    let config = RetryConfig::new().with_id("exploding-async-task");
    let mut action = retryer::retry_async(exploding_job, &config)
        .expect("the action should have started");
    match action.join().await {
        Err(ActionError::Aborted(msg)) => assert!(msg.contains("panic"), "the abort should describe the panic; got '{msg}'"),
        other => panic!("join() should have reported the abort; got {other:?}"),
    }
    assert_eq!(action.status(), Status::Pending);
    assert_eq!(action.execution_response(), None);
}

/// Starting an async action requires a runtime -- reported, not panicked on.
#[test]
fn no_runtime_is_reported_not_panicked() {
    async fn job() -> TaskResult<i32> {
        TaskResult::from_success(0)
    }
    let mut action = RetryAsyncAction::new(&RetryConfig::new());
    action.add_job(job);
    assert!(matches!(action.start(), Err(ActionError::NoRuntime)));
}
