//! Orchestration entry points -- the process-wide front door for launching retry
//! actions.\
//! There is no state to hold here, so the access point is a set of module-level
//! functions rather than a shared instance: each call builds an action from the given
//! [RetryConfig], wires the job in, starts it and either hands the handle back
//! (non-blocking shape) or waits for it and returns the final [TaskResult]
//! (blocking shape).


use crate::{
    config::RetryConfig,
    retry_actions::{ActionError, UNNAMED_ACTION},
    retry_actions::retry_action::RetryAction,
    task_result::TaskResult,
};
use log::error;

#[cfg(feature = "async")]
use crate::retry_actions::retry_async_action::RetryAsyncAction;
#[cfg(feature = "async")]
use std::future::Future;


/// Builds a [RetryAction] from `config`, associates `job` & starts it, handing the
/// handle back immediately -- the non-blocking call shape.\
/// The caller may poll [RetryAction::status()], read
/// [RetryAction::execution_response()] once terminal, or [RetryAction::join()], all
/// at leisure -- the action drives itself regardless.
pub fn retry<Output: Send + 'static,
             JobFn:  FnMut() -> TaskResult<Output> + Send + 'static>
            (job:    JobFn,
             config: &RetryConfig)
            -> Result<RetryAction<Output, JobFn>, ActionError> {

    let mut action = RetryAction::new(config);
    action.add_job(job);
    action.start()?;
    Ok(action)
}

/// Launches the retry action as [retry()] does, then blocks the caller until it
/// finishes, returning its final [TaskResult] -- the blocking call shape.\
/// A failed join -- the job panicked; see [ActionError::Aborted] -- is logged &
/// swallowed: the caller receives whatever response was recorded, usually `None`.\
/// `Err` is only returned when the action could not be started at all.
pub fn retry_and_get_response<Output: Clone + Send + 'static,
                              JobFn:  FnMut() -> TaskResult<Output> + Send + 'static>
                             (job:    JobFn,
                              config: &RetryConfig)
                             -> Result<Option<TaskResult<Output>>, ActionError> {

    let mut action = retry(job, config)?;
    if let Err(abort) = action.join() {
        error!("Task '{}': completion was not witnessed: {abort}", action.action_id().unwrap_or(UNNAMED_ACTION));
    }
    Ok(action.execution_response())
}

/// The async twin of [retry()]: builds a [RetryAsyncAction] from `config`, associates
/// `job` & starts it on the current tokio runtime, handing the handle back immediately.
#[cfg(feature = "async")]
pub fn retry_async<Output:       Send + 'static,
                   AsyncJobFn:   FnMut() -> OutputFuture + Send + 'static,
                   OutputFuture: Future<Output=TaskResult<Output>> + Send + 'static>
                  (job:    AsyncJobFn,
                   config: &RetryConfig)
                  -> Result<RetryAsyncAction<Output, AsyncJobFn, OutputFuture>, ActionError> {

    let mut action = RetryAsyncAction::new(config);
    action.add_job(job);
    action.start()?;
    Ok(action)
}

/// The async twin of [retry_and_get_response()]: suspends -- rather than blocks --
/// the caller until the action finishes, with the same swallow-and-log treatment for
/// joins that fail.
#[cfg(feature = "async")]
pub async fn retry_async_and_get_response<Output:       Clone + Send + 'static,
                                          AsyncJobFn:   FnMut() -> OutputFuture + Send + 'static,
                                          OutputFuture: Future<Output=TaskResult<Output>> + Send + 'static>
                                         (job:    AsyncJobFn,
                                          config: &RetryConfig)
                                         -> Result<Option<TaskResult<Output>>, ActionError> {

    let mut action = retry_async(job, config)?;
    if let Err(abort) = action.join().await {
        error!("Task '{}': completion was not witnessed: {abort}", action.action_id().unwrap_or(UNNAMED_ACTION));
    }
    Ok(action.execution_response())
}
