//! Resting place for [RetryAsyncAction].\
//! Keep this in sync with ../retry_action.rs


use crate::{
    config::{RetryConfig, DEFAULT_RETRY_COUNT, DEFAULT_WAIT_DURATION},
    retry_actions::common::{ActionError, ActionState, Status},
    task_result::TaskResult,
};
use std::{
    future::Future,
    marker::PhantomData,
    sync::Arc,
    time::Duration,
};
use tokio::{
    runtime::Handle,
    task::JoinHandle,
};
use log::info;


/// The async twin of [crate::retry_action::RetryAction]: a self-driving retry action
/// backed by a tokio task instead of an OS thread, sleeping through `tokio::time` so
/// the executor may run other tasks in-between attempts.\
/// Built & launched in one go by [crate::retry_async()]; may also be assembled by
/// hand: [Self::new()] -> [Self::add_job()] -> [Self::start()] -> [Self::join()].
///
/// The same no-cancellation contract applies: once started, the action drives itself
/// to completion and observers that give up on [Self::join()] never affect it.
pub struct RetryAsyncAction<Output,
                            AsyncJobFn:   FnMut() -> OutputFuture,
                            OutputFuture: Future<Output=TaskResult<Output>>> {
    state:         Arc<ActionState<Output>>,
    wait_duration: Option<Duration>,
    retry_count:   Option<i32>,
    job:           Option<AsyncJobFn>,
    handle:        Option<JoinHandle<()>>,
    started:       bool,
    _phantom:      PhantomData<fn() -> OutputFuture>,
}

impl<Output:       Send + 'static,
     AsyncJobFn:   FnMut() -> OutputFuture + Send + 'static,
     OutputFuture: Future<Output=TaskResult<Output>> + Send + 'static>

RetryAsyncAction<Output,
                 AsyncJobFn,
                 OutputFuture> {

    /// Builds the action in [Status::Pending], with no job and no task result yet,
    /// wiring identity, wait duration & retry budget from `config`
    pub fn new(config: &RetryConfig) -> Self {
        Self {
            state:         Arc::new(ActionState::new(config.id().map(str::to_owned))),
            wait_duration: config.wait_duration(),
            retry_count:   config.retry_count(),
            job:           None,
            handle:        None,
            started:       false,
            _phantom:      PhantomData,
        }
    }

    /// Associates the fallible async operation this action will drive.\
    /// Must be called before [Self::start()].
    pub fn add_job(&mut self, job: AsyncJobFn) {
        self.job = Some(job);
    }

    /// Spawns the execution task on the current tokio runtime and returns immediately,
    /// leaving the attempt loop to run on its own.\
    /// Fails with [ActionError::NoRuntime] when called from outside a runtime.
    pub fn start(&mut self) -> Result<(), ActionError> {
        if self.started {
            return Err(ActionError::AlreadyStarted);
        }
        let job = self.job.take().ok_or(ActionError::MissingJob)?;
        let runtime = Handle::try_current().map_err(|_| ActionError::NoRuntime)?;
        let state = Arc::clone(&self.state);
        self.handle = Some(runtime.spawn(attempt_loop(state, job, self.wait_duration, self.retry_count)));
        self.started = true;
        Ok(())
    }

    /// Suspends the caller until the action's execution task finishes.\
    /// An `Err` of [ActionError::Aborted] means the task died without completing the
    /// attempt loop -- the job panicked -- leaving the action permanently stuck in
    /// [Status::Pending]; the action's own progress is never affected by its observers.
    pub async fn join(&mut self) -> Result<(), ActionError> {
        let handle = self.handle.take().ok_or(ActionError::NotStarted)?;
        handle.await
            .map_err(|join_error| ActionError::Aborted(join_error.to_string()))
    }

    pub fn status(&self) -> Status {
        self.state.status()
    }

    /// The most recent attempt's [TaskResult] -- `None` before the first attempt
    /// completes.\
    /// Only meaningful once [Self::status()] reports a terminal value: check it first.
    pub fn execution_response(&self) -> Option<TaskResult<Output>>
                                        where Output: Clone {
        self.state.last_response()
    }

    pub fn action_id(&self) -> Option<&str> {
        self.state.id()
    }

}


/// The attempt loop -- runs as the action's own tokio task, resolving unset config
/// fields to the defaults and driving the job until success or budget exhaustion,
/// consulting nothing but the success flag of each [TaskResult]
async fn attempt_loop<Output,
                      AsyncJobFn:   FnMut() -> OutputFuture,
                      OutputFuture: Future<Output=TaskResult<Output>>>
                     (state:         Arc<ActionState<Output>>,
                      mut job:       AsyncJobFn,
                      wait_duration: Option<Duration>,
                      retry_count:   Option<i32>) {

    let wait_duration = wait_duration.unwrap_or(DEFAULT_WAIT_DURATION);
    let mut retries_left = retry_count.unwrap_or(DEFAULT_RETRY_COUNT);
    info!("Performing task '{}'", state.loggable_id());
    let mut success = state.record_attempt(job().await);
    while !success && retries_left > 0 {
        info!("Task '{}': retrying... attempts left: {retries_left}", state.loggable_id());
        tokio::time::sleep(wait_duration).await;
        success = state.record_attempt(job().await);
        retries_left -= 1;
    }
    let status = if success { Status::Success } else { Status::Failed };
    state.complete(status);
    info!("Task '{}' finished with status {:?}", state.loggable_id(), status);
}
