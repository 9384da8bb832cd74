//! Resting place for [RetryAction].\
//! Keep this in sync with ../retry_async_action.rs


use crate::{
    config::{RetryConfig, DEFAULT_RETRY_COUNT, DEFAULT_WAIT_DURATION},
    retry_actions::common::{panic_message, ActionError, ActionState, Status},
    task_result::TaskResult,
};
use std::{
    sync::Arc,
    thread::{self, JoinHandle},
    time::Duration,
};
use log::info;


/// A self-driving retry action backed by its own OS thread: once started, it repeatedly
/// invokes its job -- sleeping a fixed delay between attempts -- until one attempt
/// succeeds or the attempt budget is exhausted, then settles on a terminal [Status].\
/// Built & launched in one go by [crate::retry()]; may also be assembled by
/// hand: [Self::new()] -> [Self::add_job()] -> [Self::start()] -> [Self::join()].
///
/// Once started, the action drives itself to completion: there is no cancellation
/// channel and the inter-attempt sleep is not interruptible -- observers that give up
/// on [Self::join()] never affect the action's own progress.
pub struct RetryAction<Output,
                       JobFn: FnMut() -> TaskResult<Output>> {
    state:         Arc<ActionState<Output>>,
    wait_duration: Option<Duration>,
    retry_count:   Option<i32>,
    job:           Option<JobFn>,
    handle:        Option<JoinHandle<()>>,
    started:       bool,
}

impl<Output: Send + 'static,
     JobFn:  FnMut() -> TaskResult<Output> + Send + 'static>

RetryAction<Output,
            JobFn> {

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
        }
    }

    /// Associates the fallible operation this action will drive.\
    /// Must be called before [Self::start()].
    pub fn add_job(&mut self, job: JobFn) {
        self.job = Some(job);
    }

    /// Spawns the execution thread -- named after the action id -- and returns
    /// immediately, leaving the attempt loop to run on its own.
    pub fn start(&mut self) -> Result<(), ActionError> {
        if self.started {
            return Err(ActionError::AlreadyStarted);
        }
        let mut job = self.job.take().ok_or(ActionError::MissingJob)?;
        let state = Arc::clone(&self.state);
        let wait_duration = self.wait_duration;
        let retry_count = self.retry_count;
        let handle = thread::Builder::new()
            .name(format!("retry-action-{}", state.loggable_id()))
            .spawn(move || attempt_loop(&state, &mut job, wait_duration, retry_count))?;
        self.handle = Some(handle);
        self.started = true;
        Ok(())
    }

    /// Blocks the caller until the action's execution thread finishes.\
    /// An `Err` of [ActionError::Aborted] means the thread died without completing the
    /// attempt loop -- the job panicked -- leaving the action permanently stuck in
    /// [Status::Pending]; the action's own progress is never affected by its observers.
    pub fn join(&mut self) -> Result<(), ActionError> {
        let handle = self.handle.take().ok_or(ActionError::NotStarted)?;
        handle.join()
            .map_err(|panic_payload| ActionError::Aborted(panic_message(panic_payload)))
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


/// The attempt loop -- runs on the action's own thread, resolving unset config fields
/// to the defaults and driving the job until success or budget exhaustion, consulting
/// nothing but the success flag of each [TaskResult]
fn attempt_loop<Output,
                JobFn: FnMut() -> TaskResult<Output>>
               (state:         &ActionState<Output>,
                job:           &mut JobFn,
                wait_duration: Option<Duration>,
                retry_count:   Option<i32>) {

    let wait_duration = wait_duration.unwrap_or(DEFAULT_WAIT_DURATION);
    let mut retries_left = retry_count.unwrap_or(DEFAULT_RETRY_COUNT);
    info!("Performing task '{}'", state.loggable_id());
    let mut success = state.record_attempt(job());
    while !success && retries_left > 0 {
        info!("Task '{}': retrying... attempts left: {retries_left}", state.loggable_id());
        thread::sleep(wait_duration);
        success = state.record_attempt(job());
        retries_left -= 1;
    }
    let status = if success { Status::Success } else { Status::Failed };
    state.complete(status);
    info!("Task '{}' finished with status {:?}", state.loggable_id(), status);
}
