//! Common plumbing for the retry action engines

use crate::task_result::TaskResult;
use std::{
    any::Any,
    sync::{
        atomic::{AtomicU8, Ordering::{Acquire, Release}},
        Mutex, MutexGuard, PoisonError,
    },
};
use thiserror::Error;


/// Shown in logs & thread names for actions whose [crate::RetryConfig] carries no id
pub(crate) const UNNAMED_ACTION: &str = "<unnamed>";


/// Lifecycle stage of a retry action.\
/// `Pending` holds from construction until the attempt loop finishes; `Success` &
/// `Failed` are terminal -- once reached, an action never transitions again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Status {
    /// The attempt loop has not finished -- or never will, if the job panicked
    /// (see [ActionError::Aborted])
    Pending = 0,
    /// The last executed attempt reported success
    Success = 1,
    /// The attempt budget was exhausted without a successful attempt
    Failed  = 2,
}

impl Status {
    fn from_u8(discriminant: u8) -> Self {
        match discriminant {
            0 => Status::Pending,
            1 => Status::Success,
            2 => Status::Failed,
            _ => panic!("BUG! the `retryer` crate stored an invalid status discriminant: {discriminant}"),
        }
    }
}


/// Failures of the action machinery itself -- as opposed to failures of the job, which
/// are reported through [TaskResult] and simply drive the retry loop.
#[derive(Error, Debug)]
pub enum ActionError {
    /// `start()` was called before a job was associated through `add_job()`
    #[error("no job was associated with this action before `start()`")]
    MissingJob,
    /// `start()` was called on an action that already started
    #[error("the action was already started")]
    AlreadyStarted,
    /// `join()` was called before `start()`, or a second time
    #[error("the action was not started (or was already joined)")]
    NotStarted,
    /// The OS refused to spawn the execution thread
    #[error("failed to spawn the action's execution thread: {0}")]
    Spawn(#[from] std::io::Error),
    /// `start()` was called from outside a tokio runtime
    #[cfg(feature = "async")]
    #[error("no tokio runtime is available to execute the action")]
    NoRuntime,
    /// The execution unit died before the attempt loop completed -- the tell-tale of a
    /// panicking job. The action is permanently stuck in [Status::Pending]: jobs are
    /// required to report failures through a failed [TaskResult], never by panicking.
    #[error("the action's execution was aborted before the attempt loop completed: {0}")]
    Aborted(String),
}


/// The state shared between an action's handle and its execution unit: the atomic
/// [Status], the most recent [TaskResult] and the diagnostics id.
pub(crate) struct ActionState<Output> {
    id:            Option<String>,
    status:        AtomicU8,
    last_response: Mutex<Option<TaskResult<Output>>>,
}

impl<Output> ActionState<Output> {

    pub fn new(id: Option<String>) -> Self {
        Self {
            id,
            status:        AtomicU8::new(Status::Pending as u8),
            last_response: Mutex::new(None),
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn loggable_id(&self) -> &str {
        self.id.as_deref().unwrap_or(UNNAMED_ACTION)
    }

    pub fn status(&self) -> Status {
        Status::from_u8(self.status.load(Acquire))
    }

    /// Publishes the terminal status. The `Release` store pairs with the `Acquire` load
    /// in [Self::status()]: a terminal status observed through the handle implies the
    /// response recorded before it is visible as well.
    pub fn complete(&self, status: Status) {
        self.status.store(status as u8, Release);
    }

    /// Records one attempt's outcome -- replacing any previous one, as only the most
    /// recent [TaskResult] is retained -- and tells whether that attempt succeeded
    pub fn record_attempt(&self, response: TaskResult<Output>) -> bool {
        let success = response.is_success();
        *self.lock_response() = Some(response);
        success
    }

    pub fn last_response(&self) -> Option<TaskResult<Output>>
                                   where Output: Clone {
        self.lock_response().clone()
    }

    fn lock_response(&self) -> MutexGuard<'_, Option<TaskResult<Output>>> {
        // a poisoned lock means some holder of the guard panicked; the stored value
        // is always a whole TaskResult, so keep serving it
        self.last_response.lock().unwrap_or_else(PoisonError::into_inner)
    }

}


/// Renders the payload of a caught panic -- from a joined execution thread -- into a
/// message suitable for [ActionError::Aborted]
pub(crate) fn panic_message(payload: Box<dyn Any + Send>) -> String {
    payload.downcast_ref::<&str>().map(|msg| msg.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| String::from("non-textual panic payload"))
}
