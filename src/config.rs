//! Resting place for [RetryConfig] & the retrying defaults


use std::time::Duration;


/// Delay between attempts for configs that don't set [RetryConfig::with_wait_duration()]
pub const DEFAULT_WAIT_DURATION: Duration = Duration::from_millis(1000);

/// Number of extra attempts for configs that don't set [RetryConfig::with_retry_count()]
pub const DEFAULT_RETRY_COUNT: i32 = 3;


/// The caller-provided knobs for a retry action -- a plain value holder with no behavior
/// of its own: unset fields are resolved to [DEFAULT_WAIT_DURATION] / [DEFAULT_RETRY_COUNT]
/// by the attempt loop itself, when it first runs.\
/// Read-only to the engine; build it with the chainable `with_*()` setters:
/// ```nocompile
///     let config = RetryConfig::new()
///         .with_id("flaky-probe")
///         .with_wait_duration(Duration::from_millis(500))
///         .with_retry_count(5);
#[derive(Debug, Clone, Default)]
pub struct RetryConfig {
    id:            Option<String>,
    wait_duration: Option<Duration>,
    retry_count:   Option<i32>,
}

impl RetryConfig {

    pub fn new() -> Self {
        Self::default()
    }

    /// (Optional) names the action -- used to denote the task in log messages and in
    /// the name of the execution thread
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// (Optional) the fixed delay to sleep between consecutive attempts.\
    /// A zero duration disables the effective delay, but the sleep call still happens
    /// (a cooperative yield point).
    pub fn with_wait_duration(mut self, wait_duration: Duration) -> Self {
        self.wait_duration = Some(wait_duration);
        self
    }

    /// (Optional) the number of *extra* attempts allowed after the first one -- the
    /// attempt loop runs `1 + max(retry_count, 0)` attempts at most.\
    /// Negative values behave as zero.
    pub fn with_retry_count(mut self, retry_count: i32) -> Self {
        self.retry_count = Some(retry_count);
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn wait_duration(&self) -> Option<Duration> {
        self.wait_duration
    }

    pub fn retry_count(&self) -> Option<i32> {
        self.retry_count
    }

}
