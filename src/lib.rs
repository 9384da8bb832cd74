#![doc = include_str!("../README.md")]

mod task_result;
pub use task_result::*;

mod config;
pub use config::*;

mod retry_actions;
pub use retry_actions::*;

mod retryer;
pub use retryer::*;
