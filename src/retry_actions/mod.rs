//! Contains the retry action engines for both sync & async contexts.\
//! See [retry_action] and [retry_async_action].


mod common;
pub use common::*;

pub mod retry_action;
#[cfg(feature = "async")]
pub mod retry_async_action;
