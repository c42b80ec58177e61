//! Errors raised by the crate itself.
//!
//! Stream errors are whatever `Err` type a pipeline carries; this type only
//! covers failures of the runtime around it (configuration, schedulers,
//! blocking waits).

use std::time::Duration;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RxError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RxError {
  #[error("schedulers are already configured")]
  AlreadyConfigured,

  #[error("invalid configuration value `{value}` for `{key}`")]
  InvalidConfig { key: String, value: String },

  #[error("scheduler `{name}` is unavailable: {reason}")]
  SchedulerUnavailable { name: &'static str, reason: String },

  #[error("timed out after {0:?}")]
  Timeout(Duration),
}
