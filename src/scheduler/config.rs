use std::{num::NonZeroUsize, str::FromStr, time::Duration};

use crate::error::{Result, RxError};

pub const ENV_COMPUTATION_THREADS: &str = "RXCORE_COMPUTATION_THREADS";
pub const ENV_IO_MAX_THREADS: &str = "RXCORE_IO_MAX_THREADS";
pub const ENV_IO_KEEP_ALIVE_MS: &str = "RXCORE_IO_KEEP_ALIVE_MS";
pub const ENV_THREAD_NAME_PREFIX: &str = "RXCORE_THREAD_NAME_PREFIX";

/// Sizing of the shared schedulers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
  pub computation_threads: usize,
  pub io_max_threads: usize,
  /// How long an idle io thread is kept before it exits.
  pub io_keep_alive: Duration,
  pub thread_name_prefix: String,
}

impl Default for SchedulerConfig {
  fn default() -> Self {
    SchedulerConfig {
      computation_threads: std::thread::available_parallelism().map_or(1, NonZeroUsize::get),
      io_max_threads: 512,
      io_keep_alive: Duration::from_secs(60),
      thread_name_prefix: "rxcore".to_owned(),
    }
  }
}

impl SchedulerConfig {
  pub fn computation_threads(mut self, n: usize) -> Self {
    self.computation_threads = n;
    self
  }

  pub fn io_max_threads(mut self, n: usize) -> Self {
    self.io_max_threads = n;
    self
  }

  pub fn io_keep_alive(mut self, keep_alive: Duration) -> Self {
    self.io_keep_alive = keep_alive;
    self
  }

  pub fn thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
    self.thread_name_prefix = prefix.into();
    self
  }

  /// Defaults overridden by the `RXCORE_*` environment variables.
  pub fn from_env() -> Result<Self> { Self::from_lookup(|key| std::env::var(key).ok()) }

  /// Defaults overridden by whatever `lookup` returns for each key.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let mut config = SchedulerConfig::default();
    if let Some(n) = parse(&lookup, ENV_COMPUTATION_THREADS)? {
      config.computation_threads = n;
    }
    if let Some(n) = parse(&lookup, ENV_IO_MAX_THREADS)? {
      config.io_max_threads = n;
    }
    if let Some(ms) = parse::<u64>(&lookup, ENV_IO_KEEP_ALIVE_MS)? {
      config.io_keep_alive = Duration::from_millis(ms);
    }
    if let Some(prefix) = lookup(ENV_THREAD_NAME_PREFIX) {
      config.thread_name_prefix = prefix;
    }
    config.validate()?;
    Ok(config)
  }

  pub fn validate(&self) -> Result<()> {
    if self.computation_threads == 0 {
      return Err(invalid(ENV_COMPUTATION_THREADS, "0"));
    }
    if self.io_max_threads == 0 {
      return Err(invalid(ENV_IO_MAX_THREADS, "0"));
    }
    Ok(())
  }
}

fn parse<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>> {
  match lookup(key) {
    None => Ok(None),
    Some(raw) => raw.trim().parse().map(Some).map_err(|_| invalid(key, &raw)),
  }
}

fn invalid(key: &str, value: &str) -> RxError {
  RxError::InvalidConfig { key: key.to_owned(), value: value.to_owned() }
}
