//! Scheduler abstraction: where and when tasks run.
//!
//! A [`Task`] is a small state machine. Each time it runs it reports whether
//! it is [`TaskState::Finished`] or wants to run again after a delay
//! ([`TaskState::Sleeping`]); periodic work is a task that keeps sleeping.
//! Scheduling returns a [`TaskHandle`], which is a [`Subscription`]:
//! cancelling it keeps the task from running again.
//!
//! | Scheduler | Runs on |
//! |-----------|---------|
//! | [`ImmediateScheduler`] | the calling thread |
//! | [`ThreadPoolScheduler`] | a bounded `futures` thread pool (`computation`, `single`) or any external `Spawn` |
//! | [`ElasticScheduler`] | a growing pool of blocking threads (`io`) |
//! | [`TestScheduler`] | virtual time, driven by the test |

use std::{
  future::Future,
  sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
  },
  time::Duration,
};

use futures::future::{AbortHandle, BoxFuture};
use once_cell::sync::{Lazy, OnceCell};

use crate::{error::RxError, subscription::Subscription};

mod config;
mod elastic;
mod immediate;
mod test_scheduler;
mod thread_pool_scheduler;
mod thread_scheduler;

pub use config::{
  SchedulerConfig, ENV_COMPUTATION_THREADS, ENV_IO_KEEP_ALIVE_MS, ENV_IO_MAX_THREADS,
  ENV_THREAD_NAME_PREFIX,
};
pub use elastic::ElasticScheduler;
pub use immediate::ImmediateScheduler;
pub use test_scheduler::TestScheduler;
pub use thread_pool_scheduler::ThreadPoolScheduler;
pub use thread_scheduler::NewThreadSpawner;

// ==================== Task ====================

/// What a task wants after one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
  Finished,
  /// Run again once the duration has elapsed.
  Sleeping(Duration),
}

/// A unit of work submitted to a [`Scheduler`].
pub struct Task(Box<dyn FnMut() -> TaskState + Send>);

impl Task {
  pub fn new(f: impl FnMut() -> TaskState + Send + 'static) -> Self { Task(Box::new(f)) }

  /// A task that runs `f` once.
  pub fn once(f: impl FnOnce() + Send + 'static) -> Self {
    let mut f = Some(f);
    Task::new(move || {
      if let Some(f) = f.take() {
        f();
      }
      TaskState::Finished
    })
  }

  #[inline]
  pub fn step(&mut self) -> TaskState { (self.0)() }
}

// ==================== TaskHandle ====================

/// Cancellation handle of a scheduled task.
///
/// Closed once the task finished or was cancelled. Cancelling a task that is
/// currently running lets that run complete; it just never runs again.
#[derive(Clone, Default)]
pub struct TaskHandle(Arc<HandleInner>);

#[derive(Default)]
struct HandleInner {
  closed: AtomicBool,
  abort: OnceCell<AbortHandle>,
}

impl TaskHandle {
  pub fn new() -> Self { Self::default() }

  /// A handle for work that already ran to completion.
  pub fn finished() -> Self {
    let handle = Self::default();
    handle.mark_finished();
    handle
  }

  /// Use `abort` to drop the driving future as soon as the handle is
  /// cancelled (for example while it waits on a timer).
  pub(crate) fn with_abort(abort: AbortHandle) -> Self {
    let handle = Self::default();
    let _ = handle.0.abort.set(abort);
    handle
  }

  pub fn mark_finished(&self) { self.0.closed.store(true, Ordering::Release); }
}

impl Subscription for TaskHandle {
  fn unsubscribe(self) {
    if !self.0.closed.swap(true, Ordering::AcqRel) {
      tracing::trace!("scheduled task cancelled");
      if let Some(abort) = self.0.abort.get() {
        abort.abort();
      }
    }
  }

  #[inline]
  fn is_closed(&self) -> bool { self.0.closed.load(Ordering::Acquire) }
}

// ==================== Scheduler ====================

/// An execution context tasks can be submitted to from any thread.
pub trait Scheduler: Clone + Send + Sync + 'static {
  /// Runs `task` after `delay` (or as soon as possible), and again after
  /// every `TaskState::Sleeping` it reports, until it finishes or the
  /// returned handle is cancelled.
  fn schedule(&self, task: Task, delay: Option<Duration>) -> TaskHandle;

  fn schedule_now(&self, f: impl FnOnce() + Send + 'static) -> TaskHandle {
    self.schedule(Task::once(f), None)
  }

  fn schedule_after(&self, delay: Duration, f: impl FnOnce() + Send + 'static) -> TaskHandle {
    self.schedule(Task::once(f), Some(delay))
  }

  /// Runs `f(0)`, `f(1)`, ... first after `initial_delay`, then every
  /// `period`.
  fn schedule_periodic(
    &self,
    initial_delay: Duration,
    period: Duration,
    mut f: impl FnMut(usize) + Send + 'static,
  ) -> TaskHandle {
    let mut count = 0;
    let task = Task::new(move || {
      f(count);
      count += 1;
      TaskState::Sleeping(period)
    });
    self.schedule(task, Some(initial_delay))
  }

  /// Drives a future to completion in this context. The default blocks one
  /// run of a task on it; async-capable schedulers override this.
  fn spawn_future(&self, fut: BoxFuture<'static, ()>) -> TaskHandle {
    self.schedule_now(move || futures::executor::block_on(fut))
  }
}

/// Shared stepping loop of the async-backed schedulers.
pub(crate) async fn run_task<F, Fut>(
  mut task: Task,
  handle: TaskHandle,
  mut delay: Option<Duration>,
  sleep: F,
) where
  F: Fn(Duration) -> Fut,
  Fut: Future,
{
  loop {
    if let Some(d) = delay.take().filter(|d| !d.is_zero()) {
      sleep(d).await;
    }
    if handle.is_closed() {
      return;
    }
    match task.step() {
      TaskState::Finished => {
        handle.mark_finished();
        return;
      }
      TaskState::Sleeping(d) => delay = Some(d),
    }
  }
}

// ==================== Schedulers registry ====================

static CONFIG: OnceCell<SchedulerConfig> = OnceCell::new();

fn config() -> &'static SchedulerConfig {
  CONFIG.get_or_init(|| {
    SchedulerConfig::from_env().unwrap_or_else(|err| {
      tracing::warn!(%err, "ignoring scheduler environment, using defaults");
      SchedulerConfig::default()
    })
  })
}

static COMPUTATION: Lazy<ThreadPoolScheduler> = Lazy::new(|| {
  let cfg = config();
  ThreadPoolScheduler::new("computation", cfg.computation_threads, &cfg.thread_name_prefix)
    .unwrap_or_else(fallback_pool)
});

static SINGLE: Lazy<ThreadPoolScheduler> = Lazy::new(|| {
  ThreadPoolScheduler::new("single", 1, &config().thread_name_prefix).unwrap_or_else(fallback_pool)
});

static IO: Lazy<ElasticScheduler> = Lazy::new(|| {
  ElasticScheduler::new(config()).unwrap_or_else(|err| {
    tracing::error!(%err, "falling back to a thread per io task");
    ElasticScheduler::threads()
  })
});

fn fallback_pool(err: RxError) -> ThreadPoolScheduler {
  tracing::error!(%err, "falling back to a thread per task");
  ThreadPoolScheduler::from_spawner(NewThreadSpawner::default())
}

/// Access to the process-wide schedulers.
pub struct Schedulers;

impl Schedulers {
  /// Installs `config` for the shared schedulers. Must run before any of
  /// them is first used.
  pub fn configure(config: SchedulerConfig) -> crate::error::Result<()> {
    config.validate()?;
    tracing::debug!(?config, "configuring schedulers");
    CONFIG.set(config).map_err(|_| RxError::AlreadyConfigured)
  }

  /// The configuration in effect.
  pub fn config() -> &'static SchedulerConfig { config() }

  pub fn immediate() -> ImmediateScheduler { ImmediateScheduler }

  /// Bounded pool for CPU-bound work.
  pub fn computation() -> ThreadPoolScheduler { COMPUTATION.clone() }

  /// One worker thread; tasks run one after another.
  pub fn single() -> ThreadPoolScheduler { SINGLE.clone() }

  /// Elastic pool for blocking work.
  pub fn io() -> ElasticScheduler { IO.clone() }

  /// Adapts an externally owned pool (anything implementing `Spawn`, such as
  /// a `futures::executor::ThreadPool`).
  pub fn from_spawner(
    spawner: impl futures::task::Spawn + Send + Sync + 'static,
  ) -> ThreadPoolScheduler {
    ThreadPoolScheduler::from_spawner(spawner)
  }
}
