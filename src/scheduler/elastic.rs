use std::{sync::Arc, time::Duration};

use futures::future::{AbortHandle, Abortable, BoxFuture};
use tokio::runtime::{Builder, Handle, Runtime};

use super::{
  NewThreadSpawner, Scheduler, SchedulerConfig, Task, TaskHandle, TaskState, ThreadPoolScheduler,
};
use crate::{
  error::{Result, RxError},
  subscription::Subscription,
};

/// Scheduler for blocking work.
///
/// Every run of a task goes to Tokio's blocking thread pool, which starts
/// threads on demand up to a cap and retires them after an idle keep-alive.
/// Delays between runs are Tokio timers, so no thread is held while a task
/// sleeps.
///
/// A scheduler built with [`ElasticScheduler::new`] owns its runtime; drop
/// the last clone outside of that runtime's threads.
#[derive(Clone)]
pub struct ElasticScheduler(Backend);

#[derive(Clone)]
enum Backend {
  Tokio {
    handle: Handle,
    // keeps an owned runtime alive for as long as a scheduler refers to it
    _runtime: Option<Arc<Runtime>>,
  },
  Threads(ThreadPoolScheduler),
}

impl ElasticScheduler {
  /// Starts a dedicated runtime sized by `config`.
  pub fn new(config: &SchedulerConfig) -> Result<Self> {
    let runtime = Builder::new_multi_thread()
      .worker_threads(1)
      .max_blocking_threads(config.io_max_threads)
      .thread_keep_alive(config.io_keep_alive)
      .thread_name(format!("{}-io", config.thread_name_prefix))
      .enable_time()
      .build()
      .map_err(|err| RxError::SchedulerUnavailable { name: "io", reason: err.to_string() })?;
    tracing::debug!(
      max_threads = config.io_max_threads,
      keep_alive = ?config.io_keep_alive,
      "elastic scheduler started"
    );
    let handle = runtime.handle().clone();
    Ok(ElasticScheduler(Backend::Tokio { handle, _runtime: Some(Arc::new(runtime)) }))
  }

  /// Schedules onto an existing Tokio runtime. The runtime must have its
  /// time driver enabled.
  pub fn from_handle(handle: Handle) -> Self {
    ElasticScheduler(Backend::Tokio { handle, _runtime: None })
  }

  /// One new thread per task.
  pub fn threads() -> Self {
    ElasticScheduler(Backend::Threads(ThreadPoolScheduler::from_spawner(
      NewThreadSpawner::named("rxcore-io"),
    )))
  }
}

impl Scheduler for ElasticScheduler {
  fn schedule(&self, task: Task, delay: Option<Duration>) -> TaskHandle {
    let handle = match &self.0 {
      Backend::Threads(threads) => return threads.schedule(task, delay),
      Backend::Tokio { handle, .. } => handle.clone(),
    };
    let (abort, registration) = AbortHandle::new_pair();
    let task_handle = TaskHandle::with_abort(abort);
    let state = task_handle.clone();
    let blocking = handle.clone();
    tracing::trace!(?delay, "schedule io task");

    let driver = async move {
      let mut task = task;
      let mut delay = delay;
      loop {
        if let Some(d) = delay.take().filter(|d| !d.is_zero()) {
          tokio::time::sleep(d).await;
        }
        if state.is_closed() {
          return;
        }
        let stepped = blocking
          .spawn_blocking(move || {
            let next = task.step();
            (task, next)
          })
          .await;
        match stepped {
          Ok((t, TaskState::Sleeping(d))) => {
            task = t;
            delay = Some(d);
          }
          Ok((_, TaskState::Finished)) => {
            state.mark_finished();
            return;
          }
          Err(err) => {
            tracing::error!(%err, "io task failed");
            state.mark_finished();
            return;
          }
        }
      }
    };
    handle.spawn(Abortable::new(driver, registration));
    task_handle
  }

  fn spawn_future(&self, fut: BoxFuture<'static, ()>) -> TaskHandle {
    let handle = match &self.0 {
      Backend::Threads(threads) => return threads.spawn_future(fut),
      Backend::Tokio { handle, .. } => handle.clone(),
    };
    let (abort, registration) = AbortHandle::new_pair();
    let task_handle = TaskHandle::with_abort(abort);
    let done = task_handle.clone();
    handle.spawn(Abortable::new(
      async move {
        fut.await;
        done.mark_finished();
      },
      registration,
    ));
    task_handle
  }
}

#[cfg(test)]
mod tests {
  use std::sync::mpsc;

  use super::*;

  #[rxcore_macro::test]
  fn grows_past_worker_count() {
    let io = ElasticScheduler::new(&SchedulerConfig::default().io_max_threads(8)).unwrap();
    let (tx, rx) = mpsc::channel();
    let barrier = Arc::new(std::sync::Barrier::new(4));
    for _ in 0..4 {
      let (tx, barrier) = (tx.clone(), barrier.clone());
      io.schedule_now(move || {
        // only returns once 4 tasks run at the same time
        barrier.wait();
        tx.send(()).unwrap();
      });
    }
    for _ in 0..4 {
      rx.recv_timeout(Duration::from_secs(5)).unwrap();
    }
  }

  #[rxcore_macro::test]
  fn periodic_on_thread_fallback() {
    let io = ElasticScheduler::threads();
    let (tx, rx) = mpsc::channel();
    let handle = io.schedule_periodic(Duration::ZERO, Duration::from_millis(2), move |i| {
      let _ = tx.send(i);
    });
    assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), 0);
    assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), 1);
    handle.unsubscribe();
  }

  #[rxcore_macro::test(multi)]
  async fn from_existing_runtime() {
    let io = ElasticScheduler::from_handle(Handle::current());
    let (tx, rx) = futures::channel::oneshot::channel();
    io.schedule_after(Duration::from_millis(5), move || {
      let _ = tx.send(std::thread::current().name().map(str::to_owned));
    });
    assert!(rx.await.is_ok());
  }
}
