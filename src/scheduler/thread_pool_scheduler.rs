use std::{future::Future, sync::Arc, time::Duration};

use futures::{
  executor::ThreadPool,
  future::{AbortHandle, AbortRegistration, Abortable, BoxFuture},
  task::{Spawn, SpawnExt},
  FutureExt,
};

use super::{run_task, Scheduler, Task, TaskHandle};
use crate::error::{Result, RxError};

/// Runs tasks on a `futures` thread pool, or on any other `Spawn`.
///
/// Waiting between runs of a task happens on a `futures-time` timer, so a
/// sleeping periodic task does not occupy a worker thread.
#[derive(Clone)]
pub struct ThreadPoolScheduler {
  spawner: Arc<dyn Spawn + Send + Sync>,
  name: &'static str,
}

impl ThreadPoolScheduler {
  /// Builds a pool of `pool_size` threads named `{prefix}-{name}-N`.
  pub fn new(name: &'static str, pool_size: usize, prefix: &str) -> Result<Self> {
    let pool = ThreadPool::builder()
      .pool_size(pool_size)
      .name_prefix(format!("{prefix}-{name}-"))
      .create()
      .map_err(|err| RxError::SchedulerUnavailable { name, reason: err.to_string() })?;
    tracing::debug!(name, pool_size, "thread pool scheduler started");
    Ok(ThreadPoolScheduler { spawner: Arc::new(pool), name })
  }

  /// Schedules onto an externally owned executor.
  pub fn from_spawner(spawner: impl Spawn + Send + Sync + 'static) -> Self {
    ThreadPoolScheduler { spawner: Arc::new(spawner), name: "custom" }
  }

  pub fn name(&self) -> &'static str { self.name }

  fn spawn_abortable(
    &self,
    fut: impl Future<Output = ()> + Send + 'static,
    registration: AbortRegistration,
    handle: TaskHandle,
  ) -> TaskHandle {
    let spawned = self.spawner.spawn(Abortable::new(fut, registration).map(drop));
    if let Err(err) = spawned {
      tracing::error!(scheduler = self.name, %err, "failed to spawn task");
      handle.mark_finished();
    }
    handle
  }
}

impl Scheduler for ThreadPoolScheduler {
  fn schedule(&self, task: Task, delay: Option<Duration>) -> TaskHandle {
    let (abort, registration) = AbortHandle::new_pair();
    let handle = TaskHandle::with_abort(abort);
    tracing::trace!(scheduler = self.name, ?delay, "schedule task");
    let fut = run_task(task, handle.clone(), delay, |d| futures_time::task::sleep(d.into()));
    self.spawn_abortable(fut, registration, handle)
  }

  fn spawn_future(&self, fut: BoxFuture<'static, ()>) -> TaskHandle {
    let (abort, registration) = AbortHandle::new_pair();
    let handle = TaskHandle::with_abort(abort);
    let done = handle.clone();
    self.spawn_abortable(
      async move {
        fut.await;
        done.mark_finished();
      },
      registration,
      handle,
    )
  }
}

#[cfg(test)]
mod tests {
  use std::{
    sync::{mpsc, Mutex},
    thread,
  };

  use super::*;
  use crate::{scheduler::TaskState, subscription::Subscription};

  #[rxcore_macro::test]
  fn runs_on_pool_thread() {
    let pool = ThreadPoolScheduler::new("unit", 2, "rxtest").unwrap();
    let (tx, rx) = mpsc::channel();
    pool.schedule_now(move || tx.send(thread::current().name().map(str::to_owned)).unwrap());
    let name = rx.recv_timeout(Duration::from_secs(5)).unwrap().unwrap();
    assert!(name.starts_with("rxtest-unit-"), "{name}");
  }

  #[rxcore_macro::test]
  fn delayed_and_periodic() {
    let pool = ThreadPoolScheduler::new("unit", 1, "rxtest").unwrap();
    let (tx, rx) = mpsc::channel();
    let tx = Mutex::new(tx);
    let handle = pool.schedule_periodic(Duration::from_millis(5), Duration::from_millis(5), move |i| {
      tx.lock().unwrap().send(i).unwrap();
    });
    let got: Vec<usize> = (0..3).map(|_| rx.recv_timeout(Duration::from_secs(5)).unwrap()).collect();
    assert_eq!(got, vec![0, 1, 2]);
    handle.clone().unsubscribe();
    assert!(handle.is_closed());
  }

  #[rxcore_macro::test]
  fn cancel_before_delay_elapses() {
    let pool = ThreadPoolScheduler::new("unit", 1, "rxtest").unwrap();
    let (tx, rx) = mpsc::channel::<()>();
    let handle = pool.schedule(
      Task::new(move || {
        tx.send(()).unwrap();
        TaskState::Finished
      }),
      Some(Duration::from_millis(200)),
    );
    handle.unsubscribe();
    assert!(rx.recv_timeout(Duration::from_millis(400)).is_err());
  }

  #[rxcore_macro::test]
  fn spawn_future_marks_finished() {
    let pool = ThreadPoolScheduler::from_spawner(ThreadPool::new().unwrap());
    let (tx, rx) = mpsc::channel();
    let handle = pool.spawn_future(Box::pin(async move { tx.send(7).unwrap() }));
    assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), 7);
    for _ in 0..100 {
      if handle.is_closed() {
        break;
      }
      thread::sleep(Duration::from_millis(5));
    }
    assert!(handle.is_closed());
    assert_eq!(pool.name(), "custom");
  }
}
