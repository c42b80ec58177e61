use std::time::Duration;

use super::{Scheduler, Task, TaskHandle, TaskState};
use crate::subscription::Subscription;

/// Runs every task on the calling thread, before `schedule` returns.
///
/// Delays block the caller. A periodic task keeps the caller busy until the
/// task itself finishes, so periodic sources on this scheduler must be
/// bounded downstream (for example with `take`).
#[derive(Clone, Copy, Debug, Default)]
pub struct ImmediateScheduler;

impl Scheduler for ImmediateScheduler {
  fn schedule(&self, mut task: Task, delay: Option<Duration>) -> TaskHandle {
    let handle = TaskHandle::new();
    let mut delay = delay;
    loop {
      if let Some(d) = delay.take().filter(|d| !d.is_zero()) {
        std::thread::sleep(d);
      }
      if handle.is_closed() {
        break;
      }
      match task.step() {
        TaskState::Finished => {
          handle.mark_finished();
          break;
        }
        TaskState::Sleeping(d) => delay = Some(d),
      }
    }
    handle
  }
}

#[cfg(test)]
mod tests {
  use std::sync::{Arc, Mutex};

  use super::*;

  #[rxcore_macro::test]
  fn runs_before_returning() {
    let log = Arc::new(Mutex::new(vec![]));
    let c_log = log.clone();
    let handle = ImmediateScheduler.schedule_now(move || c_log.lock().unwrap().push(1));
    assert_eq!(*log.lock().unwrap(), vec![1]);
    assert!(handle.is_closed());
  }

  #[rxcore_macro::test]
  fn sleeping_task_repeats_until_finished() {
    let runs = Arc::new(Mutex::new(0));
    let c_runs = runs.clone();
    ImmediateScheduler.schedule(
      Task::new(move || {
        let mut runs = c_runs.lock().unwrap();
        *runs += 1;
        if *runs < 3 {
          TaskState::Sleeping(Duration::from_millis(1))
        } else {
          TaskState::Finished
        }
      }),
      Some(Duration::from_millis(1)),
    );
    assert_eq!(*runs.lock().unwrap(), 3);
  }
}
