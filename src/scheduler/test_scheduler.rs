//! Virtual-time scheduler for deterministic tests of time-based sources.
//!
//! Virtual time only advances when the test says so. Tasks due at or before
//! the new time run synchronously on the thread that advances the clock, in
//! order of due time and then submission order.
//!
//! ```rust
//! use std::time::Duration;
//! use rxcore::prelude::*;
//!
//! let scheduler = TestScheduler::default();
//! let ticks = std::sync::Arc::new(std::sync::Mutex::new(vec![]));
//! let c_ticks = ticks.clone();
//! observable::interval(Duration::from_millis(10), scheduler.clone())
//!   .subscribe(move |v| c_ticks.lock().unwrap().push(v));
//!
//! scheduler.advance_by(Duration::from_millis(35));
//! assert_eq!(*ticks.lock().unwrap(), vec![0, 1, 2]);
//! ```
//!
//! Unlike a thread-local clock, a `TestScheduler` is a value: clones share
//! the clock, distinct instances are independent, so parallel tests do not
//! interfere.

use std::{
  cmp::Ordering,
  collections::BinaryHeap,
  sync::Arc,
  time::Duration,
};

use parking_lot::Mutex;

use super::{Scheduler, Task, TaskHandle, TaskState};
use crate::subscription::Subscription;

#[derive(Default)]
struct TestSchedulerState {
  virtual_time: Duration,
  task_queue: BinaryHeap<ScheduledTask>,
  next_task_id: usize,
}

struct ScheduledTask {
  scheduled_time: Duration,
  task_id: usize,
  task: Task,
  handle: TaskHandle,
}

impl PartialEq for ScheduledTask {
  fn eq(&self, other: &Self) -> bool {
    self.scheduled_time == other.scheduled_time && self.task_id == other.task_id
  }
}

impl Eq for ScheduledTask {}

impl PartialOrd for ScheduledTask {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl Ord for ScheduledTask {
  // reversed: the heap pops the earliest task first
  fn cmp(&self, other: &Self) -> Ordering {
    other
      .scheduled_time
      .cmp(&self.scheduled_time)
      .then_with(|| other.task_id.cmp(&self.task_id))
  }
}

#[derive(Clone, Default)]
pub struct TestScheduler(Arc<Mutex<TestSchedulerState>>);

impl TestScheduler {
  pub fn new() -> Self { Self::default() }

  /// Current virtual time, measured from the scheduler's creation.
  pub fn now(&self) -> Duration { self.0.lock().virtual_time }

  /// Tasks still waiting to run (cancelled ones included until their due
  /// time is reached).
  pub fn pending(&self) -> usize { self.0.lock().task_queue.len() }

  pub fn advance_by(&self, delta: Duration) {
    let target = self.now() + delta;
    self.advance_to(target);
  }

  /// Moves the clock to `target`, running everything that becomes due on
  /// the way. Tasks scheduled by those tasks run too if they fall due
  /// before `target`.
  pub fn advance_to(&self, target: Duration) {
    loop {
      let next = {
        let mut state = self.0.lock();
        match state.task_queue.peek() {
          Some(task) if task.scheduled_time <= target => {
            let task = state.task_queue.pop();
            if let Some(task) = &task {
              state.virtual_time = state.virtual_time.max(task.scheduled_time);
            }
            task
          }
          _ => None,
        }
      };
      let Some(ScheduledTask { mut task, handle, .. }) = next else { break };
      if handle.is_closed() {
        continue;
      }
      match task.step() {
        TaskState::Finished => handle.mark_finished(),
        TaskState::Sleeping(d) => self.enqueue(task, handle, d),
      }
    }
    let mut state = self.0.lock();
    state.virtual_time = state.virtual_time.max(target);
  }

  /// Runs everything due at the current time without moving the clock.
  pub fn flush(&self) { self.advance_by(Duration::ZERO) }

  fn enqueue(&self, task: Task, handle: TaskHandle, delay: Duration) {
    let mut state = self.0.lock();
    let task_id = state.next_task_id;
    state.next_task_id += 1;
    let scheduled_time = state.virtual_time + delay;
    state.task_queue.push(ScheduledTask { scheduled_time, task_id, task, handle });
  }
}

impl Scheduler for TestScheduler {
  fn schedule(&self, task: Task, delay: Option<Duration>) -> TaskHandle {
    let handle = TaskHandle::new();
    self.enqueue(task, handle.clone(), delay.unwrap_or_default());
    handle
  }
}
