//! Plugging in a scheduler of your own.
//!
//! `Scheduler` has a single required method: run a `Task` after an optional
//! delay, then again after every `TaskState::Sleeping` it returns, until it
//! finishes or its handle is cancelled. This one starts a thread per task
//! and reports what it does.
//!
//! Run with `cargo run --example custom_scheduler`.

use std::{thread, time::Duration};

use rxcore::prelude::*;

#[derive(Clone, Default)]
struct VerboseScheduler;

impl Scheduler for VerboseScheduler {
  fn schedule(&self, mut task: Task, delay: Option<Duration>) -> TaskHandle {
    println!("[verbose] scheduling task, initial delay {delay:?}");
    let handle = TaskHandle::new();
    let c_handle = handle.clone();
    thread::spawn(move || {
      let mut delay = delay.unwrap_or_default();
      loop {
        thread::sleep(delay);
        if c_handle.is_closed() {
          println!("[verbose] task cancelled");
          return;
        }
        match task.step() {
          TaskState::Finished => {
            println!("[verbose] task finished");
            c_handle.mark_finished();
            return;
          }
          TaskState::Sleeping(next) => delay = next,
        }
      }
    });
    handle
  }
}

fn main() {
  let values = observable::interval(Duration::from_millis(10), VerboseScheduler)
    .take_for(Duration::from_millis(45), VerboseScheduler)
    .map(|v| v * 100)
    .blocking_collect();
  println!("values: {values:?}");

  let value = observable::from_future(async { "from a future" }, VerboseScheduler).blocking_first();
  println!("value: {value:?}");
}
