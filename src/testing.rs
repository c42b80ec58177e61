//! A recording observer for tests.

use std::{
  sync::Arc,
  time::{Duration, Instant},
};

use parking_lot::{Condvar, Mutex};

use crate::{
  error::{Result, RxError},
  observer::Observer,
};

struct Record<Item, Err> {
  values: Vec<Item>,
  errors: Vec<Err>,
  completions: usize,
}

impl<Item, Err> Record<Item, Err> {
  fn terminated(&self) -> bool { self.completions > 0 || !self.errors.is_empty() }
}

/// Records every event it receives. Clones share the record, so keep one
/// clone and subscribe with another.
///
/// ```
/// use rxcore::prelude::*;
///
/// let test = TestObserver::new();
/// observable::from_iter([1, 2]).subscribe_with(test.clone());
/// test.assert_values(&[1, 2]);
/// test.assert_completed();
/// ```
pub struct TestObserver<Item, Err> {
  shared: Arc<(Mutex<Record<Item, Err>>, Condvar)>,
}

impl<Item, Err> Clone for TestObserver<Item, Err> {
  fn clone(&self) -> Self { TestObserver { shared: self.shared.clone() } }
}

impl<Item, Err> Default for TestObserver<Item, Err> {
  fn default() -> Self {
    let record = Record { values: vec![], errors: vec![], completions: 0 };
    TestObserver { shared: Arc::new((Mutex::new(record), Condvar::new())) }
  }
}

impl<Item, Err> TestObserver<Item, Err> {
  pub fn new() -> Self { Self::default() }

  pub fn values(&self) -> Vec<Item>
  where
    Item: Clone,
  {
    self.shared.0.lock().values.clone()
  }

  pub fn errors(&self) -> Vec<Err>
  where
    Err: Clone,
  {
    self.shared.0.lock().errors.clone()
  }

  pub fn completions(&self) -> usize { self.shared.0.lock().completions }

  /// Blocks until an error or completion arrived.
  pub fn await_terminal(&self, timeout: Duration) -> Result<()> {
    self.wait_until(timeout, Record::terminated)
  }

  /// Blocks until at least `count` values arrived.
  pub fn await_value_count(&self, count: usize, timeout: Duration) -> Result<()> {
    self.wait_until(timeout, |record| record.values.len() >= count)
  }

  fn wait_until(&self, timeout: Duration, done: impl Fn(&Record<Item, Err>) -> bool) -> Result<()> {
    let (record, signal) = &*self.shared;
    let deadline = Instant::now() + timeout;
    let mut record = record.lock();
    while !done(&record) {
      if signal.wait_until(&mut record, deadline).timed_out() {
        return if done(&record) { Ok(()) } else { Err(RxError::Timeout(timeout)) };
      }
    }
    Ok(())
  }

  #[track_caller]
  pub fn assert_values(&self, expected: &[Item])
  where
    Item: PartialEq + std::fmt::Debug,
  {
    assert_eq!(self.shared.0.lock().values.as_slice(), expected);
  }

  #[track_caller]
  pub fn assert_value_count(&self, count: usize) {
    assert_eq!(self.shared.0.lock().values.len(), count, "value count");
  }

  #[track_caller]
  pub fn assert_completed(&self) { assert_eq!(self.completions(), 1, "completions"); }

  #[track_caller]
  pub fn assert_not_completed(&self) { assert_eq!(self.completions(), 0, "completions"); }

  #[track_caller]
  pub fn assert_no_errors(&self) {
    assert!(self.shared.0.lock().errors.is_empty(), "unexpected error");
  }

  fn record(&self, f: impl FnOnce(&mut Record<Item, Err>)) {
    let (record, signal) = &*self.shared;
    f(&mut record.lock());
    signal.notify_all();
  }
}

impl<Item, Err> Observer<Item, Err> for TestObserver<Item, Err> {
  fn next(&mut self, value: Item) { self.record(|r| r.values.push(value)) }

  fn error(self, err: Err) { self.record(|r| r.errors.push(err)) }

  fn complete(self) { self.record(|r| r.completions += 1) }

  fn is_closed(&self) -> bool { false }
}
