use std::{convert::Infallible, time::Duration};

use crate::{
  observable::{CoreObservable, ObservableType},
  observer::Observer,
  scheduler::{Scheduler, Task, TaskHandle, TaskState},
};

/// Creates an observable which will fire at `period` intervals, emitting
/// `0, 1, 2, ...` on `scheduler`. It never completes; bound it with `take`
/// or `take_for`.
///
/// ```
/// use std::time::Duration;
/// use rxcore::prelude::*;
///
/// let ticks = observable::interval(Duration::from_millis(1), Schedulers::computation())
///   .take(3)
///   .blocking_collect();
/// assert_eq!(ticks, Ok(vec![0, 1, 2]));
/// ```
pub fn interval<SD>(period: Duration, scheduler: SD) -> Interval<SD> {
  Interval { initial: period, period, scheduler }
}

/// Like [`interval`], but the first value fires after `initial` instead of
/// after one `period`.
pub fn interval_at<SD>(initial: Duration, period: Duration, scheduler: SD) -> Interval<SD> {
  Interval { initial, period, scheduler }
}

#[derive(Clone)]
pub struct Interval<SD> {
  initial: Duration,
  period: Duration,
  scheduler: SD,
}

impl<SD> ObservableType for Interval<SD> {
  type Item = usize;
  type Err = Infallible;
}

impl<SD, O> CoreObservable<O> for Interval<SD>
where
  SD: Scheduler,
  O: Observer<usize, Infallible> + Send + 'static,
{
  type Unsub = TaskHandle;

  fn actual_subscribe(self, mut observer: O) -> Self::Unsub {
    let period = self.period;
    let mut count = 0;
    let task = Task::new(move || {
      if observer.is_closed() {
        return TaskState::Finished;
      }
      observer.next(count);
      count += 1;
      if observer.is_closed() { TaskState::Finished } else { TaskState::Sleeping(period) }
    });
    self.scheduler.schedule(task, Some(self.initial))
  }
}

/// Emits `()` once after `delay`, then completes.
pub fn timer<SD>(delay: Duration, scheduler: SD) -> Timer<SD> { Timer { delay, scheduler } }

#[derive(Clone)]
pub struct Timer<SD> {
  delay: Duration,
  scheduler: SD,
}

impl<SD> ObservableType for Timer<SD> {
  type Item = ();
  type Err = Infallible;
}

impl<SD, O> CoreObservable<O> for Timer<SD>
where
  SD: Scheduler,
  O: Observer<(), Infallible> + Send + 'static,
{
  type Unsub = TaskHandle;

  fn actual_subscribe(self, mut observer: O) -> Self::Unsub {
    self.scheduler.schedule_after(self.delay, move || {
      observer.next(());
      if !observer.is_closed() {
        observer.complete();
      }
    })
  }
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use crate::prelude::*;

  #[rxcore_macro::test]
  fn interval_on_virtual_time() {
    let scheduler = TestScheduler::new();
    let test = TestObserver::new();
    let subscription =
      observable::interval(Duration::from_millis(100), scheduler.clone()).subscribe_with(test.clone());

    scheduler.advance_by(Duration::from_millis(99));
    test.assert_value_count(0);
    scheduler.advance_by(Duration::from_millis(401));
    test.assert_values(&[0, 1, 2, 3, 4]);

    subscription.unsubscribe();
    scheduler.advance_by(Duration::from_secs(1));
    test.assert_value_count(5);
    test.assert_not_completed();
  }

  #[rxcore_macro::test]
  fn interval_at_first_delay() {
    let scheduler = TestScheduler::new();
    let test = TestObserver::new();
    observable::interval_at(Duration::ZERO, Duration::from_millis(10), scheduler.clone())
      .subscribe_with(test.clone());
    scheduler.flush();
    test.assert_values(&[0]);
    scheduler.advance_by(Duration::from_millis(20));
    test.assert_values(&[0, 1, 2]);
  }

  #[rxcore_macro::test]
  fn timer_fires_once() {
    let scheduler = TestScheduler::new();
    let test = TestObserver::new();
    observable::timer(Duration::from_secs(3), scheduler.clone()).subscribe_with(test.clone());
    scheduler.advance_by(Duration::from_secs(2));
    test.assert_not_completed();
    scheduler.advance_by(Duration::from_secs(2));
    test.assert_values(&[()]);
    test.assert_completed();
    assert_eq!(scheduler.pending(), 0);
  }

  #[rxcore_macro::test]
  fn interval_stops_after_take() {
    let scheduler = TestScheduler::new();
    let test = TestObserver::new();
    observable::interval(Duration::from_millis(1), scheduler.clone())
      .take(2)
      .subscribe_with(test.clone());
    scheduler.advance_by(Duration::from_millis(10));
    test.assert_values(&[0, 1]);
    test.assert_completed();
    assert_eq!(scheduler.pending(), 0);
  }
}
