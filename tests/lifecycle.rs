//! Subscription lifecycle: cold replay, cancellation and terminal events.

use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc, Mutex,
};

use rxcore::prelude::*;

#[rxcore_macro::test]
fn cold_source_runs_independently_per_subscription() {
  let runs = Arc::new(AtomicUsize::new(0));
  let c_runs = runs.clone();
  let source = observable::create(move |emitter: &mut dyn Emitter<i32, Infallible>| {
    c_runs.fetch_add(1, Ordering::SeqCst);
    for v in [1, 2, 3] {
      emitter.next(v);
    }
    emitter.complete();
  });

  let first = TestObserver::new();
  let second = TestObserver::new();
  source.clone().subscribe_with(first.clone());
  source.subscribe_with(second.clone());

  first.assert_values(&[1, 2, 3]);
  second.assert_values(&[1, 2, 3]);
  first.assert_completed();
  second.assert_completed();
  assert_eq!(runs.load(Ordering::SeqCst), 2);
}

#[rxcore_macro::test]
fn same_sequence_for_every_collection_run() {
  let source = observable::from_iter(vec!["a", "b", "c"]);
  assert_eq!(source.clone().blocking_collect(), Ok(vec!["a", "b", "c"]));
  assert_eq!(source.blocking_collect(), Ok(vec!["a", "b", "c"]));
}

#[rxcore_macro::test]
fn nothing_delivered_after_cancel() {
  for k in 0..5 {
    let seen = Arc::new(Mutex::new(vec![]));
    let subscription = SharedSubscription::default();
    let (c_seen, c_subscription) = (seen.clone(), subscription.clone());
    observable::from_iter(0..10).subscribe_within(
      subscription.clone(),
      FnMutObserver(move |v| {
        c_seen.lock().unwrap().push(v);
        if v + 1 >= k {
          c_subscription.cancel();
        }
      }),
    );
    let expected: Vec<i32> = (0..k.max(1)).collect();
    assert_eq!(*seen.lock().unwrap(), expected);
    assert!(subscription.is_closed());
  }
}

#[rxcore_macro::test]
fn cancel_runs_teardown_once() {
  let teardowns = Arc::new(AtomicUsize::new(0));
  let c_teardowns = teardowns.clone();
  let subscription = observable::create(move |_: &mut dyn Emitter<(), Infallible>| {
    let c_teardowns = c_teardowns.clone();
    ClosureSubscription(move || {
      c_teardowns.fetch_add(1, Ordering::SeqCst);
    })
  })
  .subscribe(|_| {});
  subscription.cancel();
  subscription.cancel();
  assert_eq!(teardowns.load(Ordering::SeqCst), 1);
}

#[rxcore_macro::test]
fn take_on_infinite_source() {
  for n in [0, 1, 7, 100] {
    let test = TestObserver::new();
    observable::from_iter(0..).take(n).subscribe_with(test.clone());
    test.assert_values(&(0..n).collect::<Vec<_>>());
    test.assert_completed();
  }
}

#[rxcore_macro::test]
fn mid_sequence_error_is_the_last_event() {
  let test = TestObserver::new();
  observable::from_iter(1..=5)
    .with_err::<String>()
    .try_map(|v| if v == 3 { Err(format!("third value {v}")) } else { Ok(v) })
    .subscribe_with(test.clone());
  test.assert_values(&[1, 2]);
  assert_eq!(test.errors(), vec!["third value 3".to_owned()]);
  test.assert_not_completed();
}

#[rxcore_macro::test]
fn recipe_error_after_terminal_is_ignored() {
  let test = TestObserver::new();
  observable::create(|emitter: &mut dyn Emitter<i32, &str>| {
    emitter.next(1);
    emitter.error("first");
    emitter.next(2);
    emitter.error("second");
    emitter.complete();
  })
  .subscribe_with(test.clone());
  test.assert_values(&[1]);
  assert_eq!(test.errors(), vec!["first"]);
  test.assert_not_completed();
}

#[rxcore_macro::test]
fn guard_cancels_on_drop() {
  let scheduler = TestScheduler::new();
  let test = TestObserver::new();
  {
    let _guard = observable::interval(std::time::Duration::from_millis(1), scheduler.clone())
      .subscribe_with(test.clone())
      .unsubscribe_when_dropped();
    scheduler.advance_by(std::time::Duration::from_millis(2));
  }
  scheduler.advance_by(std::time::Duration::from_millis(10));
  test.assert_values(&[0, 1]);
}

#[rxcore_macro::test]
fn take_releases_hot_source_while_downstream_waits() {
  let mut hot = Subject::<i32, Infallible>::new();
  let test = TestObserver::new();
  let subscription = hot.clone().take(1).merge(observable::never()).subscribe_with(test.clone());
  hot.next(1);
  assert_eq!(hot.observer_count(), 0);
  test.assert_values(&[1]);
  assert!(!subscription.is_closed());
}

#[rxcore_macro::test]
fn failed_transform_releases_hot_source() {
  let mut hot = Subject::<i32, String>::new();
  let test = TestObserver::new();
  let subscription = hot
    .clone()
    .try_map(|v| if v > 1 { Err(format!("too big: {v}")) } else { Ok(v) })
    .try_filter(|_| Ok(true))
    .actual_subscribe(test.clone());
  hot.next(1);
  hot.next(2);
  assert_eq!(hot.observer_count(), 0);
  assert!(subscription.is_closed());
  test.assert_values(&[1]);
  assert_eq!(test.errors(), vec!["too big: 2".to_owned()]);
}
