//! Pipelines running on real and virtual schedulers.

use std::{
  collections::HashSet,
  sync::{Arc, Mutex},
  thread,
  time::Duration,
};

use futures::executor::ThreadPool;
use rxcore::prelude::*;

#[rxcore_macro::test]
fn subscribe_on_moves_blocking_work_off_the_caller() {
  let caller = thread::current().id();
  let producer = Arc::new(Mutex::new(None));
  let c_producer = producer.clone();
  let values = observable::create(move |emitter: &mut dyn Emitter<i32, Infallible>| {
    *c_producer.lock().unwrap() = Some(thread::current().id());
    thread::sleep(Duration::from_millis(5));
    emitter.next(42);
    emitter.complete();
  })
  .subscribe_on(Schedulers::io())
  .blocking_collect();
  assert_eq!(values, Ok(vec![42]));
  assert_ne!(producer.lock().unwrap().expect("recipe ran"), caller);
}

#[rxcore_macro::test]
fn parallel_flat_map_on_computation() {
  let threads = Arc::new(Mutex::new(HashSet::new()));
  let c_threads = threads.clone();
  let mut squares = observable::from_iter(0..32u64)
    .flat_map(move |v| {
      let c_threads = c_threads.clone();
      observable::from_fn(move || {
        c_threads.lock().unwrap().insert(thread::current().id());
        Ok::<_, Infallible>(v * v)
      })
      .subscribe_on(Schedulers::computation())
    })
    .blocking_collect()
    .unwrap();
  squares.sort();
  assert_eq!(squares, (0..32u64).map(|v| v * v).collect::<Vec<_>>());
  assert!(!threads.lock().unwrap().contains(&thread::current().id()));
}

#[rxcore_macro::test]
fn external_pool_through_spawner() {
  let pool = ThreadPool::builder().pool_size(2).name_prefix("external-").create().unwrap();
  let scheduler = Schedulers::from_spawner(pool);
  let names = Arc::new(Mutex::new(vec![]));
  let c_names = names.clone();
  let values = observable::interval(Duration::from_millis(1), scheduler)
    .map(move |v| {
      c_names.lock().unwrap().push(thread::current().name().map(str::to_owned));
      v
    })
    .take(3)
    .blocking_collect();
  assert_eq!(values, Ok(vec![0, 1, 2]));
  let names = names.lock().unwrap();
  assert!(names.iter().all(|n| n.as_deref().is_some_and(|n| n.starts_with("external-"))));
}

#[rxcore_macro::test]
fn take_for_on_virtual_time() {
  let scheduler = TestScheduler::new();
  let test = TestObserver::new();
  observable::interval(Duration::from_millis(10), scheduler.clone())
    .take_for(Duration::from_millis(35), scheduler.clone())
    .subscribe_with(test.clone());
  scheduler.advance_by(Duration::from_millis(100));
  test.assert_values(&[0, 1, 2]);
  test.assert_completed();
  assert_eq!(scheduler.pending(), 0);
}

#[rxcore_macro::test]
fn observe_on_preserves_order_across_threads() {
  let values = observable::from_iter(0..1000)
    .subscribe_on(Schedulers::io())
    .observe_on(Schedulers::computation())
    .blocking_collect();
  assert_eq!(values, Ok((0..1000).collect::<Vec<_>>()));
}

#[rxcore_macro::test]
fn from_future_on_io() {
  let test = TestObserver::new();
  observable::from_future(async { 6 * 7 }, Schedulers::io()).subscribe_with(test.clone());
  test.await_terminal(Duration::from_secs(5)).unwrap();
  test.assert_values(&[42]);
  test.assert_completed();
}

#[rxcore_macro::test]
async fn async_test_drives_stream() {
  use futures::StreamExt;
  let values: Vec<_> = observable::timer(Duration::from_millis(2), Schedulers::computation())
    .map(|_| "fired")
    .into_stream()
    .collect()
    .await;
  assert_eq!(values, vec![Ok("fired")]);
}
