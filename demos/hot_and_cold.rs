//! Cold sources replay per subscription; a published source is shared.
//!
//! Run with `cargo run --example hot_and_cold`.

use std::time::Duration;

use rxcore::prelude::*;

fn main() {
  println!("-- cold --");
  let cold = observable::interval(Duration::from_millis(20), Schedulers::computation()).take(3);
  let first = cold.clone().subscribe(|v| println!("first  saw {v}"));
  std::thread::sleep(Duration::from_millis(30));
  let second = cold.subscribe(|v| println!("second saw {v}"));
  std::thread::sleep(Duration::from_millis(100));
  assert!(first.is_closed() && second.is_closed());

  println!("-- hot --");
  let hot = observable::interval(Duration::from_millis(20), Schedulers::computation()).take(3).publish();
  hot.clone().subscribe(|v| println!("early saw {v}"));
  let connection = hot.connect();
  std::thread::sleep(Duration::from_millis(30));
  hot.clone().subscribe(|v| println!("late  saw {v}"));
  std::thread::sleep(Duration::from_millis(100));
  connection.unsubscribe();
}
