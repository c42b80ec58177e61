//! Fans CPU work out over the computation pool and gathers the results on
//! one thread.
//!
//! Run with `cargo run --example parallel_flat_map`.

use std::thread;

use rxcore::prelude::*;

fn collatz_steps(mut n: u64) -> u32 {
  let mut steps = 0;
  while n != 1 {
    n = if n % 2 == 0 { n / 2 } else { 3 * n + 1 };
    steps += 1;
  }
  steps
}

fn main() {
  let _ = tracing_subscriber::fmt().with_env_filter("rxcore=debug").try_init();

  let best = observable::from_iter(1..=20_000u64)
    .flat_map_max(
      |n| {
        observable::from_fn(move || Ok::<_, Infallible>((n, collatz_steps(n))))
          .subscribe_on(Schedulers::computation())
      },
      Schedulers::config().computation_threads * 2,
    )
    .observe_on(Schedulers::single())
    .map(|(n, steps)| {
      tracing::trace!(n, steps, thread = ?thread::current().name(), "result");
      (n, steps)
    })
    .collect::<Vec<_>>()
    .blocking_first();

  let results = match best {
    Ok(Some(results)) => results,
    Ok(None) => return,
    Err(never) => match never {},
  };
  if let Some((n, steps)) = results.iter().max_by_key(|(_, steps)| *steps) {
    println!("{n} takes {steps} steps (out of {} numbers)", results.len());
  }
}
