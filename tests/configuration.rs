//! Runs in its own test binary: the scheduler registry can be configured
//! only once per process.

use rxcore::{prelude::*, scheduler::ENV_COMPUTATION_THREADS};

#[rxcore_macro::test]
fn configure_once_before_use() {
  let bad = SchedulerConfig::default().computation_threads(0);
  assert!(matches!(Schedulers::configure(bad), Err(RxError::InvalidConfig { .. })));

  let config = SchedulerConfig::default().computation_threads(3).thread_name_prefix("cfg-test");
  Schedulers::configure(config.clone()).unwrap();
  assert_eq!(Schedulers::config(), &config);
  assert_eq!(Schedulers::configure(config), Err(RxError::AlreadyConfigured));

  let name = observable::of(())
    .subscribe_on(Schedulers::computation())
    .map(|_| std::thread::current().name().map(str::to_owned))
    .blocking_first()
    .unwrap()
    .flatten();
  assert!(name.is_some_and(|n| n.starts_with("cfg-test")));

  let from_env = SchedulerConfig::from_lookup(|key| {
    (key == ENV_COMPUTATION_THREADS).then(|| "not a number".to_owned())
  });
  assert!(from_env.is_err());
}
