//! Everything a pipeline usually needs, in one import.

pub use std::convert::Infallible;

pub use crate::{
  error::RxError,
  observable::{
    self, BoxedObservable, ConnectableObservable, CoreObservable, IntoBoxedObservable, Observable,
    ObservableType,
  },
  observer::{BoxedObserver, Emitter, FnMutObserver, Observer, ObserverAll},
  scheduler::{
    ElasticScheduler, ImmediateScheduler, Scheduler, SchedulerConfig, Schedulers, Task,
    TaskHandle, TaskState, TestScheduler, ThreadPoolScheduler,
  },
  subject::Subject,
  subscription::{
    BoxedSubscription, ClosureSubscription, SharedSubscription, Subscription, SubscriptionGuard,
  },
  testing::TestObserver,
};
