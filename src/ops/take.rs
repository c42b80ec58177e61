use std::time::Duration;

use crate::{
  observable::{CoreObservable, ObservableType},
  observer::Observer,
  rc::MutArc,
  scheduler::Scheduler,
  subscription::{SharedSubscription, Subscription},
};

/// Emits only the first `count` values, then completes and cancels the
/// source.
#[derive(Clone)]
pub struct Take<S> {
  pub source: S,
  pub count: usize,
}

pub struct TakeObserver<O> {
  observer: Option<O>,
  remaining: usize,
  subscription: SharedSubscription,
}

impl<O, Item, Err> Observer<Item, Err> for TakeObserver<O>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) {
    let Some(observer) = self.observer.as_mut() else { return };
    self.remaining -= 1;
    observer.next(value);
    if self.remaining == 0 {
      Observer::<Item, Err>::complete(self.observer.take());
      self.subscription.cancel();
    }
  }

  fn error(self, err: Err) { Observer::<Item, Err>::error(self.observer, err) }

  fn complete(self) { Observer::<Item, Err>::complete(self.observer) }

  fn is_closed(&self) -> bool {
    self.subscription.is_closed() || Observer::<Item, Err>::is_closed(&self.observer)
  }
}

impl<S: ObservableType> ObservableType for Take<S> {
  type Item = S::Item;
  type Err = S::Err;
}

impl<S, O> CoreObservable<O> for Take<S>
where
  S: CoreObservable<TakeObserver<O>>,
  S::Unsub: Send + 'static,
  O: Observer<S::Item, S::Err>,
{
  type Unsub = SharedSubscription;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let subscription = SharedSubscription::default();
    if self.count == 0 {
      observer.complete();
      subscription.cancel();
      return subscription;
    }
    let observer =
      TakeObserver { observer: Some(observer), remaining: self.count, subscription: subscription.clone() };
    // a synchronous source may already have hit the count; `add` then cancels it at once
    subscription.add(self.source.actual_subscribe(observer));
    subscription
  }
}

/// Mirrors the source until a timer on `scheduler` fires.
#[derive(Clone)]
pub struct TakeFor<S, SD> {
  pub source: S,
  pub duration: Duration,
  pub scheduler: SD,
}

impl<S: ObservableType, SD> ObservableType for TakeFor<S, SD> {
  type Item = S::Item;
  type Err = S::Err;
}

impl<S, SD, O, Item, Err> CoreObservable<O> for TakeFor<S, SD>
where
  S: CoreObservable<MutArc<Option<O>>> + ObservableType<Item = Item, Err = Err>,
  S::Unsub: Send + 'static,
  SD: Scheduler,
  O: Observer<Item, Err> + Send + 'static,
{
  type Unsub = SharedSubscription;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let observer = MutArc::own(Some(observer));
    let subscription = SharedSubscription::default();

    let (c_observer, c_subscription) = (observer.clone(), subscription.clone());
    let timer = self.scheduler.schedule_after(self.duration, move || {
      Observer::<Item, Err>::complete(c_observer);
      c_subscription.cancel();
    });
    subscription.add(timer);

    let unsub = self.source.actual_subscribe(observer);
    subscription.add(unsub);
    subscription
  }
}

#[cfg(test)]
mod test {
  use std::time::Duration;

  use crate::prelude::*;

  #[rxcore_macro::test]
  fn base_function() {
    let test = TestObserver::new();
    observable::from_iter(0..100).take(5).subscribe_with(test.clone());
    test.assert_values(&[0, 1, 2, 3, 4]);
    assert_eq!(test.completions(), 1);
  }

  #[rxcore_macro::test]
  fn take_zero_never_subscribes() {
    let subscribed = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
    let c_subscribed = subscribed.clone();
    let test = TestObserver::new();
    observable::create(move |emitter: &mut dyn Emitter<i32, Infallible>| {
      c_subscribed.store(true, std::sync::atomic::Ordering::SeqCst);
      emitter.next(1);
    })
    .take(0)
    .subscribe_with(test.clone());
    assert!(!subscribed.load(std::sync::atomic::Ordering::SeqCst));
    test.assert_value_count(0);
    test.assert_completed();
  }

  #[rxcore_macro::test]
  fn count_reached_leaves_hot_source() {
    let mut subject = Subject::<i32, Infallible>::new();
    let test = TestObserver::new();
    subject.clone().take(1).merge(observable::never()).subscribe_with(test.clone());
    assert_eq!(subject.observer_count(), 1);
    subject.next(1);
    assert_eq!(subject.observer_count(), 0);
    subject.next(2);
    test.assert_values(&[1]);
  }

  #[rxcore_macro::test]
  fn count_reached_runs_source_teardown() {
    let torn_down = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let c_torn_down = torn_down.clone();
    let subscription = observable::create(move |emitter: &mut dyn Emitter<i32, Infallible>| {
      emitter.next(1);
      emitter.next(2);
      ClosureSubscription(move || {
        c_torn_down.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
      })
    })
    .take(1)
    .merge(observable::never())
    .subscribe(|_| {});
    assert_eq!(torn_down.load(std::sync::atomic::Ordering::SeqCst), 1);
    assert!(!subscription.is_closed());
  }

  #[rxcore_macro::test]
  fn short_source_completes_unchanged() {
    assert_eq!(observable::from_iter(0..2).take(5).blocking_collect(), Ok(vec![0, 1]));
  }

  #[rxcore_macro::test]
  fn take_for_on_virtual_time() {
    let scheduler = TestScheduler::new();
    let test = TestObserver::new();
    let subscription = observable::interval(Duration::from_millis(10), scheduler.clone())
      .take_for(Duration::from_millis(35), scheduler.clone())
      .subscribe_with(test.clone());

    scheduler.advance_by(Duration::from_millis(100));
    test.assert_values(&[0, 1, 2]);
    test.assert_completed();
    assert!(subscription.is_closed());
  }

  #[rxcore_macro::test]
  fn take_for_source_finishing_first() {
    let scheduler = TestScheduler::new();
    let test = TestObserver::new();
    observable::from_iter([1, 2])
      .take_for(Duration::from_secs(1), scheduler.clone())
      .subscribe_with(test.clone());
    test.assert_values(&[1, 2]);
    assert_eq!(test.completions(), 1);
    scheduler.advance_by(Duration::from_secs(2));
    assert_eq!(test.completions(), 1);
  }
}
