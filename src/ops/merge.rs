use crate::{
  observable::{CoreObservable, ObservableType},
  observer::Observer,
  rc::MutArc,
  subscription::{SharedSubscription, Subscription},
};

/// Runs two sources at once; see [`Observable::merge`](crate::observable::Observable::merge).
#[derive(Clone)]
pub struct Merge<A, B> {
  pub source_a: A,
  pub source_b: B,
}

/// Runs any number of sources at once. Completes once all of them
/// completed, immediately if there are none.
///
/// ```
/// use rxcore::prelude::*;
///
/// let mut values = observable::merge_all(vec![
///   observable::from_iter(vec![1, 2]),
///   observable::from_iter(vec![10, 20]),
/// ])
/// .blocking_collect()
/// .unwrap();
/// values.sort();
/// assert_eq!(values, vec![1, 2, 10, 20]);
/// ```
pub fn merge_all<I>(sources: I) -> MergeAll<I>
where
  I: IntoIterator,
  I::Item: ObservableType,
{
  MergeAll { sources }
}

#[derive(Clone)]
pub struct MergeAll<I> {
  sources: I,
}

struct MergeState<O> {
  observer: Option<O>,
  active: usize,
}

/// The observer every merged source is subscribed with. Values from all of
/// them are delivered under one lock, so the downstream never sees two
/// `next` calls at once.
pub struct MergeObserver<O> {
  state: MutArc<MergeState<O>>,
  subscription: SharedSubscription,
}

impl<O> MergeObserver<O> {
  fn new(observer: O, active: usize) -> Self {
    MergeObserver {
      state: MutArc::own(MergeState { observer: Some(observer), active }),
      subscription: SharedSubscription::default(),
    }
  }

  fn fork(&self) -> Self {
    MergeObserver { state: self.state.clone(), subscription: self.subscription.clone() }
  }
}

impl<O, Item, Err> Observer<Item, Err> for MergeObserver<O>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) {
    if let Some(observer) = self.state.rc_deref_mut().observer.as_mut() {
      observer.next(value);
    }
  }

  fn error(self, err: Err) {
    let observer = self.state.rc_deref_mut().observer.take();
    if let Some(observer) = observer {
      self.subscription.cancel();
      observer.error(err);
    }
  }

  fn complete(self) {
    let observer = {
      let mut state = self.state.rc_deref_mut();
      state.active = state.active.saturating_sub(1);
      if state.active == 0 { state.observer.take() } else { None }
    };
    if let Some(observer) = observer {
      observer.complete();
    }
  }

  fn is_closed(&self) -> bool {
    self.subscription.is_closed()
      || self.state.rc_deref().observer.as_ref().is_none_or(Observer::is_closed)
  }
}

impl<A: ObservableType, B> ObservableType for Merge<A, B> {
  type Item = A::Item;
  type Err = A::Err;
}

impl<A, B, O, Item, Err> CoreObservable<O> for Merge<A, B>
where
  A: CoreObservable<MergeObserver<O>> + ObservableType<Item = Item, Err = Err>,
  B: CoreObservable<MergeObserver<O>> + ObservableType<Item = Item, Err = Err>,
  A::Unsub: Send + 'static,
  B::Unsub: Send + 'static,
  O: Observer<Item, Err>,
{
  type Unsub = SharedSubscription;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let merge = MergeObserver::new(observer, 2);
    let subscription = merge.subscription.clone();
    subscription.add(self.source_a.actual_subscribe(merge.fork()));
    if !subscription.is_closed() {
      subscription.add(self.source_b.actual_subscribe(merge));
    }
    subscription
  }
}

impl<I> ObservableType for MergeAll<I>
where
  I: IntoIterator,
  I::Item: ObservableType,
{
  type Item = <I::Item as ObservableType>::Item;
  type Err = <I::Item as ObservableType>::Err;
}

impl<I, S, O, Item, Err> CoreObservable<O> for MergeAll<I>
where
  I: IntoIterator<Item = S>,
  S: CoreObservable<MergeObserver<O>> + ObservableType<Item = Item, Err = Err>,
  S::Unsub: Send + 'static,
  O: Observer<Item, Err>,
{
  type Unsub = SharedSubscription;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let sources: Vec<S> = self.sources.into_iter().collect();
    if sources.is_empty() {
      observer.complete();
      return SharedSubscription::default();
    }
    let merge = MergeObserver::new(observer, sources.len());
    let subscription = merge.subscription.clone();
    for source in sources {
      if subscription.is_closed() {
        break;
      }
      subscription.add(source.actual_subscribe(merge.fork()));
    }
    subscription
  }
}

#[cfg(test)]
mod test {
  use std::time::Duration;

  use crate::prelude::*;

  #[rxcore_macro::test]
  fn odd_even_merge() {
    let test = TestObserver::new();
    let numbers = observable::from_iter(0..10);
    let even = numbers.clone().filter(|v| v % 2 == 0);
    let odd = numbers.filter(|v| v % 2 != 0);
    even.merge(odd).subscribe_with(test.clone());

    let mut values = test.values();
    values.sort();
    assert_eq!(values, (0..10).collect::<Vec<_>>());
    assert_eq!(test.completions(), 1);
  }

  #[rxcore_macro::test]
  fn completes_after_both() {
    let scheduler = TestScheduler::new();
    let test = TestObserver::new();
    let fast = observable::interval(Duration::from_millis(1), scheduler.clone()).take(2);
    let slow = observable::interval(Duration::from_millis(10), scheduler.clone()).take(1);
    fast.merge(slow).subscribe_with(test.clone());

    scheduler.advance_by(Duration::from_millis(5));
    test.assert_values(&[0, 1]);
    test.assert_not_completed();
    scheduler.advance_by(Duration::from_millis(5));
    test.assert_values(&[0, 1, 0]);
    test.assert_completed();
  }

  #[rxcore_macro::test]
  fn first_error_cancels_the_rest() {
    let scheduler = TestScheduler::new();
    let test = TestObserver::new();
    let ticks = observable::interval(Duration::from_millis(1), scheduler.clone()).with_err();
    let failing = observable::timer(Duration::from_millis(3), scheduler.clone())
      .with_err()
      .try_map(|_| Err::<usize, _>("boom"));
    ticks.merge(failing).subscribe_with(test.clone());

    scheduler.advance_by(Duration::from_millis(10));
    // the timer was scheduled before the third tick, so it wins the tie at 3ms
    test.assert_values(&[0, 1]);
    assert_eq!(test.errors(), vec!["boom"]);
    test.assert_not_completed();
    assert_eq!(scheduler.pending(), 0);
  }

  #[rxcore_macro::test]
  fn merge_all_empty_completes() {
    let test = TestObserver::new();
    observable::merge_all(Vec::<observable::ObservableIter<Vec<i32>>>::new())
      .subscribe_with(test.clone());
    test.assert_completed();
  }
}
