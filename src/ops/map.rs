use crate::{
  observable::{CoreObservable, ObservableType},
  observer::Observer,
  subscription::{SharedSubscription, Subscription},
};

#[derive(Clone)]
pub struct Map<S, F> {
  pub source: S,
  pub func: F,
}

pub struct MapObserver<O, F> {
  observer: O,
  func: F,
}

impl<O, F, Item, Err, B> Observer<Item, Err> for MapObserver<O, F>
where
  O: Observer<B, Err>,
  F: FnMut(Item) -> B,
{
  fn next(&mut self, value: Item) { self.observer.next((self.func)(value)) }

  fn error(self, err: Err) { self.observer.error(err) }

  fn complete(self) { self.observer.complete() }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

impl<S, F, B> ObservableType for Map<S, F>
where
  S: ObservableType,
  F: FnMut(S::Item) -> B,
{
  type Item = B;
  type Err = S::Err;
}

impl<S, F, B, O> CoreObservable<O> for Map<S, F>
where
  S: CoreObservable<MapObserver<O, F>>,
  F: FnMut(S::Item) -> B,
  O: Observer<B, S::Err>,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let Map { source, func } = self;
    source.actual_subscribe(MapObserver { observer, func })
  }
}

#[derive(Clone)]
pub struct TryMap<S, F> {
  pub source: S,
  pub func: F,
}

/// Stops forwarding once the mapping function failed and cancels the
/// upstream.
pub struct TryMapObserver<O, F> {
  observer: Option<O>,
  func: F,
  subscription: SharedSubscription,
}

impl<O, F, Item, Err, B> Observer<Item, Err> for TryMapObserver<O, F>
where
  O: Observer<B, Err>,
  F: FnMut(Item) -> Result<B, Err>,
{
  fn next(&mut self, value: Item) {
    if self.observer.is_none() {
      return;
    }
    match (self.func)(value) {
      Ok(v) => Observer::<B, Err>::next(&mut self.observer, v),
      Err(err) => {
        Observer::<B, Err>::error(self.observer.take(), err);
        self.subscription.cancel();
      }
    }
  }

  fn error(self, err: Err) { Observer::<B, Err>::error(self.observer, err) }

  fn complete(self) { Observer::<B, Err>::complete(self.observer) }

  fn is_closed(&self) -> bool {
    self.subscription.is_closed() || Observer::<B, Err>::is_closed(&self.observer)
  }
}

impl<S, F, B> ObservableType for TryMap<S, F>
where
  S: ObservableType,
  F: FnMut(S::Item) -> Result<B, S::Err>,
{
  type Item = B;
  type Err = S::Err;
}

impl<S, F, B, O> CoreObservable<O> for TryMap<S, F>
where
  S: CoreObservable<TryMapObserver<O, F>>,
  S::Unsub: Send + 'static,
  F: FnMut(S::Item) -> Result<B, S::Err>,
  O: Observer<B, S::Err>,
{
  type Unsub = SharedSubscription;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let TryMap { source, func } = self;
    let subscription = SharedSubscription::default();
    let observer = TryMapObserver { observer: Some(observer), func, subscription: subscription.clone() };
    subscription.add(source.actual_subscribe(observer));
    subscription
  }
}

#[cfg(test)]
mod test {
  use std::sync::{Arc, Mutex};

  use crate::prelude::*;

  #[rxcore_macro::test]
  fn primitive_type() {
    let mut i = 0;
    observable::from_iter(100..101).map(|v| v * 2).subscribe(|v| i += v);
    assert_eq!(i, 200);
  }

  #[rxcore_macro::test]
  fn map_types_mixed() {
    let mut i = 0;
    observable::from_iter(vec!['a', 'b', 'c']).map(|_v| 1).subscribe(|v| i += v);
    assert_eq!(i, 3);
  }

  #[rxcore_macro::test]
  fn try_map_error_stops_upstream() {
    let produced = Arc::new(Mutex::new(vec![]));
    let c_produced = produced.clone();
    let test = TestObserver::new();
    observable::from_iter(1..=5)
      .map(move |v| {
        c_produced.lock().unwrap().push(v);
        v
      })
      .with_err::<String>()
      .try_map(|v| if v == 3 { Err(format!("fail at {v}")) } else { Ok(v * 10) })
      .subscribe_with(test.clone());

    test.assert_values(&[10, 20]);
    assert_eq!(test.errors(), vec!["fail at 3".to_owned()]);
    test.assert_not_completed();
    assert_eq!(*produced.lock().unwrap(), vec![1, 2, 3]);
  }

  #[rxcore_macro::test]
  fn try_map_error_leaves_hot_source() {
    let mut subject = Subject::<i32, &str>::new();
    let test = TestObserver::new();
    let subscription =
      subject.clone().try_map(|v| if v < 0 { Err("negative") } else { Ok(v) }).actual_subscribe(test.clone());
    subject.next(1);
    subject.next(-1);
    assert_eq!(subject.observer_count(), 0);
    assert!(subscription.is_closed());
    subject.next(2);
    test.assert_values(&[1]);
    assert_eq!(test.errors(), vec!["negative"]);
  }
}
