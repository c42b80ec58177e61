use crate::{
  observable::{CoreObservable, ObservableType},
  observer::Observer,
  subscription::{SharedSubscription, Subscription},
};

#[derive(Clone)]
pub struct Filter<S, F> {
  pub source: S,
  pub predicate: F,
}

pub struct FilterObserver<O, F> {
  observer: O,
  predicate: F,
}

impl<O, F, Item, Err> Observer<Item, Err> for FilterObserver<O, F>
where
  O: Observer<Item, Err>,
  F: FnMut(&Item) -> bool,
{
  fn next(&mut self, value: Item) {
    if (self.predicate)(&value) {
      self.observer.next(value)
    }
  }

  fn error(self, err: Err) { self.observer.error(err) }

  fn complete(self) { self.observer.complete() }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

impl<S: ObservableType, F> ObservableType for Filter<S, F> {
  type Item = S::Item;
  type Err = S::Err;
}

impl<S, F, O> CoreObservable<O> for Filter<S, F>
where
  S: CoreObservable<FilterObserver<O, F>>,
  F: FnMut(&S::Item) -> bool,
  O: Observer<S::Item, S::Err>,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let Filter { source, predicate } = self;
    source.actual_subscribe(FilterObserver { observer, predicate })
  }
}

#[derive(Clone)]
pub struct TryFilter<S, F> {
  pub source: S,
  pub predicate: F,
}

pub struct TryFilterObserver<O, F> {
  observer: Option<O>,
  predicate: F,
  subscription: SharedSubscription,
}

impl<O, F, Item, Err> Observer<Item, Err> for TryFilterObserver<O, F>
where
  O: Observer<Item, Err>,
  F: FnMut(&Item) -> Result<bool, Err>,
{
  fn next(&mut self, value: Item) {
    let Some(observer) = self.observer.as_mut() else { return };
    match (self.predicate)(&value) {
      Ok(true) => observer.next(value),
      Ok(false) => {}
      Err(err) => {
        Observer::<Item, Err>::error(self.observer.take(), err);
        self.subscription.cancel();
      }
    }
  }

  fn error(self, err: Err) { Observer::<Item, Err>::error(self.observer, err) }

  fn complete(self) { Observer::<Item, Err>::complete(self.observer) }

  fn is_closed(&self) -> bool {
    self.subscription.is_closed() || Observer::<Item, Err>::is_closed(&self.observer)
  }
}

impl<S: ObservableType, F> ObservableType for TryFilter<S, F> {
  type Item = S::Item;
  type Err = S::Err;
}

impl<S, F, O> CoreObservable<O> for TryFilter<S, F>
where
  S: CoreObservable<TryFilterObserver<O, F>>,
  S::Unsub: Send + 'static,
  F: FnMut(&S::Item) -> Result<bool, S::Err>,
  O: Observer<S::Item, S::Err>,
{
  type Unsub = SharedSubscription;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let TryFilter { source, predicate } = self;
    let subscription = SharedSubscription::default();
    let observer =
      TryFilterObserver { observer: Some(observer), predicate, subscription: subscription.clone() };
    subscription.add(source.actual_subscribe(observer));
    subscription
  }
}
