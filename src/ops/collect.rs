use std::marker::PhantomData;

use crate::{
  observable::{CoreObservable, ObservableType},
  observer::Observer,
};

/// Gathers every value into a `C` and emits it as the single value once the
/// source completes. Nothing is emitted on error.
pub struct Collect<S, C> {
  source: S,
  _marker: PhantomData<fn() -> C>,
}

impl<S, C> Collect<S, C> {
  pub(crate) fn new(source: S) -> Self { Collect { source, _marker: PhantomData } }
}

impl<S: Clone, C> Clone for Collect<S, C> {
  fn clone(&self) -> Self { Collect::new(self.source.clone()) }
}

pub struct CollectObserver<O, C> {
  observer: O,
  acc: C,
}

impl<O, C, Item, Err> Observer<Item, Err> for CollectObserver<O, C>
where
  O: Observer<C, Err>,
  C: Extend<Item>,
{
  fn next(&mut self, value: Item) { self.acc.extend(Some(value)) }

  fn error(self, err: Err) { self.observer.error(err) }

  fn complete(self) {
    let CollectObserver { mut observer, acc } = self;
    observer.next(acc);
    if !observer.is_closed() {
      observer.complete();
    }
  }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

impl<S: ObservableType, C> ObservableType for Collect<S, C> {
  type Item = C;
  type Err = S::Err;
}

impl<S, C, O> CoreObservable<O> for Collect<S, C>
where
  S: CoreObservable<CollectObserver<O, C>>,
  C: Default + Extend<S::Item>,
  O: Observer<C, S::Err>,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    self.source.actual_subscribe(CollectObserver { observer, acc: C::default() })
  }
}
