use std::collections::VecDeque;

use crate::{
  observable::{CoreObservable, ObservableType},
  observer::Observer,
  subscription::{BoxedSubscription, SharedSubscription, Subscription},
};

/// Subscribes `second` once `first` completes.
#[derive(Clone)]
pub struct Concat<A, B> {
  pub first: A,
  pub second: B,
}

pub struct ConcatObserver<O, B> {
  observer: O,
  second: B,
  subscription: SharedSubscription,
}

impl<O, B, Item, Err> Observer<Item, Err> for ConcatObserver<O, B>
where
  O: Observer<Item, Err>,
  B: CoreObservable<O>,
  B::Unsub: Send + 'static,
{
  fn next(&mut self, value: Item) { self.observer.next(value) }

  fn error(self, err: Err) { self.observer.error(err) }

  fn complete(self) {
    let ConcatObserver { observer, second, subscription } = self;
    if !subscription.is_closed() {
      subscription.add(second.actual_subscribe(observer));
    }
  }

  fn is_closed(&self) -> bool { self.subscription.is_closed() || self.observer.is_closed() }
}

impl<A: ObservableType, B> ObservableType for Concat<A, B> {
  type Item = A::Item;
  type Err = A::Err;
}

impl<A, B, O, Item, Err> CoreObservable<O> for Concat<A, B>
where
  A: CoreObservable<ConcatObserver<O, B>> + ObservableType<Item = Item, Err = Err>,
  B: CoreObservable<O> + ObservableType<Item = Item, Err = Err>,
  A::Unsub: Send + 'static,
  <B as CoreObservable<O>>::Unsub: Send + 'static,
  O: Observer<Item, Err>,
{
  type Unsub = SharedSubscription;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let subscription = SharedSubscription::default();
    let first = ConcatObserver { observer, second: self.second, subscription: subscription.clone() };
    subscription.add(self.first.actual_subscribe(first));
    subscription
  }
}

type Thunk<O> = Box<dyn FnOnce(ConcatAllObserver<O>) -> BoxedSubscription + Send>;

/// Runs the sources one after another, each subscribed when the previous
/// one completes. An error ends the sequence; the remaining sources are never
/// subscribed.
///
/// ```
/// use rxcore::prelude::*;
///
/// let all = observable::concat_all(vec![
///   observable::from_iter(vec![1, 2]),
///   observable::from_iter(vec![3]),
///   observable::from_iter(vec![4]),
/// ]);
/// assert_eq!(all.blocking_collect(), Ok(vec![1, 2, 3, 4]));
/// ```
pub fn concat_all<I>(sources: I) -> ConcatAll<I>
where
  I: IntoIterator,
  I::Item: ObservableType,
{
  ConcatAll { sources }
}

#[derive(Clone)]
pub struct ConcatAll<I> {
  sources: I,
}

/// Carries the not yet subscribed sources along; each completion hands the
/// queue to the next source.
pub struct ConcatAllObserver<O> {
  observer: O,
  queue: VecDeque<Thunk<O>>,
  subscription: SharedSubscription,
}

impl<O> ConcatAllObserver<O> {
  fn subscribe_next(mut self) -> Option<O> {
    match self.queue.pop_front() {
      Some(subscribe) => {
        let subscription = self.subscription.clone();
        if !subscription.is_closed() {
          subscription.add(subscribe(self));
        }
        None
      }
      None => Some(self.observer),
    }
  }
}

impl<O, Item, Err> Observer<Item, Err> for ConcatAllObserver<O>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) { self.observer.next(value) }

  fn error(self, err: Err) { self.observer.error(err) }

  fn complete(self) {
    if let Some(observer) = self.subscribe_next() {
      observer.complete();
    }
  }

  fn is_closed(&self) -> bool { self.subscription.is_closed() || self.observer.is_closed() }
}

impl<I> ObservableType for ConcatAll<I>
where
  I: IntoIterator,
  I::Item: ObservableType,
{
  type Item = <I::Item as ObservableType>::Item;
  type Err = <I::Item as ObservableType>::Err;
}

impl<I, S, O, Item, Err> CoreObservable<O> for ConcatAll<I>
where
  I: IntoIterator<Item = S>,
  S: CoreObservable<ConcatAllObserver<O>> + ObservableType<Item = Item, Err = Err> + Send + 'static,
  S::Unsub: Send + 'static,
  O: Observer<Item, Err> + 'static,
{
  type Unsub = SharedSubscription;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let queue = self
      .sources
      .into_iter()
      .map(|source| -> Thunk<O> {
        Box::new(move |observer| BoxedSubscription::new(source.actual_subscribe(observer)))
      })
      .collect();
    let subscription = SharedSubscription::default();
    let concat = ConcatAllObserver { observer, queue, subscription: subscription.clone() };
    if let Some(observer) = concat.subscribe_next() {
      observer.complete();
    }
    subscription
  }
}
