//! Core observable traits and the source factories.
//!
//! A source is a value describing how to produce events. Nothing happens
//! until it is subscribed; subscribing consumes the value, so running a
//! source again means subscribing a clone of it, which replays the recipe
//! from scratch (cold semantics).
//!
//! - [`ObservableType`] names the item and error types of a source.
//! - [`CoreObservable<O>`] is the subscription protocol for a concrete
//!   observer type `O`. Operators implement it by wrapping `O` and
//!   subscribing their upstream with the wrapper.
//! - [`Observable`] is the user-facing extension trait with every combinator
//!   and the `subscribe*` family. It is implemented for all sources.

use std::{convert::Infallible, time::Duration};

use crate::{
  observer::{FnMutObserver, Observer, ObserverAll},
  ops::{
    collect::Collect,
    filter::{Filter, TryFilter},
    flat_map::FlatMap,
    into_stream::ObservableStream,
    map::{Map, TryMap},
    map_err::MapErr,
    merge::Merge,
    concat::Concat,
    observe_on::ObserveOn,
    subscribe_on::SubscribeOn,
    take::{Take, TakeFor},
    zip::ZipWith,
  },
  scheduler::Scheduler,
  subscriber::Subscriber,
  subscription::{SharedSubscription, Subscription},
};

mod blocking;
mod boxed;
mod connectable;
mod create;
mod from_fn;
mod from_future;
mod from_iter;
mod interval;
mod trivial;

pub use blocking::*;
pub use boxed::*;
pub use connectable::*;
pub use create::*;
pub use from_fn::*;
pub use from_future::*;
pub use from_iter::*;
pub use interval::*;
pub use trivial::*;

pub use crate::ops::{concat::concat_all, merge::merge_all};

// ==================== Core traits ====================

/// Item and error types of a source.
pub trait ObservableType {
  type Item;
  type Err;
}

/// Subscription protocol of a source for the observer type `O`.
pub trait CoreObservable<O>: ObservableType {
  type Unsub: Subscription;

  /// Starts one execution, pushing events into `observer`.
  fn actual_subscribe(self, observer: O) -> Self::Unsub;
}

// ==================== Observable extension trait ====================

/// Combinators and subscription entry points, available on every source.
pub trait Observable: ObservableType + Sized {
  /// Transforms each value with `f`.
  ///
  /// ```
  /// use rxcore::prelude::*;
  ///
  /// let doubled = observable::from_iter(1..=3).map(|v| v * 2).blocking_collect();
  /// assert_eq!(doubled, Ok(vec![2, 4, 6]));
  /// ```
  fn map<B, F>(self, f: F) -> Map<Self, F>
  where
    F: FnMut(Self::Item) -> B,
  {
    Map { source: self, func: f }
  }

  /// Like `map`, but `f` may fail. The first `Err` is delivered as the
  /// stream's error and stops the upstream.
  fn try_map<B, F>(self, f: F) -> TryMap<Self, F>
  where
    F: FnMut(Self::Item) -> Result<B, Self::Err>,
  {
    TryMap { source: self, func: f }
  }

  /// Forwards only the values `predicate` accepts.
  fn filter<F>(self, predicate: F) -> Filter<Self, F>
  where
    F: FnMut(&Self::Item) -> bool,
  {
    Filter { source: self, predicate }
  }

  /// Fallible `filter`; an `Err` from the predicate ends the stream.
  fn try_filter<F>(self, predicate: F) -> TryFilter<Self, F>
  where
    F: FnMut(&Self::Item) -> Result<bool, Self::Err>,
  {
    TryFilter { source: self, predicate }
  }

  fn map_err<E, F>(self, f: F) -> MapErr<Self, F>
  where
    F: FnOnce(Self::Err) -> E,
  {
    MapErr { source: self, func: f }
  }

  /// Gives a stream that cannot fail the error type `E`, so it can be
  /// combined with fallible streams.
  #[allow(clippy::type_complexity)]
  fn with_err<E>(self) -> MapErr<Self, fn(Infallible) -> E>
  where
    Self: ObservableType<Err = Infallible>,
  {
    MapErr { source: self, func: unreachable_err::<E> }
  }

  /// Emits the first `count` values, then completes. `take(0)` completes
  /// without subscribing upstream.
  fn take(self, count: usize) -> Take<Self> { Take { source: self, count } }

  /// Mirrors the source until `duration` has elapsed on `scheduler`, then
  /// completes.
  fn take_for<SD: Scheduler>(self, duration: Duration, scheduler: SD) -> TakeFor<Self, SD> {
    TakeFor { source: self, duration, scheduler }
  }

  /// Runs both sources at once and forwards values in arrival order.
  fn merge<B>(self, other: B) -> Merge<Self, B>
  where
    B: ObservableType<Item = Self::Item, Err = Self::Err>,
  {
    Merge { source_a: self, source_b: other }
  }

  /// Subscribes `other` once this source completes.
  fn concat<B>(self, other: B) -> Concat<Self, B>
  where
    B: ObservableType<Item = Self::Item, Err = Self::Err>,
  {
    Concat { first: self, second: other }
  }

  /// Pairs up values of both sources in arrival order.
  #[allow(clippy::type_complexity)]
  fn zip<B>(self, other: B) -> ZipWith<Self, B, fn(Self::Item, B::Item) -> (Self::Item, B::Item)>
  where
    B: ObservableType<Err = Self::Err>,
  {
    ZipWith { source_a: self, source_b: other, combiner: pair::<Self::Item, B::Item> }
  }

  /// Pairs up values of both sources and emits `combiner(a, b)`.
  fn zip_with<B, F, Out>(self, other: B, combiner: F) -> ZipWith<Self, B, F>
  where
    B: ObservableType<Err = Self::Err>,
    F: FnMut(Self::Item, B::Item) -> Out,
  {
    ZipWith { source_a: self, source_b: other, combiner }
  }

  /// Maps each value to an inner source and merges all inner sources.
  fn flat_map<Inner, F>(self, f: F) -> FlatMap<Self, F>
  where
    F: FnMut(Self::Item) -> Inner,
    Inner: ObservableType<Err = Self::Err>,
  {
    FlatMap { source: self, func: f, concurrent: usize::MAX }
  }

  /// `flat_map` with at most `max_concurrent` inner sources subscribed at a
  /// time; the rest wait in arrival order.
  fn flat_map_max<Inner, F>(self, f: F, max_concurrent: usize) -> FlatMap<Self, F>
  where
    F: FnMut(Self::Item) -> Inner,
    Inner: ObservableType<Err = Self::Err>,
  {
    FlatMap { source: self, func: f, concurrent: max_concurrent.max(1) }
  }

  /// Maps each value to an inner source and runs them one after another.
  fn concat_map<Inner, F>(self, f: F) -> FlatMap<Self, F>
  where
    F: FnMut(Self::Item) -> Inner,
    Inner: ObservableType<Err = Self::Err>,
  {
    self.flat_map_max(f, 1)
  }

  /// Subscribes to the source from a task on `scheduler`.
  fn subscribe_on<SD: Scheduler>(self, scheduler: SD) -> SubscribeOn<Self, SD> {
    SubscribeOn { source: self, scheduler }
  }

  /// Delivers every event downstream from `scheduler`, in order.
  fn observe_on<SD: Scheduler>(self, scheduler: SD) -> ObserveOn<Self, SD> {
    ObserveOn { source: self, scheduler }
  }

  /// Shares one execution among many observers, started by `connect`.
  fn publish(self) -> ConnectableObservable<Self, Self::Item, Self::Err> {
    ConnectableObservable::new(self)
  }

  /// Gathers all values into `C` and emits it once the source completes.
  fn collect<C>(self) -> Collect<Self, C>
  where
    C: Default + Extend<Self::Item>,
  {
    Collect::new(self)
  }

  /// Erases the concrete source type.
  fn box_it(self) -> BoxedObservable<Self::Item, Self::Err>
  where
    Self: IntoBoxedObservable<Self::Item, Self::Err>,
  {
    BoxedObservable::new(self)
  }

  /// Subscribes now and exposes the events as a `futures::Stream` of
  /// `Result`s. Dropping the stream cancels the subscription.
  fn into_stream(self) -> ObservableStream<Self::Item, Self::Err>
  where
    Self: CoreObservable<
      Subscriber<
        crate::ops::into_stream::StreamObserver<
          <Self as ObservableType>::Item,
          <Self as ObservableType>::Err,
        >,
      >,
    >,
    <Self as CoreObservable<
      Subscriber<
        crate::ops::into_stream::StreamObserver<
          <Self as ObservableType>::Item,
          <Self as ObservableType>::Err,
        >,
      >,
    >>::Unsub: Send + 'static,
  {
    ObservableStream::new(self)
  }

  // ==================== Blocking adapters ====================

  /// Subscribes now and iterates the events on the calling thread, each
  /// value as `Ok`, a stream error as a final `Err`. Dropping the iterator
  /// cancels the subscription.
  ///
  /// Meant for program boundaries. A synchronous source that never ends
  /// blocks forever here; bound it first (for example with `take`).
  fn into_blocking_iter(self) -> BlockingIter<Self::Item, Self::Err>
  where
    Self: CoreObservable<Subscriber<BlockingObserver<<Self as ObservableType>::Item, <Self as ObservableType>::Err>>>,
    <Self as CoreObservable<Subscriber<BlockingObserver<<Self as ObservableType>::Item, <Self as ObservableType>::Err>>>>::Unsub:
      Send + 'static,
  {
    BlockingIter::new(self)
  }

  /// Waits for completion and returns every value, or the stream error.
  fn blocking_collect(self) -> Result<Vec<Self::Item>, Self::Err>
  where
    Self: CoreObservable<Subscriber<BlockingObserver<<Self as ObservableType>::Item, <Self as ObservableType>::Err>>>,
    <Self as CoreObservable<Subscriber<BlockingObserver<<Self as ObservableType>::Item, <Self as ObservableType>::Err>>>>::Unsub:
      Send + 'static,
  {
    self.into_blocking_iter().collect()
  }

  /// Waits for the first value and cancels the rest of the execution.
  /// `Ok(None)` if the source completes empty.
  fn blocking_first(self) -> Result<Option<Self::Item>, Self::Err>
  where
    Self: CoreObservable<Subscriber<BlockingObserver<<Self as ObservableType>::Item, <Self as ObservableType>::Err>>>,
    <Self as CoreObservable<Subscriber<BlockingObserver<<Self as ObservableType>::Item, <Self as ObservableType>::Err>>>>::Unsub:
      Send + 'static,
  {
    self.into_blocking_iter().next().transpose()
  }

  /// Waits for completion and returns the last value.
  fn blocking_last(self) -> Result<Option<Self::Item>, Self::Err>
  where
    Self: CoreObservable<Subscriber<BlockingObserver<<Self as ObservableType>::Item, <Self as ObservableType>::Err>>>,
    <Self as CoreObservable<Subscriber<BlockingObserver<<Self as ObservableType>::Item, <Self as ObservableType>::Err>>>>::Unsub:
      Send + 'static,
  {
    let mut last = None;
    for v in self.into_blocking_iter() {
      last = Some(v?);
    }
    Ok(last)
  }

  // ==================== Subscribing ====================

  /// Subscribes with a closure for values; for streams that cannot fail.
  fn subscribe<F>(self, next: F) -> SharedSubscription
  where
    F: FnMut(Self::Item),
    FnMutObserver<F>: Observer<Self::Item, Self::Err>,
    Self: CoreObservable<Subscriber<FnMutObserver<F>>>,
    <Self as CoreObservable<Subscriber<FnMutObserver<F>>>>::Unsub: Send + 'static,
  {
    self.subscribe_with(FnMutObserver(next))
  }

  /// Subscribes with one closure per event.
  fn subscribe_all<N, E, C>(self, next: N, error: E, complete: C) -> SharedSubscription
  where
    N: FnMut(Self::Item),
    E: FnOnce(Self::Err),
    C: FnOnce(),
    Self: CoreObservable<Subscriber<ObserverAll<N, E, C>>>,
    <Self as CoreObservable<Subscriber<ObserverAll<N, E, C>>>>::Unsub: Send + 'static,
  {
    self.subscribe_with(ObserverAll::new(next, error, complete))
  }

  fn subscribe_with<O>(self, observer: O) -> SharedSubscription
  where
    O: Observer<Self::Item, Self::Err>,
    Self: CoreObservable<Subscriber<O>>,
    <Self as CoreObservable<Subscriber<O>>>::Unsub: Send + 'static,
  {
    self.subscribe_within(SharedSubscription::default(), observer)
  }

  /// Subscribes under a subscription the caller created up front, so the
  /// observer can hold a clone of it and cancel from inside its own
  /// callbacks.
  ///
  /// ```
  /// use std::sync::{Arc, Mutex};
  /// use rxcore::prelude::*;
  ///
  /// let seen = Arc::new(Mutex::new(vec![]));
  /// let subscription = SharedSubscription::default();
  /// let (c_seen, c_subscription) = (seen.clone(), subscription.clone());
  /// observable::from_iter(0..).subscribe_within(
  ///   subscription,
  ///   FnMutObserver(move |v| {
  ///     c_seen.lock().unwrap().push(v);
  ///     if v == 2 {
  ///       c_subscription.cancel();
  ///     }
  ///   }),
  /// );
  /// assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2]);
  /// ```
  fn subscribe_within<O>(self, subscription: SharedSubscription, observer: O) -> SharedSubscription
  where
    O: Observer<Self::Item, Self::Err>,
    Self: CoreObservable<Subscriber<O>>,
    <Self as CoreObservable<Subscriber<O>>>::Unsub: Send + 'static,
  {
    let subscriber = Subscriber::new(observer, subscription.clone());
    let unsub = self.actual_subscribe(subscriber);
    subscription.add(unsub);
    subscription
  }
}

impl<T: ObservableType> Observable for T {}

fn pair<A, B>(a: A, b: B) -> (A, B) { (a, b) }

fn unreachable_err<E>(err: Infallible) -> E { match err {} }

#[cfg(test)]
mod tests {
  use std::sync::{Arc, Mutex};

  use crate::prelude::*;

  #[rxcore_macro::test]
  fn cold_source_replays_per_subscription() {
    let runs = Arc::new(Mutex::new(0));
    let c_runs = runs.clone();
    let source = observable::create(move |emitter: &mut dyn Emitter<i32, Infallible>| {
      *c_runs.lock().unwrap() += 1;
      emitter.next(1);
      emitter.next(2);
      emitter.complete();
    });
    assert_eq!(*runs.lock().unwrap(), 0);

    let first = source.clone().blocking_collect();
    let second = source.blocking_collect();
    assert_eq!(first, Ok(vec![1, 2]));
    assert_eq!(second, Ok(vec![1, 2]));
    assert_eq!(*runs.lock().unwrap(), 2);
  }

  #[rxcore_macro::test]
  fn cancel_inside_callback_stops_delivery() {
    let seen = Arc::new(Mutex::new(vec![]));
    let subscription = SharedSubscription::default();
    let (c_seen, c_subscription) = (seen.clone(), subscription.clone());
    let returned = observable::from_iter(0..100).map(|v| v * 10).subscribe_within(
      subscription,
      FnMutObserver(move |v| {
        c_seen.lock().unwrap().push(v);
        if v == 20 {
          c_subscription.cancel();
        }
      }),
    );
    assert_eq!(*seen.lock().unwrap(), vec![0, 10, 20]);
    assert!(returned.is_closed());
  }

  #[rxcore_macro::test]
  fn subscribe_all_sees_terminal_once() {
    let log = Arc::new(Mutex::new(vec![]));
    let (l1, l2, l3) = (log.clone(), log.clone(), log.clone());
    observable::from_iter([1, 2]).with_err::<String>().subscribe_all(
      move |v| l1.lock().unwrap().push(format!("next {v}")),
      move |e| l2.lock().unwrap().push(format!("error {e}")),
      move || l3.lock().unwrap().push("complete".to_owned()),
    );
    assert_eq!(*log.lock().unwrap(), vec!["next 1", "next 2", "complete"]);
  }
}
