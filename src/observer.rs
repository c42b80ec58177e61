//! The consuming side of a stream: [`Observer`] and the adapters that turn
//! closures, boxes and shared cells into observers.

use std::convert::Infallible;

use crate::rc::MutArc;

// ============================================================================
// Observer Trait
// ============================================================================

/// Receives the events of one execution.
///
/// An observer receives a sequence of `next` calls followed by at most one
/// terminal call. The terminal methods consume the observer, so the type
/// system rules out a second terminal event.
pub trait Observer<Item, Err> {
  fn next(&mut self, value: Item);

  fn error(self, err: Err);

  fn complete(self);

  /// Returns `true` if the observer will not accept more values.
  ///
  /// Sources poll this between emissions to stop early, for example after a
  /// downstream `take` is satisfied or the subscription was cancelled.
  fn is_closed(&self) -> bool;
}

// ============================================================================
// Emitter Trait
// ============================================================================

/// The handle a [`create`](crate::observable::create) recipe emits through.
///
/// All methods take `&mut self` so the recipe can be handed a
/// `&mut dyn Emitter` without knowing the concrete observer type. Events
/// after the first terminal call are dropped.
pub trait Emitter<Item, Err> {
  fn next(&mut self, value: Item);
  fn error(&mut self, err: Err);
  fn complete(&mut self);
  /// `true` once a terminal event was emitted or the consumer cancelled.
  fn is_closed(&self) -> bool;
}

// ============================================================================
// Boxed observers
// ============================================================================

/// Object-safe mirror of [`Observer`], so observers can live behind a `Box`.
pub trait DynObserver<Item, Err> {
  fn box_next(&mut self, value: Item);
  fn box_error(self: Box<Self>, err: Err);
  fn box_complete(self: Box<Self>);
  fn box_is_closed(&self) -> bool;
}

impl<T, Item, Err> DynObserver<Item, Err> for T
where
  T: Observer<Item, Err>,
{
  fn box_next(&mut self, value: Item) { self.next(value); }
  fn box_error(self: Box<Self>, err: Err) { self.error(err); }
  fn box_complete(self: Box<Self>) { self.complete(); }
  fn box_is_closed(&self) -> bool { self.is_closed() }
}

/// Boxed observer that can be moved across threads.
pub type BoxedObserver<'a, Item, Err> = Box<dyn DynObserver<Item, Err> + Send + 'a>;

impl<'a, Item, Err> Observer<Item, Err> for BoxedObserver<'a, Item, Err> {
  #[inline]
  fn next(&mut self, value: Item) { (**self).box_next(value) }

  #[inline]
  fn error(self, err: Err) { self.box_error(err) }

  #[inline]
  fn complete(self) { self.box_complete() }

  #[inline]
  fn is_closed(&self) -> bool { (**self).box_is_closed() }
}

// ============================================================================
// Closure adapters
// ============================================================================

/// Adapts a `FnMut(Item)` closure into an observer of an infallible stream.
#[derive(Clone)]
pub struct FnMutObserver<F>(pub F);

impl<F, Item> Observer<Item, Infallible> for FnMutObserver<F>
where
  F: FnMut(Item),
{
  #[inline]
  fn next(&mut self, v: Item) { (self.0)(v); }

  #[inline]
  fn error(self, err: Infallible) { match err {} }

  #[inline]
  fn complete(self) {}

  #[inline]
  fn is_closed(&self) -> bool { false }
}

/// Observer built from three closures, one per event.
#[derive(Clone)]
pub struct ObserverAll<N, E, C> {
  next: N,
  error: E,
  complete: C,
}

impl<N, E, C> ObserverAll<N, E, C> {
  pub fn new(next: N, error: E, complete: C) -> Self { ObserverAll { next, error, complete } }
}

impl<Item, Err, N, E, C> Observer<Item, Err> for ObserverAll<N, E, C>
where
  N: FnMut(Item),
  E: FnOnce(Err),
  C: FnOnce(),
{
  #[inline]
  fn next(&mut self, value: Item) { (self.next)(value) }

  #[inline]
  fn error(self, err: Err) { (self.error)(err) }

  #[inline]
  fn complete(self) { (self.complete)() }

  #[inline]
  fn is_closed(&self) -> bool { false }
}

// ============================================================================
// Observer implementations for Option and the shared Option cell
// ============================================================================

/// `None` swallows every event.
impl<O, Item, Err> Observer<Item, Err> for Option<O>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) {
    if let Some(inner) = self {
      inner.next(value);
    }
  }

  fn error(self, err: Err) {
    if let Some(inner) = self {
      inner.error(err);
    }
  }

  fn complete(self) {
    if let Some(inner) = self {
      inner.complete();
    }
  }

  fn is_closed(&self) -> bool { self.as_ref().is_none_or(Observer::is_closed) }
}

/// Shared observer cell. Values are delivered while the lock is held, which
/// serializes concurrent producers. Terminal events take the observer out
/// first and are delivered after the lock is released.
impl<O, Item, Err> Observer<Item, Err> for MutArc<Option<O>>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) { Observer::<Item, Err>::next(&mut *self.rc_deref_mut(), value) }

  fn error(self, err: Err) {
    let inner = self.rc_deref_mut().take();
    if let Some(inner) = inner {
      inner.error(err);
    }
  }

  fn complete(self) {
    let inner = self.rc_deref_mut().take();
    if let Some(inner) = inner {
      inner.complete();
    }
  }

  fn is_closed(&self) -> bool { Observer::<Item, Err>::is_closed(&*self.rc_deref()) }
}

// ============================================================================
// Tests
// ============================================================================
