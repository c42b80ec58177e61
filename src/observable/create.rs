use std::marker::PhantomData;

use crate::{
  observable::{CoreObservable, ObservableType},
  observer::{Emitter, Observer},
  subscription::Subscription,
};

/// Source returned by [`create`].
pub struct Create<F, Item, Err> {
  f: F,
  _marker: PhantomData<fn() -> (Item, Err)>,
}

/// Builds a source from a recipe.
///
/// The recipe runs once per subscription, on the subscribing thread. It
/// emits through the `Emitter` and returns a teardown subscription (`()`
/// when nothing needs releasing). A long-running recipe should poll
/// `emitter.is_closed()` and stop when it turns `true`. Everything emitted
/// after a terminal event is ignored.
///
/// ```
/// use std::convert::Infallible;
/// use rxcore::prelude::*;
///
/// let source = observable::create(|emitter: &mut dyn Emitter<i32, Infallible>| {
///   let mut i = 0;
///   while !emitter.is_closed() {
///     emitter.next(i);
///     i += 1;
///   }
/// });
/// assert_eq!(source.take(5).blocking_collect(), Ok(vec![0, 1, 2, 3, 4]));
/// ```
pub fn create<F, Item, Err, U>(f: F) -> Create<F, Item, Err>
where
  F: FnOnce(&mut dyn Emitter<Item, Err>) -> U,
  U: Subscription,
{
  Create { f, _marker: PhantomData }
}

impl<F: Clone, Item, Err> Clone for Create<F, Item, Err> {
  fn clone(&self) -> Self { Create { f: self.f.clone(), _marker: PhantomData } }
}

impl<F, Item, Err> ObservableType for Create<F, Item, Err> {
  type Item = Item;
  type Err = Err;
}

/// Drops the observer on the first terminal event.
struct CreateEmitter<O>(Option<O>);

impl<O, Item, Err> Emitter<Item, Err> for CreateEmitter<O>
where
  O: Observer<Item, Err>,
{
  #[inline]
  fn next(&mut self, value: Item) {
    if let Some(observer) = &mut self.0 {
      observer.next(value);
    }
  }

  #[inline]
  fn error(&mut self, err: Err) {
    if let Some(observer) = self.0.take() {
      observer.error(err);
    }
  }

  #[inline]
  fn complete(&mut self) {
    if let Some(observer) = self.0.take() {
      observer.complete();
    }
  }

  #[inline]
  fn is_closed(&self) -> bool { Observer::<Item, Err>::is_closed(&self.0) }
}

impl<O, F, Item, Err, U> CoreObservable<O> for Create<F, Item, Err>
where
  O: Observer<Item, Err>,
  F: FnOnce(&mut dyn Emitter<Item, Err>) -> U,
  U: Subscription,
{
  type Unsub = U;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let mut emitter = CreateEmitter(Some(observer));
    (self.f)(&mut emitter)
  }
}
