use std::{convert::Infallible, marker::PhantomData};

use crate::{
  observable::{CoreObservable, ObservableType},
  observer::Observer,
};

/// Creates an observable that emits no items, just terminates with an error.
pub fn throw_err<Item, Err>(e: Err) -> Throw<Item, Err> { Throw(e, PhantomData) }

pub struct Throw<Item, Err>(Err, PhantomData<fn() -> Item>);

impl<Item, Err: Clone> Clone for Throw<Item, Err> {
  fn clone(&self) -> Self { Throw(self.0.clone(), PhantomData) }
}

impl<Item, Err> ObservableType for Throw<Item, Err> {
  type Item = Item;
  type Err = Err;
}

impl<Item, Err, O> CoreObservable<O> for Throw<Item, Err>
where
  O: Observer<Item, Err>,
{
  type Unsub = ();

  fn actual_subscribe(self, observer: O) -> Self::Unsub { observer.error(self.0) }
}

/// Creates an observable that produces no values.
///
/// Completes immediately. Never emits an error.
///
/// ```
/// use rxcore::prelude::*;
///
/// assert_eq!(observable::empty::<i32>().blocking_collect(), Ok(vec![]));
/// ```
pub fn empty<Item>() -> Empty<Item> { Empty(PhantomData) }

pub struct Empty<Item>(PhantomData<fn() -> Item>);

impl<Item> Clone for Empty<Item> {
  fn clone(&self) -> Self { Empty(PhantomData) }
}

impl<Item> ObservableType for Empty<Item> {
  type Item = Item;
  type Err = Infallible;
}

impl<Item, O> CoreObservable<O> for Empty<Item>
where
  O: Observer<Item, Infallible>,
{
  type Unsub = ();

  fn actual_subscribe(self, observer: O) -> Self::Unsub { observer.complete() }
}

/// Creates an observable that never emits anything.
///
/// Neither emits a value, nor completes, nor emits an error.
pub fn never<Item>() -> Never<Item> { Never(PhantomData) }

pub struct Never<Item>(PhantomData<fn() -> Item>);

impl<Item> Clone for Never<Item> {
  fn clone(&self) -> Self { Never(PhantomData) }
}

impl<Item> ObservableType for Never<Item> {
  type Item = Item;
  type Err = Infallible;
}

impl<Item, O> CoreObservable<O> for Never<Item>
where
  O: Observer<Item, Infallible>,
{
  type Unsub = ();

  fn actual_subscribe(self, _observer: O) -> Self::Unsub {}
}

#[cfg(test)]
mod test {
  use crate::prelude::*;

  #[rxcore_macro::test]
  fn throw() {
    let test = TestObserver::new();
    observable::throw_err::<i32, _>("boom").subscribe_with(test.clone());
    test.assert_value_count(0);
    assert_eq!(test.errors(), vec!["boom"]);
    test.assert_not_completed();
  }

  #[rxcore_macro::test]
  fn empty() {
    let test = TestObserver::new();
    observable::empty::<i32>().subscribe_with(test.clone());
    test.assert_value_count(0);
    test.assert_completed();
  }

  #[rxcore_macro::test]
  fn never() {
    let test = TestObserver::new();
    let subscription = observable::never::<i32>().subscribe_with(test.clone());
    test.assert_value_count(0);
    test.assert_not_completed();
    assert!(test.errors().is_empty());
    assert!(!subscription.is_closed());
  }
}
