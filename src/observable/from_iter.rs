use std::{
  convert::Infallible,
  iter::{Repeat, Take},
  ops::Range,
};

use crate::{
  observable::{CoreObservable, ObservableType},
  observer::Observer,
};

/// Creates an observable that produces values from an iterator.
///
/// Completes when all elements have been emitted. Never emits an error.
/// Emission stops early once the observer is closed, so an unbounded
/// iterator is fine behind `take`.
///
/// ```
/// use rxcore::prelude::*;
///
/// observable::from_iter(vec![0, 1, 2, 3]).subscribe(|v| println!("{v},"));
/// ```
pub fn from_iter<Iter>(iter: Iter) -> ObservableIter<Iter>
where
  Iter: IntoIterator,
{
  ObservableIter(iter)
}

#[derive(Clone)]
pub struct ObservableIter<Iter>(Iter);

impl<Iter: IntoIterator> ObservableType for ObservableIter<Iter> {
  type Item = Iter::Item;
  type Err = Infallible;
}

impl<O, Iter> CoreObservable<O> for ObservableIter<Iter>
where
  Iter: IntoIterator,
  O: Observer<Iter::Item, Infallible>,
{
  type Unsub = ();

  fn actual_subscribe(self, mut observer: O) -> Self::Unsub {
    for v in self.0 {
      if observer.is_closed() {
        return;
      }
      observer.next(v);
    }
    if !observer.is_closed() {
      observer.complete();
    }
  }
}

/// Emits `v` once, then completes.
pub fn of<Item>(v: Item) -> ObservableIter<std::iter::Once<Item>> { from_iter(std::iter::once(v)) }

/// Emits `count` consecutive integers starting at `start`, then completes.
///
/// The sequence is cut short at `i64::MAX` rather than overflowing.
pub fn range(start: i64, count: usize) -> ObservableIter<Range<i64>> {
  let count = i64::try_from(count).unwrap_or(i64::MAX);
  from_iter(start..start.saturating_add(count))
}

/// Creates an observable producing same value repeated N times.
pub fn repeat<Item>(v: Item, n: usize) -> ObservableIter<Take<Repeat<Item>>>
where
  Item: Clone,
{
  from_iter(std::iter::repeat(v).take(n))
}
