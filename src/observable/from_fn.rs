use crate::{
  observable::{CoreObservable, ObservableType},
  observer::Observer,
};

/// Calls `f` on every subscription and emits its result.
///
/// `Ok(v)` is emitted as a single value followed by completion, `Err(e)` as
/// the stream error. The call happens at subscription time, not when the
/// source is built, so each subscriber sees a fresh result.
///
/// ```
/// use rxcore::prelude::*;
///
/// let answer = observable::from_fn(|| "42".parse::<u32>());
/// assert_eq!(answer.blocking_first(), Ok(Some(42)));
/// ```
pub fn from_fn<F, Item, Err>(f: F) -> FromFn<F>
where
  F: FnOnce() -> Result<Item, Err>,
{
  FromFn(f)
}

#[derive(Clone)]
pub struct FromFn<F>(F);

impl<F, Item, Err> ObservableType for FromFn<F>
where
  F: FnOnce() -> Result<Item, Err>,
{
  type Item = Item;
  type Err = Err;
}

impl<F, Item, Err, O> CoreObservable<O> for FromFn<F>
where
  F: FnOnce() -> Result<Item, Err>,
  O: Observer<Item, Err>,
{
  type Unsub = ();

  fn actual_subscribe(self, mut observer: O) -> Self::Unsub {
    match (self.0)() {
      Ok(v) => {
        observer.next(v);
        if !observer.is_closed() {
          observer.complete();
        }
      }
      Err(e) => observer.error(e),
    }
  }
}
