use std::{convert::Infallible, future::Future, marker::PhantomData};

use crate::{
  observable::{CoreObservable, ObservableType},
  observer::Observer,
  scheduler::{Scheduler, TaskHandle},
};

/// A source that drives `future` on `scheduler` once subscribed and emits
/// its output, then completes. The output is always a value, even when it
/// is a `Result`. Cancelling drops the future.
///
/// ```rust
/// # use rxcore::prelude::*;
/// let value = observable::from_future(futures::future::ready(1), Schedulers::computation())
///   .blocking_first();
/// assert_eq!(value, Ok(Some(1)));
/// ```
/// Use [`from_future_result`] to route an `Err` output to the error channel.
pub fn from_future<F, SD>(future: F, scheduler: SD) -> FromFuture<F, SD>
where
  F: Future,
{
  FromFuture { future, scheduler }
}

#[derive(Clone)]
pub struct FromFuture<F, SD> {
  future: F,
  scheduler: SD,
}

impl<F: Future, SD> ObservableType for FromFuture<F, SD> {
  type Item = F::Output;
  type Err = Infallible;
}

impl<F, SD, O> CoreObservable<O> for FromFuture<F, SD>
where
  F: Future + Send + 'static,
  SD: Scheduler,
  O: Observer<F::Output, Infallible> + Send + 'static,
{
  type Unsub = TaskHandle;

  fn actual_subscribe(self, mut observer: O) -> Self::Unsub {
    let future = self.future;
    self.scheduler.spawn_future(Box::pin(async move {
      let v = future.await;
      observer.next(v);
      if !observer.is_closed() {
        observer.complete();
      }
    }))
  }
}

/// Like [`from_future`] for futures resolving to a `Result`: `Ok(v)` gives
/// `v` and completion, `Err(e)` gives one error.
pub fn from_future_result<F, SD, Item, Err>(
  future: F,
  scheduler: SD,
) -> FromFutureResult<F, SD, Item, Err>
where
  F: Future<Output = Result<Item, Err>>,
{
  FromFutureResult { future, scheduler, _marker: PhantomData }
}

pub struct FromFutureResult<F, SD, Item, Err> {
  future: F,
  scheduler: SD,
  _marker: PhantomData<fn() -> (Item, Err)>,
}

impl<F: Clone, SD: Clone, Item, Err> Clone for FromFutureResult<F, SD, Item, Err> {
  fn clone(&self) -> Self {
    FromFutureResult {
      future: self.future.clone(),
      scheduler: self.scheduler.clone(),
      _marker: PhantomData,
    }
  }
}

impl<F, SD, Item, Err> ObservableType for FromFutureResult<F, SD, Item, Err> {
  type Item = Item;
  type Err = Err;
}

impl<F, SD, Item, Err, O> CoreObservable<O> for FromFutureResult<F, SD, Item, Err>
where
  F: Future<Output = Result<Item, Err>> + Send + 'static,
  SD: Scheduler,
  O: Observer<Item, Err> + Send + 'static,
{
  type Unsub = TaskHandle;

  fn actual_subscribe(self, mut observer: O) -> Self::Unsub {
    let future = self.future;
    self.scheduler.spawn_future(Box::pin(async move {
      match future.await {
        Ok(v) => {
          observer.next(v);
          if !observer.is_closed() {
            observer.complete();
          }
        }
        Err(e) => observer.error(e),
      }
    }))
  }
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use futures::future;

  use crate::prelude::*;

  #[rxcore_macro::test]
  fn future_value_then_complete() {
    let test = TestObserver::new();
    observable::from_future(future::ready(5), Schedulers::computation())
      .subscribe_with(test.clone());
    test.await_terminal(Duration::from_secs(5)).unwrap();
    test.assert_values(&[5]);
    test.assert_completed();
  }

  #[rxcore_macro::test]
  fn future_result_error() {
    let test = TestObserver::new();
    observable::from_future_result(future::ready(Err::<i32, _>("bad")), Schedulers::io())
      .subscribe_with(test.clone());
    test.await_terminal(Duration::from_secs(5)).unwrap();
    assert_eq!(test.errors(), vec!["bad"]);
    test.assert_value_count(0);
  }

  #[rxcore_macro::test]
  fn immediate_scheduler_blocks_on_future() {
    let value = observable::from_future(async { "done" }, Schedulers::immediate()).blocking_first();
    assert_eq!(value, Ok(Some("done")));
  }

  #[rxcore_macro::test]
  fn cancel_drops_pending_future() {
    let test = TestObserver::<(), Infallible>::new();
    let subscription = observable::from_future(future::pending::<()>(), Schedulers::computation())
      .subscribe_with(test.clone());
    subscription.unsubscribe();
    assert!(test.await_terminal(Duration::from_millis(50)).is_err());
  }
}
