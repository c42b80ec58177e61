//! Bridge from a running subscription to a `futures::Stream`.
//!
//! ```
//! use futures::StreamExt;
//! use rxcore::prelude::*;
//!
//! # futures::executor::block_on(async {
//! let mut stream = observable::from_iter([1, 2]).into_stream();
//! assert_eq!(stream.next().await, Some(Ok(1)));
//! assert_eq!(stream.next().await, Some(Ok(2)));
//! assert_eq!(stream.next().await, None);
//! # });
//! ```

use std::{
  pin::Pin,
  task::{Context, Poll},
};

use futures::{
  channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender},
  Stream, StreamExt,
};

use crate::{
  observable::{CoreObservable, Observable, ObservableType},
  observer::Observer,
  subscriber::Subscriber,
  subscription::SharedSubscription,
};

/// Observer half of [`ObservableStream`]. Closed once the stream is dropped.
pub struct StreamObserver<Item, Err>(UnboundedSender<Result<Item, Err>>);

impl<Item, Err> Observer<Item, Err> for StreamObserver<Item, Err> {
  fn next(&mut self, value: Item) { let _ = self.0.unbounded_send(Ok(value)); }

  fn error(self, err: Err) { let _ = self.0.unbounded_send(Err(err)); }

  fn complete(self) {}

  fn is_closed(&self) -> bool { self.0.is_closed() }
}

/// Values as `Ok`, a stream error as a final `Err`, then the end of the
/// stream. Dropping it cancels the subscription.
pub struct ObservableStream<Item, Err> {
  receiver: UnboundedReceiver<Result<Item, Err>>,
  subscription: SharedSubscription,
}

impl<Item, Err> ObservableStream<Item, Err> {
  pub(crate) fn new<S>(source: S) -> Self
  where
    S: ObservableType<Item = Item, Err = Err> + CoreObservable<Subscriber<StreamObserver<Item, Err>>>,
    <S as CoreObservable<Subscriber<StreamObserver<Item, Err>>>>::Unsub: Send + 'static,
  {
    let (sender, receiver) = unbounded();
    let subscription = source.subscribe_with(StreamObserver(sender));
    ObservableStream { receiver, subscription }
  }
}

impl<Item, Err> Stream for ObservableStream<Item, Err> {
  type Item = Result<Item, Err>;

  fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
    self.receiver.poll_next_unpin(cx)
  }
}

impl<Item, Err> Drop for ObservableStream<Item, Err> {
  fn drop(&mut self) { self.subscription.cancel(); }
}

#[cfg(test)]
mod test {
  use std::time::Duration;

  use futures::StreamExt;

  use crate::prelude::*;

  #[rxcore_macro::test]
  async fn stream_of_async_source() {
    let values: Vec<_> = observable::interval(Duration::from_millis(1), Schedulers::io())
      .take(3)
      .into_stream()
      .collect()
      .await;
    assert_eq!(values, vec![Ok(0), Ok(1), Ok(2)]);
  }

  #[rxcore_macro::test]
  async fn error_is_last_item() {
    let mut stream =
      observable::from_iter([1]).with_err().concat(observable::throw_err("gone")).into_stream();
    assert_eq!(stream.next().await, Some(Ok(1)));
    assert_eq!(stream.next().await, Some(Err("gone")));
    assert_eq!(stream.next().await, None);
  }

  #[rxcore_macro::test]
  async fn drop_cancels() {
    let stream = observable::interval(Duration::from_millis(1), Schedulers::computation()).into_stream();
    let subscription = stream.subscription.clone();
    let mut first = stream.take(1);
    assert_eq!(first.next().await, Some(Ok(0)));
    drop(first);
    assert!(subscription.is_closed());
  }
}
