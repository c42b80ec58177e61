use std::sync::mpsc::{channel, Receiver, Sender};

use crate::{
  observable::{CoreObservable, Observable, ObservableType},
  observer::Observer,
  subscriber::Subscriber,
  subscription::SharedSubscription,
};

/// Observer half of [`BlockingIter`]: forwards events into a channel.
pub struct BlockingObserver<Item, Err>(Sender<Result<Item, Err>>);

impl<Item, Err> Observer<Item, Err> for BlockingObserver<Item, Err> {
  fn next(&mut self, value: Item) { let _ = self.0.send(Ok(value)); }

  fn error(self, err: Err) { let _ = self.0.send(Err(err)); }

  // dropping the sender ends the iteration
  fn complete(self) {}

  fn is_closed(&self) -> bool { false }
}

/// Iterator over the events of a running subscription.
pub struct BlockingIter<Item, Err> {
  receiver: Receiver<Result<Item, Err>>,
  subscription: SharedSubscription,
  done: bool,
}

impl<Item, Err> BlockingIter<Item, Err> {
  pub(crate) fn new<S>(source: S) -> Self
  where
    S: ObservableType<Item = Item, Err = Err>
      + CoreObservable<Subscriber<BlockingObserver<Item, Err>>>,
    <S as CoreObservable<Subscriber<BlockingObserver<Item, Err>>>>::Unsub: Send + 'static,
  {
    let (sender, receiver) = channel();
    let subscription = source.subscribe_with(BlockingObserver(sender));
    BlockingIter { receiver, subscription, done: false }
  }
}

impl<Item, Err> Iterator for BlockingIter<Item, Err> {
  type Item = Result<Item, Err>;

  fn next(&mut self) -> Option<Self::Item> {
    if self.done {
      return None;
    }
    match self.receiver.recv() {
      Ok(Ok(v)) => Some(Ok(v)),
      Ok(Err(err)) => {
        self.done = true;
        Some(Err(err))
      }
      Err(_) => {
        self.done = true;
        None
      }
    }
  }
}

impl<Item, Err> Drop for BlockingIter<Item, Err> {
  fn drop(&mut self) { self.subscription.cancel(); }
}
