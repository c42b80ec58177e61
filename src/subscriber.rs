use crate::{
  observer::Observer,
  subscription::{SharedSubscription, Subscription},
};

/// The guard placed in front of every consumer by `subscribe*`.
///
/// Events arriving after the subscription was cancelled are dropped, as is
/// everything after the first terminal event. A terminal event closes the
/// subscription, which releases whatever the upstream still holds.
pub struct Subscriber<O> {
  observer: Option<O>,
  subscription: SharedSubscription,
}

impl<O> Subscriber<O> {
  pub fn new(observer: O, subscription: SharedSubscription) -> Self {
    Subscriber { observer: Some(observer), subscription }
  }

  pub fn subscription(&self) -> &SharedSubscription { &self.subscription }
}

impl<O, Item, Err> Observer<Item, Err> for Subscriber<O>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) {
    if self.subscription.is_closed() {
      return;
    }
    if let Some(observer) = self.observer.as_mut() {
      observer.next(value);
    }
  }

  fn error(mut self, err: Err) {
    if !self.subscription.is_closed() {
      if let Some(observer) = self.observer.take() {
        observer.error(err);
      }
    }
    self.subscription.cancel();
  }

  fn complete(mut self) {
    if !self.subscription.is_closed() {
      if let Some(observer) = self.observer.take() {
        observer.complete();
      }
    }
    self.subscription.cancel();
  }

  fn is_closed(&self) -> bool {
    self.subscription.is_closed() || self.observer.as_ref().is_none_or(Observer::is_closed)
  }
}
