use super::Subscription;

/// Object-safe form of [`Subscription`]; `unsubscribe(self)` cannot be
/// called on an unsized value, so the box is consumed instead.
pub trait BoxedSubscriptionInner {
  fn boxed_unsubscribe(self: Box<Self>);
  fn boxed_is_closed(&self) -> bool;
}

impl<T: Subscription> BoxedSubscriptionInner for T {
  #[inline]
  fn boxed_unsubscribe(self: Box<Self>) { (*self).unsubscribe() }

  #[inline]
  fn boxed_is_closed(&self) -> bool { self.is_closed() }
}

/// A type-erased subscription that can move across threads.
///
/// Subscriptions are control handles, not data views, so the box is
/// `'static`: it can be stored in operator state and cancelled at any later
/// time from any thread.
pub struct BoxedSubscription(Box<dyn BoxedSubscriptionInner + Send>);

impl BoxedSubscription {
  pub fn new(subscription: impl Subscription + Send + 'static) -> Self {
    BoxedSubscription(Box::new(subscription))
  }
}

impl Subscription for BoxedSubscription {
  #[inline]
  fn unsubscribe(self) { self.0.boxed_unsubscribe() }

  #[inline]
  fn is_closed(&self) -> bool { self.0.boxed_is_closed() }
}
