//! Cancellation handles.
//!
//! A subscription is the cancellation handle of one running execution of a
//! source. Cancelling is idempotent and monotonic.

mod boxed;
mod shared;

pub use boxed::*;
pub use shared::*;

/// Handle returned by subscribing, used to cancel the execution early.
pub trait Subscription {
  /// Stop the execution and release its resources. Calling it on an
  /// already closed subscription does nothing.
  fn unsubscribe(self);

  fn is_closed(&self) -> bool;

  /// Ties cancellation to a scope: the returned guard unsubscribes when
  /// dropped. Bind it to a named variable; `let _ = ...` drops it at once.
  fn unsubscribe_when_dropped(self) -> SubscriptionGuard<Self>
  where
    Self: Sized,
  {
    SubscriptionGuard::new(self)
  }
}

/// A finished, synchronous execution has nothing left to cancel.
impl Subscription for () {
  #[inline]
  fn unsubscribe(self) {}

  #[inline]
  fn is_closed(&self) -> bool { true }
}

impl<T: Subscription> Subscription for Option<T> {
  fn unsubscribe(self) {
    if let Some(inner) = self {
      inner.unsubscribe()
    }
  }

  fn is_closed(&self) -> bool { self.as_ref().is_none_or(Subscription::is_closed) }
}

/// Runs a closure once when unsubscribed.
pub struct ClosureSubscription<F>(pub F);

impl<F: FnOnce()> Subscription for ClosureSubscription<F> {
  #[inline]
  fn unsubscribe(self) { (self.0)() }

  #[inline]
  fn is_closed(&self) -> bool { false }
}

/// Unsubscribes the wrapped subscription on drop.
#[must_use]
pub struct SubscriptionGuard<T: Subscription>(Option<T>);

impl<T: Subscription> SubscriptionGuard<T> {
  pub fn new(subscription: T) -> SubscriptionGuard<T> { SubscriptionGuard(Some(subscription)) }

  /// Gives the subscription back without cancelling it.
  pub fn into_inner(mut self) -> Option<T> { self.0.take() }
}

impl<T: Subscription> Drop for SubscriptionGuard<T> {
  #[inline]
  fn drop(&mut self) {
    if let Some(subscription) = self.0.take() {
      subscription.unsubscribe()
    }
  }
}

#[cfg(test)]
mod tests {
  use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
  };

  use super::*;

  #[rxcore_macro::test]
  fn guard_unsubscribes_on_drop() {
    let hits = Arc::new(AtomicUsize::new(0));
    let c_hits = hits.clone();
    {
      let _guard = ClosureSubscription(move || {
        c_hits.fetch_add(1, Ordering::SeqCst);
      })
      .unsubscribe_when_dropped();
      assert_eq!(hits.load(Ordering::SeqCst), 0);
    }
    assert_eq!(hits.load(Ordering::SeqCst), 1);
  }

  #[rxcore_macro::test]
  fn guard_into_inner_keeps_subscription() {
    let subscription = SharedSubscription::default();
    let guard = subscription.clone().unsubscribe_when_dropped();
    let inner = guard.into_inner();
    assert!(!subscription.is_closed());
    inner.unsubscribe();
    assert!(subscription.is_closed());
  }
}
