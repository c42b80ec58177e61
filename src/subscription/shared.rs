use std::{
  fmt::{Debug, Formatter},
  sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
  },
};

use parking_lot::Mutex;
use smallvec::SmallVec;

use super::{BoxedSubscription, ClosureSubscription, Subscription};

/// The cancellation token shared by a consumer and every upstream execution
/// it started.
///
/// It is an atomic closed flag plus a list of teardowns. The first
/// `unsubscribe` flips the flag and runs every teardown exactly once;
/// further calls do nothing. Teardowns run after the internal lock is
/// released, so a teardown may itself cancel (or add to) this subscription.
/// Anything added after closing is cancelled on the spot.
#[derive(Clone, Default)]
pub struct SharedSubscription(Arc<Inner>);

#[derive(Default)]
struct Inner {
  closed: AtomicBool,
  teardown: Mutex<SmallVec<[BoxedSubscription; 1]>>,
}

impl SharedSubscription {
  pub fn new() -> Self { Self::default() }

  /// Ties `subscription` to this one: it is cancelled when this one is.
  pub fn add<S: Subscription + Send + 'static>(&self, subscription: S) {
    if subscription.is_closed() || self.is_same(&subscription) {
      return;
    }
    let mut teardown = self.0.teardown.lock();
    if self.0.closed.load(Ordering::Acquire) {
      drop(teardown);
      subscription.unsubscribe();
    } else {
      teardown.retain(|v| !v.is_closed());
      teardown.push(BoxedSubscription::new(subscription));
    }
  }

  /// Drops the entries that are already closed.
  pub fn remove_closed(&self) { self.0.teardown.lock().retain(|v| !v.is_closed()); }

  /// Registers a closure to run on cancellation.
  pub fn add_teardown(&self, f: impl FnOnce() + Send + 'static) { self.add(ClosureSubscription(f)) }

  /// Cancels through a shared reference; same semantics as `unsubscribe`.
  pub fn cancel(&self) {
    if self.0.closed.swap(true, Ordering::AcqRel) {
      return;
    }
    let teardown = std::mem::take(&mut *self.0.teardown.lock());
    tracing::trace!(teardowns = teardown.len(), "subscription cancelled");
    for v in teardown {
      v.unsubscribe();
    }
  }

  fn is_same<S: 'static>(&self, other: &S) -> bool {
    (other as &dyn std::any::Any)
      .downcast_ref::<Self>()
      .is_some_and(|other| Arc::ptr_eq(&self.0, &other.0))
  }

  #[cfg(test)]
  pub(crate) fn teardown_size(&self) -> usize { self.0.teardown.lock().len() }
}

impl Subscription for SharedSubscription {
  #[inline]
  fn unsubscribe(self) { self.cancel() }

  #[inline]
  fn is_closed(&self) -> bool { self.0.closed.load(Ordering::Acquire) }
}

impl Debug for SharedSubscription {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("SharedSubscription")
      .field("closed", &self.is_closed())
      .field("teardown_count", &self.0.teardown.lock().len())
      .finish()
  }
}
