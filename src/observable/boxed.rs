use crate::{
  observable::{CoreObservable, ObservableType},
  observer::{BoxedObserver, Observer},
  subscription::BoxedSubscription,
};

/// Object-safe subscription protocol, implemented for every source that can
/// be subscribed with a boxed observer. Used through [`BoxedObservable`].
pub trait IntoBoxedObservable<Item, Err>: Send + 'static {
  fn box_subscribe(self: Box<Self>, observer: BoxedObserver<'static, Item, Err>)
    -> BoxedSubscription;
}

impl<S, Item, Err> IntoBoxedObservable<Item, Err> for S
where
  S: CoreObservable<BoxedObserver<'static, Item, Err>> + Send + 'static,
  S::Unsub: Send + 'static,
{
  fn box_subscribe(
    self: Box<Self>,
    observer: BoxedObserver<'static, Item, Err>,
  ) -> BoxedSubscription {
    BoxedSubscription::new((*self).actual_subscribe(observer))
  }
}

/// A source with its concrete type erased, so sources built from different
/// operator chains can share one type (for example as `flat_map` inners or
/// in a `Vec` passed to `merge_all`).
///
/// ```
/// use rxcore::prelude::*;
///
/// let sources: Vec<BoxedObservable<i32, Infallible>> = vec![
///   observable::of(1).box_it(),
///   observable::from_iter(2..4).map(|v| v * 10).box_it(),
/// ];
/// assert_eq!(observable::concat_all(sources).blocking_collect(), Ok(vec![1, 20, 30]));
/// ```
pub struct BoxedObservable<Item, Err>(Box<dyn IntoBoxedObservable<Item, Err>>);

impl<Item, Err> BoxedObservable<Item, Err> {
  pub fn new(source: impl IntoBoxedObservable<Item, Err>) -> Self {
    BoxedObservable(Box::new(source))
  }
}

impl<Item, Err> ObservableType for BoxedObservable<Item, Err> {
  type Item = Item;
  type Err = Err;
}

impl<Item, Err, O> CoreObservable<O> for BoxedObservable<Item, Err>
where
  Item: 'static,
  Err: 'static,
  O: Observer<Item, Err> + Send + 'static,
{
  type Unsub = BoxedSubscription;

  fn actual_subscribe(self, observer: O) -> Self::Unsub { self.0.box_subscribe(Box::new(observer)) }
}

#[cfg(test)]
mod tests {
  use crate::prelude::*;

  #[rxcore_macro::test]
  fn mixed_sources_share_a_type() {
    let pick = |even: bool| -> BoxedObservable<i32, String> {
      if even {
        observable::from_iter([0, 2, 4]).with_err().box_it()
      } else {
        observable::throw_err("odd".to_owned()).box_it()
      }
    };
    assert_eq!(pick(true).blocking_collect(), Ok(vec![0, 2, 4]));
    assert_eq!(pick(false).blocking_collect(), Err("odd".to_owned()));
  }

  #[rxcore_macro::test]
  fn boxed_subscription_cancels() {
    let test = TestObserver::new();
    let scheduler = TestScheduler::new();
    let subscription = observable::interval(std::time::Duration::from_millis(1), scheduler.clone())
      .box_it()
      .subscribe_with(test.clone());
    scheduler.advance_by(std::time::Duration::from_millis(3));
    subscription.unsubscribe();
    scheduler.advance_by(std::time::Duration::from_millis(3));
    test.assert_values(&[0, 1, 2]);
  }
}
