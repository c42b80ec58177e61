use crate::{
  observable::{CoreObservable, ObservableType},
  observer::Observer,
  scheduler::Scheduler,
  subscription::{SharedSubscription, Subscription},
};

/// Subscribes to the source from a task on `scheduler`, so any synchronous
/// work the source does at subscription time runs there instead of on the
/// subscribing thread.
#[derive(Clone)]
pub struct SubscribeOn<S, SD> {
  pub source: S,
  pub scheduler: SD,
}

impl<S: ObservableType, SD> ObservableType for SubscribeOn<S, SD> {
  type Item = S::Item;
  type Err = S::Err;
}

impl<S, SD, O> CoreObservable<O> for SubscribeOn<S, SD>
where
  S: CoreObservable<O> + Send + 'static,
  S::Unsub: Send + 'static,
  SD: Scheduler,
  O: Observer<S::Item, S::Err> + Send + 'static,
{
  type Unsub = SharedSubscription;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let subscription = SharedSubscription::default();
    let c_subscription = subscription.clone();
    let source = self.source;
    let handle = self.scheduler.schedule_now(move || {
      if !c_subscription.is_closed() {
        c_subscription.add(source.actual_subscribe(observer));
      }
    });
    subscription.add(handle);
    subscription
  }
}
