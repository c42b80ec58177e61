use std::collections::VecDeque;

use crate::{
  observable::{CoreObservable, ObservableType},
  observer::Observer,
  rc::MutArc,
  scheduler::Scheduler,
  subscription::{SharedSubscription, Subscription},
};

/// Re-delivers every event from a task on `scheduler`.
///
/// Events are queued in arrival order and drained by at most one task at a
/// time, so the downstream sees them in the same order and never
/// concurrently, whatever the scheduler's parallelism.
#[derive(Clone)]
pub struct ObserveOn<S, SD> {
  pub source: S,
  pub scheduler: SD,
}

enum Notification<Item, Err> {
  Next(Item),
  Error(Err),
  Complete,
}

struct Pending<Item, Err> {
  queue: VecDeque<Notification<Item, Err>>,
  draining: bool,
}

pub struct ObserveOnObserver<O, SD, Item, Err> {
  observer: MutArc<Option<O>>,
  pending: MutArc<Pending<Item, Err>>,
  scheduler: SD,
  subscription: SharedSubscription,
}

impl<O, SD, Item, Err> ObserveOnObserver<O, SD, Item, Err>
where
  O: Observer<Item, Err> + Send + 'static,
  SD: Scheduler,
  Item: Send + 'static,
  Err: Send + 'static,
{
  fn push(&self, notification: Notification<Item, Err>) {
    if self.subscription.is_closed() {
      return;
    }
    {
      let mut pending = self.pending.rc_deref_mut();
      pending.queue.push_back(notification);
      if pending.draining {
        return;
      }
      pending.draining = true;
    }
    let observer = self.observer.clone();
    let pending = self.pending.clone();
    let handle = self.scheduler.schedule_now(move || drain(&observer, &pending));
    self.subscription.add(handle);
  }
}

fn drain<O, Item, Err>(observer: &MutArc<Option<O>>, pending: &MutArc<Pending<Item, Err>>)
where
  O: Observer<Item, Err>,
{
  loop {
    let notification = {
      let mut pending = pending.rc_deref_mut();
      match pending.queue.pop_front() {
        Some(notification) => notification,
        None => {
          pending.draining = false;
          return;
        }
      }
    };
    match notification {
      Notification::Next(value) => {
        if let Some(observer) = observer.rc_deref_mut().as_mut() {
          observer.next(value);
        }
      }
      Notification::Error(err) => {
        let observer = observer.rc_deref_mut().take();
        if let Some(observer) = observer {
          observer.error(err);
        }
      }
      Notification::Complete => {
        let observer = observer.rc_deref_mut().take();
        if let Some(observer) = observer {
          observer.complete();
        }
      }
    }
  }
}

impl<O, SD, Item, Err> Observer<Item, Err> for ObserveOnObserver<O, SD, Item, Err>
where
  O: Observer<Item, Err> + Send + 'static,
  SD: Scheduler,
  Item: Send + 'static,
  Err: Send + 'static,
{
  fn next(&mut self, value: Item) { self.push(Notification::Next(value)) }

  fn error(self, err: Err) { self.push(Notification::Error(err)) }

  fn complete(self) { self.push(Notification::Complete) }

  fn is_closed(&self) -> bool {
    self.subscription.is_closed()
      || self.observer.rc_deref().as_ref().is_none_or(Observer::<Item, Err>::is_closed)
  }
}

impl<S: ObservableType, SD> ObservableType for ObserveOn<S, SD> {
  type Item = S::Item;
  type Err = S::Err;
}

impl<S, SD, O, Item, Err> CoreObservable<O> for ObserveOn<S, SD>
where
  S: CoreObservable<ObserveOnObserver<O, SD, Item, Err>> + ObservableType<Item = Item, Err = Err>,
  S::Unsub: Send + 'static,
  SD: Scheduler,
  O: Observer<Item, Err> + Send + 'static,
  Item: Send + 'static,
  Err: Send + 'static,
{
  type Unsub = SharedSubscription;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let subscription = SharedSubscription::default();
    let pending = MutArc::own(Pending { queue: VecDeque::new(), draining: false });
    let c_pending = pending.clone();
    subscription.add_teardown(move || c_pending.rc_deref_mut().queue.clear());
    let observe_on = ObserveOnObserver {
      observer: MutArc::own(Some(observer)),
      pending,
      scheduler: self.scheduler,
      subscription: subscription.clone(),
    };
    subscription.add(self.source.actual_subscribe(observe_on));
    subscription
  }
}
