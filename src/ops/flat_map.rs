use std::collections::VecDeque;

use crate::{
  observable::{CoreObservable, ObservableType},
  observer::Observer,
  rc::MutArc,
  subscription::{BoxedSubscription, SharedSubscription, Subscription},
};

/// Maps every value to an inner source and merges the inner sources.
///
/// `concurrent` caps how many inner sources are subscribed at a time; the
/// others wait in a queue that has no bound and start in arrival order as
/// running ones complete. Each inner source runs under its own subscription,
/// cancelled once that inner source completes.
#[derive(Clone)]
pub struct FlatMap<S, F> {
  pub source: S,
  pub func: F,
  pub concurrent: usize,
}

type Thunk<O> = Box<dyn FnOnce(InnerObserver<O>) -> BoxedSubscription + Send>;

struct FlatState<O> {
  observer: Option<O>,
  active: usize,
  outer_done: bool,
  queue: VecDeque<Thunk<O>>,
}

struct FlatShared<O> {
  state: MutArc<FlatState<O>>,
  subscription: SharedSubscription,
  concurrent: usize,
}

impl<O> Clone for FlatShared<O> {
  fn clone(&self) -> Self {
    FlatShared {
      state: self.state.clone(),
      subscription: self.subscription.clone(),
      concurrent: self.concurrent,
    }
  }
}

impl<O> FlatShared<O> {
  fn start(&self, subscribe: Thunk<O>) {
    if self.subscription.is_closed() {
      return;
    }
    let inner = SharedSubscription::default();
    self.subscription.add(inner.clone());
    let unsub = subscribe(InnerObserver { shared: self.clone(), subscription: inner.clone() });
    inner.add(unsub);
  }

  fn submit(&self, subscribe: Thunk<O>) {
    {
      let mut state = self.state.rc_deref_mut();
      if state.observer.is_none() {
        return;
      }
      if state.active >= self.concurrent {
        state.queue.push_back(subscribe);
        return;
      }
      state.active += 1;
    }
    self.start(subscribe);
  }

  /// Takes the observer out if nothing is left to wait for.
  fn take_if_done(state: &mut FlatState<O>) -> Option<O> {
    if state.outer_done && state.active == 0 && state.queue.is_empty() {
      state.observer.take()
    } else {
      None
    }
  }

  fn inner_complete<Item, Err>(&self, inner: SharedSubscription)
  where
    O: Observer<Item, Err>,
  {
    inner.cancel();
    self.subscription.remove_closed();
    let (next, finished) = {
      let mut state = self.state.rc_deref_mut();
      match state.queue.pop_front() {
        Some(next) => (Some(next), None),
        None => {
          state.active = state.active.saturating_sub(1);
          (None, Self::take_if_done(&mut state))
        }
      }
    };
    if let Some(next) = next {
      self.start(next);
    }
    if let Some(observer) = finished {
      observer.complete();
    }
  }

  fn outer_complete<Item, Err>(&self)
  where
    O: Observer<Item, Err>,
  {
    let finished = {
      let mut state = self.state.rc_deref_mut();
      state.outer_done = true;
      Self::take_if_done(&mut state)
    };
    if let Some(observer) = finished {
      observer.complete();
    }
  }

  fn error<Item, Err>(&self, err: Err)
  where
    O: Observer<Item, Err>,
  {
    let observer = {
      let mut state = self.state.rc_deref_mut();
      state.queue.clear();
      state.observer.take()
    };
    if let Some(observer) = observer {
      self.subscription.cancel();
      observer.error(err);
    }
  }

  fn closed<Item, Err>(&self) -> bool
  where
    O: Observer<Item, Err>,
  {
    self.subscription.is_closed()
      || self.state.rc_deref().observer.as_ref().is_none_or(Observer::<Item, Err>::is_closed)
  }
}

/// Observer subscribed to the outer source.
pub struct OuterObserver<O, F> {
  shared: FlatShared<O>,
  func: F,
}

/// Observer subscribed to every inner source.
pub struct InnerObserver<O> {
  shared: FlatShared<O>,
  subscription: SharedSubscription,
}

impl<O, Item, Err> Observer<Item, Err> for InnerObserver<O>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) {
    if self.subscription.is_closed() {
      return;
    }
    if let Some(observer) = self.shared.state.rc_deref_mut().observer.as_mut() {
      observer.next(value);
    }
  }

  fn error(self, err: Err) { self.shared.error::<Item, Err>(err) }

  fn complete(self) { self.shared.inner_complete::<Item, Err>(self.subscription) }

  fn is_closed(&self) -> bool { self.subscription.is_closed() || self.shared.closed::<Item, Err>() }
}

impl<O, F, Outer, Inner, Item, Err> Observer<Outer, Err> for OuterObserver<O, F>
where
  O: Observer<Item, Err> + 'static,
  F: FnMut(Outer) -> Inner,
  Inner: CoreObservable<InnerObserver<O>> + ObservableType<Item = Item, Err = Err> + Send + 'static,
  Inner::Unsub: Send + 'static,
{
  fn next(&mut self, value: Outer) {
    if self.shared.closed::<Item, Err>() {
      return;
    }
    let inner = (self.func)(value);
    self.shared.submit(Box::new(move |observer| BoxedSubscription::new(inner.actual_subscribe(observer))));
  }

  fn error(self, err: Err) { self.shared.error::<Item, Err>(err) }

  fn complete(self) { self.shared.outer_complete::<Item, Err>() }

  fn is_closed(&self) -> bool { self.shared.closed::<Item, Err>() }
}

impl<S, F, Inner> ObservableType for FlatMap<S, F>
where
  S: ObservableType,
  F: FnMut(S::Item) -> Inner,
  Inner: ObservableType<Err = S::Err>,
{
  type Item = Inner::Item;
  type Err = S::Err;
}

impl<S, F, O, Outer, Inner, Item, Err> CoreObservable<O> for FlatMap<S, F>
where
  S: CoreObservable<OuterObserver<O, F>> + ObservableType<Item = Outer, Err = Err>,
  S::Unsub: Send + 'static,
  F: FnMut(Outer) -> Inner,
  Inner: CoreObservable<InnerObserver<O>> + ObservableType<Item = Item, Err = Err> + Send + 'static,
  Inner::Unsub: Send + 'static,
  O: Observer<Item, Err> + 'static,
{
  type Unsub = SharedSubscription;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let shared = FlatShared {
      state: MutArc::own(FlatState {
        observer: Some(observer),
        active: 0,
        outer_done: false,
        queue: VecDeque::new(),
      }),
      subscription: SharedSubscription::default(),
      concurrent: self.concurrent,
    };
    let subscription = shared.subscription.clone();
    let outer = OuterObserver { shared, func: self.func };
    subscription.add(self.source.actual_subscribe(outer));
    subscription
  }
}
