use std::collections::VecDeque;

use crate::{
  observable::{CoreObservable, ObservableType},
  observer::Observer,
  rc::MutArc,
  subscription::{SharedSubscription, Subscription},
};

/// Pairs values of two sources in arrival order and emits
/// `combiner(a, b)` for each pair.
///
/// Unpaired values wait in a per-source queue that has no bound. The zip
/// completes as soon as one side completed with an empty queue, since no
/// further pair can form; the other side is cancelled then.
#[derive(Clone)]
pub struct ZipWith<A, B, F> {
  pub source_a: A,
  pub source_b: B,
  pub combiner: F,
}

struct ZipState<O, A, B, F> {
  observer: Option<O>,
  buffer_a: VecDeque<A>,
  buffer_b: VecDeque<B>,
  completed_a: bool,
  completed_b: bool,
  combiner: F,
}

impl<O, A, B, F> ZipState<O, A, B, F> {
  fn exhausted(&self) -> bool {
    (self.completed_a && self.buffer_a.is_empty()) || (self.completed_b && self.buffer_b.is_empty())
  }
}

struct ZipShared<O, A, B, F> {
  state: MutArc<ZipState<O, A, B, F>>,
  subscription: SharedSubscription,
}

impl<O, A, B, F> Clone for ZipShared<O, A, B, F> {
  fn clone(&self) -> Self {
    ZipShared { state: self.state.clone(), subscription: self.subscription.clone() }
  }
}

impl<O, A, B, F> ZipShared<O, A, B, F> {
  /// Buffers or pairs one value; `push` does the side-specific part and
  /// returns a pair once both sides have one.
  fn on_next<Out, Err>(&self, push: impl FnOnce(&mut ZipState<O, A, B, F>) -> Option<(A, B)>)
  where
    O: Observer<Out, Err>,
    F: FnMut(A, B) -> Out,
  {
    let finished = {
      let mut state = self.state.rc_deref_mut();
      if state.observer.is_none() {
        return;
      }
      if let Some((a, b)) = push(&mut state) {
        let out = (state.combiner)(a, b);
        if let Some(observer) = state.observer.as_mut() {
          observer.next(out);
        }
      }
      if state.exhausted() { state.observer.take() } else { None }
    };
    self.finish::<Out, Err>(finished);
  }

  fn on_complete<Out, Err>(&self, mark: impl FnOnce(&mut ZipState<O, A, B, F>))
  where
    O: Observer<Out, Err>,
  {
    let finished = {
      let mut state = self.state.rc_deref_mut();
      mark(&mut state);
      if state.exhausted() { state.observer.take() } else { None }
    };
    self.finish::<Out, Err>(finished);
  }

  fn finish<Out, Err>(&self, observer: Option<O>)
  where
    O: Observer<Out, Err>,
  {
    if let Some(observer) = observer {
      self.subscription.cancel();
      observer.complete();
    }
  }

  fn on_error<Out, Err>(&self, err: Err)
  where
    O: Observer<Out, Err>,
  {
    let observer = self.state.rc_deref_mut().observer.take();
    if let Some(observer) = observer {
      self.subscription.cancel();
      observer.error(err);
    }
  }

  fn closed<Out, Err>(&self) -> bool
  where
    O: Observer<Out, Err>,
  {
    self.subscription.is_closed()
      || self.state.rc_deref().observer.as_ref().is_none_or(Observer::<Out, Err>::is_closed)
  }
}

/// Observer subscribed to the first source of a zip.
pub struct ZipObserverA<O, A, B, F>(ZipShared<O, A, B, F>);

/// Observer subscribed to the second source of a zip.
pub struct ZipObserverB<O, A, B, F>(ZipShared<O, A, B, F>);

impl<O, A, B, F, Out, Err> Observer<A, Err> for ZipObserverA<O, A, B, F>
where
  O: Observer<Out, Err>,
  F: FnMut(A, B) -> Out,
{
  fn next(&mut self, value: A) {
    self.0.on_next::<Out, Err>(|state| match state.buffer_b.pop_front() {
      Some(b) => Some((value, b)),
      None => {
        state.buffer_a.push_back(value);
        None
      }
    })
  }

  fn error(self, err: Err) { self.0.on_error::<Out, Err>(err) }

  fn complete(self) { self.0.on_complete::<Out, Err>(|state| state.completed_a = true) }

  fn is_closed(&self) -> bool { self.0.closed::<Out, Err>() }
}

impl<O, A, B, F, Out, Err> Observer<B, Err> for ZipObserverB<O, A, B, F>
where
  O: Observer<Out, Err>,
  F: FnMut(A, B) -> Out,
{
  fn next(&mut self, value: B) {
    self.0.on_next::<Out, Err>(|state| match state.buffer_a.pop_front() {
      Some(a) => Some((a, value)),
      None => {
        state.buffer_b.push_back(value);
        None
      }
    })
  }

  fn error(self, err: Err) { self.0.on_error::<Out, Err>(err) }

  fn complete(self) { self.0.on_complete::<Out, Err>(|state| state.completed_b = true) }

  fn is_closed(&self) -> bool { self.0.closed::<Out, Err>() }
}

impl<SA, SB, F, Out> ObservableType for ZipWith<SA, SB, F>
where
  SA: ObservableType,
  SB: ObservableType,
  F: FnMut(SA::Item, SB::Item) -> Out,
{
  type Item = Out;
  type Err = SA::Err;
}

impl<SA, SB, F, O, A, B, Out, Err> CoreObservable<O> for ZipWith<SA, SB, F>
where
  SA: CoreObservable<ZipObserverA<O, A, B, F>> + ObservableType<Item = A, Err = Err>,
  SB: CoreObservable<ZipObserverB<O, A, B, F>> + ObservableType<Item = B, Err = Err>,
  SA::Unsub: Send + 'static,
  SB::Unsub: Send + 'static,
  F: FnMut(A, B) -> Out,
  O: Observer<Out, Err>,
{
  type Unsub = SharedSubscription;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let shared = ZipShared {
      state: MutArc::own(ZipState {
        observer: Some(observer),
        buffer_a: VecDeque::new(),
        buffer_b: VecDeque::new(),
        completed_a: false,
        completed_b: false,
        combiner: self.combiner,
      }),
      subscription: SharedSubscription::default(),
    };
    let subscription = shared.subscription.clone();
    subscription.add(self.source_a.actual_subscribe(ZipObserverA(shared.clone())));
    if !subscription.is_closed() {
      subscription.add(self.source_b.actual_subscribe(ZipObserverB(shared)));
    }
    subscription
  }
}

#[cfg(test)]
mod test {
  use std::time::Duration;

  use crate::prelude::*;

  #[rxcore_macro::test]
  fn zip_with_sum() {
    let test = TestObserver::new();
    observable::from_iter([1, 2, 3])
      .zip_with(observable::from_iter([10, 20]), |a, b| a + b)
      .subscribe_with(test.clone());
    test.assert_values(&[11, 22]);
    assert_eq!(test.completions(), 1);
  }

  #[rxcore_macro::test]
  fn shorter_first_source() {
    let values = observable::from_iter(["a"]).zip(observable::from_iter(0..)).blocking_collect();
    assert_eq!(values, Ok(vec![("a", 0)]));
  }

  #[rxcore_macro::test]
  fn slow_side_paces_pairs() {
    let scheduler = TestScheduler::new();
    let test = TestObserver::new();
    observable::interval(Duration::from_millis(10), scheduler.clone())
      .zip(observable::from_iter(['x', 'y', 'z']))
      .subscribe_with(test.clone());
    scheduler.advance_by(Duration::from_millis(20));
    test.assert_values(&[(0, 'x'), (1, 'y')]);
    test.assert_not_completed();
    scheduler.advance_by(Duration::from_millis(10));
    test.assert_values(&[(0, 'x'), (1, 'y'), (2, 'z')]);
    test.assert_completed();
    assert_eq!(scheduler.pending(), 0);
  }

  #[rxcore_macro::test]
  fn error_from_either_side() {
    let test = TestObserver::new();
    observable::from_iter([1, 2])
      .with_err()
      .zip(observable::throw_err::<i32, _>("broken"))
      .subscribe_with(test.clone());
    test.assert_value_count(0);
    assert_eq!(test.errors(), vec!["broken"]);
    test.assert_not_completed();
  }
}
