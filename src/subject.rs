//! Subject: an observer and a source at once.
//!
//! Events pushed into a [`Subject`] are fanned out to every observer
//! subscribed to it at that moment, in subscription order. It is the engine
//! behind [`ConnectableObservable`](crate::observable::ConnectableObservable).

use std::sync::{
  atomic::{AtomicBool, Ordering},
  Arc,
};

use parking_lot::Mutex;

use crate::{
  observable::{CoreObservable, ObservableType},
  observer::{BoxedObserver, Observer},
  rc::MutArc,
  subscription::Subscription,
};

/// Multicasting hub.
///
/// Clones share the same registry. Delivery works on a snapshot of the
/// registry taken per event, so observers may subscribe or unsubscribe from
/// inside a callback. An observer that subscribes after a terminal event gets
/// that terminal event immediately; values are never replayed.
pub struct Subject<Item, Err>(MutArc<Subscribers<Item, Err>>);

struct Subscribers<Item, Err> {
  observers: Vec<(usize, Arc<Slot<Item, Err>>)>,
  next_id: usize,
  terminal: Option<Terminal<Err>>,
}

#[derive(Clone)]
enum Terminal<Err> {
  Error(Err),
  Complete,
}

struct Slot<Item, Err> {
  closed: AtomicBool,
  observer: Mutex<Option<BoxedObserver<'static, Item, Err>>>,
}

impl<Item, Err> Slot<Item, Err> {
  fn take(&self) -> Option<BoxedObserver<'static, Item, Err>> {
    self.closed.store(true, Ordering::Release);
    self.observer.lock().take()
  }
}

impl<Item, Err> Subject<Item, Err> {
  pub fn new() -> Self {
    Subject(MutArc::own(Subscribers { observers: vec![], next_id: 0, terminal: None }))
  }

  /// Number of observers currently subscribed.
  pub fn observer_count(&self) -> usize { self.0.rc_deref().observers.len() }

  /// `true` once an error or completion went through.
  pub fn is_stopped(&self) -> bool { self.0.rc_deref().terminal.is_some() }

  fn snapshot(&self) -> Vec<(usize, Arc<Slot<Item, Err>>)> {
    let inner = self.0.rc_deref();
    inner.observers.iter().map(|(id, slot)| (*id, slot.clone())).collect()
  }

  /// Unregisters observers that reported closed during delivery.
  fn prune(&self, finished: &[usize]) {
    if finished.is_empty() {
      return;
    }
    self.0.rc_deref_mut().observers.retain(|(id, _)| !finished.contains(id));
  }

  fn stop(&self, terminal: Terminal<Err>) -> Vec<(usize, Arc<Slot<Item, Err>>)> {
    let mut inner = self.0.rc_deref_mut();
    if inner.terminal.is_some() {
      return vec![];
    }
    inner.terminal = Some(terminal);
    inner.observers.drain(..).collect()
  }
}

impl<Item, Err> Default for Subject<Item, Err> {
  fn default() -> Self { Self::new() }
}

impl<Item, Err> Clone for Subject<Item, Err> {
  fn clone(&self) -> Self { Subject(self.0.clone()) }
}

impl<Item: Clone, Err: Clone> Observer<Item, Err> for Subject<Item, Err> {
  fn next(&mut self, value: Item) {
    let slots = self.snapshot();
    let mut finished = vec![];
    let mut iter = slots.iter().filter(|(_, slot)| !slot.closed.load(Ordering::Acquire)).peekable();
    while let Some((id, slot)) = iter.next() {
      let mut guard = slot.observer.lock();
      let Some(observer) = guard.as_mut() else { continue };
      if observer.is_closed() {
        guard.take();
        finished.push(*id);
        continue;
      }
      if iter.peek().is_none() {
        observer.next(value);
        if observer.is_closed() {
          guard.take();
          finished.push(*id);
        }
        break;
      }
      observer.next(value.clone());
      if observer.is_closed() {
        guard.take();
        finished.push(*id);
      }
    }
    self.prune(&finished);
  }

  fn error(self, err: Err) {
    let slots = self.stop(Terminal::Error(err.clone()));
    for observer in slots.iter().filter_map(|(_, slot)| slot.take()) {
      observer.error(err.clone());
    }
  }

  fn complete(self) {
    let slots = self.stop(Terminal::Complete);
    for observer in slots.iter().filter_map(|(_, slot)| slot.take()) {
      observer.complete();
    }
  }

  fn is_closed(&self) -> bool { self.is_stopped() }
}

impl<Item, Err> ObservableType for Subject<Item, Err> {
  type Item = Item;
  type Err = Err;
}

impl<Item, Err, O> CoreObservable<O> for Subject<Item, Err>
where
  Item: 'static,
  Err: Clone + 'static,
  O: Observer<Item, Err> + Send + 'static,
{
  type Unsub = SubjectSubscription<Item, Err>;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let mut inner = self.0.rc_deref_mut();
    if let Some(terminal) = inner.terminal.clone() {
      drop(inner);
      match terminal {
        Terminal::Error(err) => observer.error(err),
        Terminal::Complete => observer.complete(),
      }
      return SubjectSubscription { subject: self, id: None };
    }
    let id = inner.next_id;
    inner.next_id += 1;
    let slot = Slot { closed: AtomicBool::new(false), observer: Mutex::new(Some(Box::new(observer))) };
    inner.observers.push((id, Arc::new(slot)));
    drop(inner);
    SubjectSubscription { subject: self, id: Some(id) }
  }
}

/// Removal token of one observer of a [`Subject`].
pub struct SubjectSubscription<Item, Err> {
  subject: Subject<Item, Err>,
  id: Option<usize>,
}

impl<Item, Err> Subscription for SubjectSubscription<Item, Err> {
  fn unsubscribe(self) {
    let Some(id) = self.id else { return };
    let mut inner = self.subject.0.rc_deref_mut();
    if let Some(pos) = inner.observers.iter().position(|(i, _)| *i == id) {
      let (_, slot) = inner.observers.remove(pos);
      // the slot may be mid-delivery on another thread; only flag it here
      slot.closed.store(true, Ordering::Release);
    }
  }

  fn is_closed(&self) -> bool {
    let Some(id) = self.id else { return true };
    !self.subject.0.rc_deref().observers.iter().any(|(i, _)| *i == id)
  }
}
