use crate::{
  observable::{CoreObservable, Observable, ObservableType},
  observer::Observer,
  rc::MutArc,
  subject::{Subject, SubjectSubscription},
  subscriber::Subscriber,
  subscription::SharedSubscription,
};

/// A source that shares a single upstream execution among its observers.
///
/// Subscribing registers an observer and starts nothing. The first
/// [`connect`](ConnectableObservable::connect) subscribes upstream, after
/// which every event is delivered to the observers registered at that
/// moment, in registration order. Observers registering later only see
/// later events.
///
/// ```
/// use rxcore::prelude::*;
///
/// let source = observable::from_iter(1..=3).publish();
/// let (a, b) = (TestObserver::new(), TestObserver::new());
/// source.clone().subscribe_with(a.clone());
/// source.clone().subscribe_with(b.clone());
/// source.connect();
/// a.assert_values(&[1, 2, 3]);
/// b.assert_values(&[1, 2, 3]);
/// ```
pub struct ConnectableObservable<S, Item, Err> {
  source: MutArc<Option<S>>,
  subject: Subject<Item, Err>,
  connection: SharedSubscription,
}

impl<S, Item, Err> Clone for ConnectableObservable<S, Item, Err> {
  fn clone(&self) -> Self {
    ConnectableObservable {
      source: self.source.clone(),
      subject: self.subject.clone(),
      connection: self.connection.clone(),
    }
  }
}

impl<S, Item, Err> ConnectableObservable<S, Item, Err> {
  pub fn new(source: S) -> Self {
    ConnectableObservable {
      source: MutArc::own(Some(source)),
      subject: Subject::new(),
      connection: SharedSubscription::default(),
    }
  }

  /// The shared hub as a plain source. Subscribing to it is the same as
  /// subscribing to this connectable.
  pub fn fork(&self) -> Subject<Item, Err> { self.subject.clone() }

  pub fn is_connected(&self) -> bool { self.source.rc_deref().is_none() }

  /// Starts the shared execution.
  ///
  /// Only the first call subscribes upstream; every call returns the same
  /// connection handle. Unsubscribing it stops the upstream execution.
  pub fn connect(&self) -> SharedSubscription
  where
    S: CoreObservable<Subscriber<Subject<Item, Err>>> + ObservableType<Item = Item, Err = Err>,
    <S as CoreObservable<Subscriber<Subject<Item, Err>>>>::Unsub: Send + 'static,
    Item: Clone,
    Err: Clone,
  {
    let source = self.source.rc_deref_mut().take();
    if let Some(source) = source {
      tracing::debug!("connectable source connected");
      self.connection.add_teardown(|| tracing::debug!("connectable source disconnected"));
      source.subscribe_within(self.connection.clone(), self.subject.clone());
    }
    self.connection.clone()
  }
}

impl<S, Item, Err> ObservableType for ConnectableObservable<S, Item, Err> {
  type Item = Item;
  type Err = Err;
}

impl<S, Item, Err, O> CoreObservable<O> for ConnectableObservable<S, Item, Err>
where
  Item: 'static,
  Err: Clone + 'static,
  O: Observer<Item, Err> + Send + 'static,
{
  type Unsub = SubjectSubscription<Item, Err>;

  fn actual_subscribe(self, observer: O) -> Self::Unsub { self.subject.actual_subscribe(observer) }
}
