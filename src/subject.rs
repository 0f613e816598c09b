//! A multicast hub: an observable that is also an observer.
//!
//! A [`Subject`] broadcasts each value it receives to every currently
//! registered subscriber, in subscription order, against a snapshot taken at
//! emission time. Terminal notifications stop the subject; emitting through
//! a stopped or unsubscribed subject fails with [`ClosedError`].

use std::{fmt::Debug, rc::Rc};

use smallvec::SmallVec;

use crate::{
  config::Config,
  error::ClosedError,
  observable::{Observable, SourceLink},
  observer::{Observer, ObserverFns},
  rc::MutRc,
  subscriber::Subscriber,
  subscription::{Subscription, Teardown},
};

enum Terminal<Err> {
  Error(Err),
  Complete,
}

struct State<Item, Err> {
  next_id: usize,
  observers: SmallVec<[(usize, Subscriber<Item, Err>); 2]>,
  terminal: Option<Terminal<Err>>,
  closed: bool,
}

impl<Item, Err> Default for State<Item, Err> {
  fn default() -> Self {
    State { next_id: 0, observers: SmallVec::new(), terminal: None, closed: false }
  }
}

/// A multicast observable that is simultaneously an observer.
///
/// Cloning yields another handle to the same hub, so one clone can sit on
/// the producing side while others are handed out for subscription.
///
/// ```rust
/// use std::{cell::RefCell, rc::Rc};
///
/// use rxlite::prelude::*;
///
/// let subject: Subject<i32, &str> = Subject::new();
/// let seen = Rc::new(RefCell::new(Vec::new()));
/// let c = seen.clone();
///
/// subject.subscribe(move |v| c.borrow_mut().push(v));
/// subject.next(1).unwrap();
/// subject.next(2).unwrap();
/// assert_eq!(*seen.borrow(), vec![1, 2]);
/// ```
pub struct Subject<Item, Err> {
  state: MutRc<State<Item, Err>>,
}

impl<Item, Err> Clone for Subject<Item, Err> {
  fn clone(&self) -> Self { Self { state: self.state.clone() } }
}

impl<Item, Err> Default for Subject<Item, Err> {
  fn default() -> Self { Self { state: MutRc::own(State::default()) } }
}

impl<Item, Err> Subject<Item, Err> {
  pub fn new() -> Self { Self::default() }

  /// Number of currently registered subscribers.
  pub fn observer_count(&self) -> usize { self.state.rc_deref().observers.len() }

  pub fn is_empty(&self) -> bool { self.state.rc_deref().observers.is_empty() }

  /// Whether a terminal notification has been emitted.
  pub fn is_stopped(&self) -> bool { self.state.rc_deref().terminal.is_some() }

  /// Whether the subject itself has been unsubscribed.
  pub fn is_closed(&self) -> bool { self.state.rc_deref().closed }

  pub fn has_error(&self) -> bool {
    matches!(self.state.rc_deref().terminal, Some(Terminal::Error(_)))
  }

  /// Drop every registered observer and refuse all further traffic.
  pub fn unsubscribe(&self) {
    let mut state = self.state.rc_deref_mut();
    state.closed = true;
    state.observers.clear();
  }

  fn guard_open(state: &State<Item, Err>) -> Result<(), ClosedError> {
    if state.closed || state.terminal.is_some() { Err(ClosedError) } else { Ok(()) }
  }
}

impl<Item: Clone + 'static, Err: Clone + Debug + 'static> Subject<Item, Err> {
  /// Broadcast a value to a snapshot of the current observers, in
  /// subscription order. Observers registered or removed during the
  /// broadcast do not affect the in-flight delivery.
  pub fn next(&self, value: Item) -> Result<(), ClosedError> {
    let snapshot: Vec<Subscriber<Item, Err>> = {
      let state = self.state.rc_deref();
      Self::guard_open(&state)?;
      state.observers.iter().map(|(_, s)| s.clone()).collect()
    };
    for mut subscriber in snapshot {
      subscriber.next(value.clone());
    }
    Ok(())
  }

  /// Terminate with an error: every current observer receives it, late
  /// subscribers get it replayed, and the registry empties.
  pub fn error(&self, err: Err) -> Result<(), ClosedError> {
    let drained: SmallVec<[(usize, Subscriber<Item, Err>); 2]> = {
      let mut state = self.state.rc_deref_mut();
      Self::guard_open(&state)?;
      state.terminal = Some(Terminal::Error(err.clone()));
      std::mem::take(&mut state.observers)
    };
    for (_, mut subscriber) in drained {
      subscriber.error(err.clone());
    }
    Ok(())
  }

  /// Terminate normally: every current observer completes, late subscribers
  /// complete immediately, and the registry empties.
  pub fn complete(&self) -> Result<(), ClosedError> {
    let drained: SmallVec<[(usize, Subscriber<Item, Err>); 2]> = {
      let mut state = self.state.rc_deref_mut();
      Self::guard_open(&state)?;
      state.terminal = Some(Terminal::Complete);
      std::mem::take(&mut state.observers)
    };
    for (_, mut subscriber) in drained {
      subscriber.complete();
    }
    Ok(())
  }

  /// The stored terminal error, if the subject errored.
  pub fn thrown_error(&self) -> Option<Err> {
    match &self.state.rc_deref().terminal {
      Some(Terminal::Error(err)) => Some(err.clone()),
      _ => None,
    }
  }

  /// Subscribe with a next callback only.
  pub fn subscribe(&self, next: impl FnMut(Item) + 'static) -> Subscription {
    self.subscribe_with(ObserverFns::new().on_next(next))
  }

  /// Subscribe with a possibly-partial observer record.
  pub fn subscribe_with(&self, fns: ObserverFns<Item, Err>) -> Subscription {
    self.subscribe_with_config(fns, Config::default())
  }

  pub fn subscribe_with_config(&self, fns: ObserverFns<Item, Err>, config: Config) -> Subscription {
    let subscriber = Subscriber::new(fns, config);
    let handle = subscriber.subscription();
    self.register(subscriber);
    handle
  }

  /// Hide the subject behind a plain [`Observable`], so it composes with
  /// `lift`/`pipe` like any other source.
  pub fn as_observable(&self) -> Observable<Item, Err> {
    Observable::chained(Rc::new(self.clone()))
  }

  /// Registration shared by every subscribe path.
  ///
  /// A subscriber arriving after termination immediately receives the
  /// stored terminal notification. A subscriber arriving after
  /// `unsubscribe` receives nothing and its handle closes on the spot.
  fn register(&self, mut subscriber: Subscriber<Item, Err>) {
    enum Entry<Err> {
      Live,
      Finished(Terminal<Err>),
      Dead,
    }

    let entry = {
      let state = self.state.rc_deref();
      if state.closed {
        Entry::Dead
      } else {
        match &state.terminal {
          Some(Terminal::Error(err)) => Entry::Finished(Terminal::Error(err.clone())),
          Some(Terminal::Complete) => Entry::Finished(Terminal::Complete),
          None => Entry::Live,
        }
      }
    };

    match entry {
      Entry::Dead => {
        let _ = subscriber.unsubscribe();
      }
      Entry::Finished(Terminal::Error(err)) => subscriber.error(err),
      Entry::Finished(Terminal::Complete) => subscriber.complete(),
      Entry::Live => {
        let id = {
          let mut state = self.state.rc_deref_mut();
          let id = state.next_id;
          state.next_id += 1;
          state.observers.push((id, subscriber.clone()));
          id
        };
        let weak = self.state.downgrade();
        subscriber.add(Teardown::callback(move || {
          if let Some(state) = weak.upgrade() {
            let mut state = state.rc_deref_mut();
            if let Some(pos) = state.observers.iter().position(|(i, _)| *i == id) {
              state.observers.remove(pos);
            }
          }
        }));
      }
    }
  }
}

impl<Item: Clone + 'static, Err: Clone + Debug + 'static> SourceLink<Item, Err>
  for Subject<Item, Err>
{
  fn attach(&self, subscriber: Subscriber<Item, Err>) -> Result<(), Err> {
    self.register(subscriber);
    Ok(())
  }
}

/// A subject can sit downstream of another observable. Emission failures
/// (pushes arriving after the subject terminated) are diverted by the
/// upstream subscriber's stopped handling, so they are ignored here rather
/// than surfaced.
impl<Item: Clone + 'static, Err: Clone + Debug + 'static> Observer<Item, Err>
  for Subject<Item, Err>
{
  fn next(&mut self, value: Item) { let _ = Subject::next(self, value); }

  fn error(&mut self, err: Err) { let _ = Subject::error(self, err); }

  fn complete(&mut self) { let _ = Subject::complete(self); }
}
