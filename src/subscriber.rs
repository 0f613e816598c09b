//! The active half of a subscription: forwards notifications to a
//! destination observer while enforcing the stopped state.

use std::fmt::Debug;

use crate::{
  config::{Config, StoppedNotice},
  error::UnhandledError,
  observer::{Observer, ObserverFns},
  rc::MutRc,
  subscription::{FinalizerHandle, Subscription, Teardown},
};

/// Where a subscriber forwards to: a partial closure record (the safe
/// observer path) or a full observer (operator intermediates, subjects).
pub(crate) enum Destination<Item, Err> {
  Fns(ObserverFns<Item, Err>),
  Observer(Box<dyn Observer<Item, Err>>),
}

struct State<Item, Err> {
  stopped: bool,
  destination: Option<Destination<Item, Err>>,
  config: Config,
  subscription: Subscription,
}

/// A [`Subscription`] that also conforms to [`Observer`], forwarding
/// notifications to a destination.
///
/// Cloning yields another handle to the same subscriber, mirroring the
/// reference semantics the dynamic model needs: a subject stores one handle
/// per registration, an operator chain threads another upstream.
///
/// Once stopped (by a terminal notification, by `unsubscribe`, or because
/// the underlying subscription closed), later notifications are diverted to
/// the configured stopped-notification hook instead of the destination.
/// Terminal notifications always tear the subscription down, on every exit
/// path.
///
/// Re-entrant delivery into the *same* subscriber from inside its own
/// callback is not supported and will panic on the interior borrow; feed
/// values back through a subject boundary instead.
pub struct Subscriber<Item, Err>(MutRc<State<Item, Err>>);

impl<Item, Err> Clone for Subscriber<Item, Err> {
  fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<Item: 'static, Err: Debug + 'static> Subscriber<Item, Err> {
  /// Wrap a partial observer record, with a fresh subscription.
  pub fn new(fns: ObserverFns<Item, Err>, config: Config) -> Self {
    Self::assemble(Subscription::new(), config, Destination::Fns(fns))
  }

  /// Wrap a full observer, with a fresh subscription.
  pub fn from_observer(observer: impl Observer<Item, Err> + 'static, config: Config) -> Self {
    Self::assemble(Subscription::new(), config, Destination::Observer(Box::new(observer)))
  }

  /// Wrap an observer on top of an existing subscription.
  ///
  /// Operator chains use this to share one teardown tree across every stage:
  /// the upstream stage's subscriber and the downstream subscriber both hold
  /// the same [`Subscription`], so cancelling the handle cancels the chain.
  pub fn with_shared(
    subscription: Subscription, config: Config, observer: impl Observer<Item, Err> + 'static,
  ) -> Self {
    Self::assemble(subscription, config, Destination::Observer(Box::new(observer)))
  }

  fn assemble(
    subscription: Subscription, config: Config, destination: Destination<Item, Err>,
  ) -> Self {
    Self(MutRc::own(State {
      stopped: false,
      destination: Some(destination),
      config,
      subscription,
    }))
  }

  /// The teardown handle shared by this subscriber.
  pub fn subscription(&self) -> Subscription { self.0.rc_deref().subscription.clone() }

  pub fn config(&self) -> Config { self.0.rc_deref().config.clone() }

  /// Whether notifications would be diverted rather than delivered.
  /// Producers are expected to check this cooperatively.
  pub fn is_stopped(&self) -> bool {
    let state = self.0.rc_deref();
    state.stopped || state.subscription.is_closed()
  }

  /// Attach a teardown to the shared subscription.
  pub fn add(&self, teardown: impl Into<Teardown>) -> Option<FinalizerHandle> {
    self.subscription().add(teardown)
  }

  pub fn next(&mut self, value: Item) {
    let mut state = self.0.rc_deref_mut();
    if state.stopped || state.subscription.is_closed() {
      let config = state.config.clone();
      drop(state);
      config.stopped_notification(StoppedNotice::Next(Box::new(value)));
      return;
    }
    match state.destination.as_mut() {
      Some(Destination::Fns(fns)) => {
        if let Some(next) = fns.next.as_mut() {
          next(value);
        }
      }
      Some(Destination::Observer(observer)) => observer.next(value),
      None => {}
    }
  }

  pub fn error(&mut self, err: Err) {
    let Some((destination, config, subscription)) = self.stop_and_take() else {
      let config = self.config();
      config.stopped_notification(StoppedNotice::Error(Box::new(err)));
      return;
    };
    match destination {
      Some(Destination::Fns(mut fns)) => match fns.error.as_mut() {
        Some(cb) => cb(err),
        None => config.unhandled_error(Box::new(UnhandledError(format!("{err:?}")))),
      },
      Some(Destination::Observer(mut observer)) => observer.error(err),
      None => config.unhandled_error(Box::new(UnhandledError(format!("{err:?}")))),
    }
    if let Err(teardown_err) = subscription.unsubscribe() {
      config.report(Box::new(teardown_err));
    }
  }

  pub fn complete(&mut self) {
    let Some((destination, config, subscription)) = self.stop_and_take() else {
      let config = self.config();
      config.stopped_notification(StoppedNotice::Complete);
      return;
    };
    match destination {
      Some(Destination::Fns(mut fns)) => {
        if let Some(cb) = fns.complete.as_mut() {
          cb();
        }
      }
      Some(Destination::Observer(mut observer)) => observer.complete(),
      None => {}
    }
    if let Err(teardown_err) = subscription.unsubscribe() {
      config.report(Box::new(teardown_err));
    }
  }

  /// Stop this subscriber and release the subscription tree. The
  /// destination reference is cleared to break the chain.
  pub fn unsubscribe(&mut self) -> Result<(), crate::error::UnsubscribeError> {
    let subscription = {
      let mut state = self.0.rc_deref_mut();
      state.stopped = true;
      state.destination = None;
      state.subscription.clone()
    };
    subscription.unsubscribe()
  }

  /// Marks the subscriber stopped and takes what a terminal notification
  /// needs, or `None` if already stopped.
  fn stop_and_take(&mut self) -> Option<(Option<Destination<Item, Err>>, Config, Subscription)> {
    let mut state = self.0.rc_deref_mut();
    if state.stopped || state.subscription.is_closed() {
      return None;
    }
    state.stopped = true;
    Some((state.destination.take(), state.config.clone(), state.subscription.clone()))
  }
}

impl<Item: 'static, Err: Debug + 'static> Observer<Item, Err> for Subscriber<Item, Err> {
  #[inline]
  fn next(&mut self, value: Item) { Subscriber::next(self, value); }

  #[inline]
  fn error(&mut self, err: Err) { Subscriber::error(self, err); }

  #[inline]
  fn complete(&mut self) { Subscriber::complete(self); }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use super::*;
  use crate::config::{CollectReporter, NoticeKind};

  fn collecting() -> (Rc<RefCell<Vec<i32>>>, ObserverFns<i32, &'static str>) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let s = seen.clone();
    (seen, ObserverFns::new().on_next(move |v| s.borrow_mut().push(v)))
  }

  #[test]
  fn forwards_until_complete_then_diverts() {
    let notices = Rc::new(RefCell::new(Vec::new()));
    let n = notices.clone();
    let config = Config::new().with_stopped_notification(move |notice| n.borrow_mut().push(notice.kind()));
    let (seen, fns) = collecting();
    let mut subscriber = Subscriber::new(fns, config);

    subscriber.next(1);
    subscriber.complete();
    subscriber.next(2);
    subscriber.complete();

    assert_eq!(*seen.borrow(), vec![1]);
    assert_eq!(*notices.borrow(), vec![NoticeKind::Next, NoticeKind::Complete]);
  }

  #[test]
  fn stopped_notice_carries_the_value() {
    let payloads = Rc::new(RefCell::new(Vec::new()));
    let p = payloads.clone();
    let config = Config::new().with_stopped_notification(move |notice| {
      p.borrow_mut().push(notice.value::<i32>().copied());
    });
    let (_, fns) = collecting();
    let mut subscriber = Subscriber::new(fns, config);

    subscriber.complete();
    subscriber.next(7);
    assert_eq!(*payloads.borrow(), vec![Some(7)]);
  }

  #[test]
  fn terminal_error_reaches_callback_once() {
    let errors = Rc::new(RefCell::new(Vec::new()));
    let e = errors.clone();
    let fns: ObserverFns<i32, &str> =
      ObserverFns::new().on_error(move |err: &str| e.borrow_mut().push(err.to_string()));
    let mut subscriber = Subscriber::new(fns, Config::default());

    subscriber.error("boom");
    subscriber.error("again");
    assert_eq!(*errors.borrow(), vec!["boom"]);
    assert!(subscriber.subscription().is_closed());
  }

  #[test]
  fn error_without_callback_goes_to_unhandled_path() {
    let reporter = CollectReporter::new();
    let config = Config::new().with_reporter(reporter.clone());
    let (_, fns) = collecting();
    let mut subscriber = Subscriber::new(fns, config);

    subscriber.error("nobody listening");
    let collected = reporter.take();
    assert_eq!(collected.len(), 1);
    assert!(collected[0].to_string().contains("nobody listening"));
  }

  #[test]
  fn terminal_notifications_tear_down() {
    let torn = Rc::new(RefCell::new(0));
    let t = torn.clone();
    let (_, fns) = collecting();
    let mut subscriber = Subscriber::new(fns, Config::default());
    subscriber.add(Teardown::callback(move || *t.borrow_mut() += 1));

    subscriber.complete();
    assert_eq!(*torn.borrow(), 1);
    assert!(subscriber.subscription().is_closed());
  }

  #[test]
  fn closing_the_handle_stops_delivery() {
    let (seen, fns) = collecting();
    let mut subscriber = Subscriber::new(fns, Config::default());
    let handle = subscriber.subscription();

    subscriber.next(1);
    handle.unsubscribe().unwrap();
    subscriber.next(2);
    assert_eq!(*seen.borrow(), vec![1]);
    assert!(subscriber.is_stopped());
  }

  #[test]
  fn teardown_failure_during_terminal_goes_to_reporter() {
    let reporter = CollectReporter::new();
    let config = Config::new().with_reporter(reporter.clone());
    let (_, fns) = collecting();
    let mut subscriber = Subscriber::new(fns, config);
    subscriber.add(Teardown::fallible(|| Err("cleanup failed".into())));

    subscriber.complete();
    let collected = reporter.take();
    assert_eq!(collected.len(), 1);
    assert!(collected[0].to_string().contains("cleanup failed"));
  }
}
