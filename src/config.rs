//! Subscription-time configuration: error hooks and the reporter capability.
//!
//! The config is an explicit value threaded into every subscriber rather
//! than process-global state, so concurrent tests (and embedders with
//! different policies) never observe each other's hooks. Cloning is cheap;
//! all hook storage is reference-counted.

use std::{any::Any, fmt, rc::Rc};

use crate::error::RxError;

/// Sink for errors that have no other place to go: teardown failures raised
/// inside a terminal notification, and stream errors nobody subscribed a
/// handler for.
///
/// Reporting must not re-enter producer code from the emitting call stack,
/// so implementations should only record or log. The capability is
/// injectable so tests can observe reports synchronously.
pub trait Reporter {
  fn report(&self, error: RxError);
}

/// Default reporter: logs at `error` level via the `log` facade.
#[derive(Clone, Copy, Default)]
pub struct LogReporter;

impl Reporter for LogReporter {
  fn report(&self, error: RxError) { log::error!("unhandled rxlite error: {error}"); }
}

/// Test reporter: accumulates reported errors for synchronous inspection.
#[derive(Clone, Default)]
pub struct CollectReporter {
  collected: Rc<std::cell::RefCell<Vec<RxError>>>,
}

impl CollectReporter {
  pub fn new() -> Self { Self::default() }

  /// Drain everything reported so far.
  pub fn take(&self) -> Vec<RxError> { self.collected.borrow_mut().drain(..).collect() }

  pub fn len(&self) -> usize { self.collected.borrow().len() }

  pub fn is_empty(&self) -> bool { self.collected.borrow().is_empty() }
}

impl Reporter for CollectReporter {
  fn report(&self, error: RxError) { self.collected.borrow_mut().push(error); }
}

/// Which notification was diverted after termination.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum NoticeKind {
  Next,
  Error,
  Complete,
}

/// A notification that arrived on an already-stopped subscriber.
///
/// Instead of reaching the destination (or raising), late notifications are
/// handed to the `on_stopped_notification` hook. The payload is type-erased;
/// hooks that know the stream's types can downcast via [`StoppedNotice::value`].
pub enum StoppedNotice {
  Next(Box<dyn Any>),
  Error(Box<dyn Any>),
  Complete,
}

impl StoppedNotice {
  pub fn kind(&self) -> NoticeKind {
    match self {
      StoppedNotice::Next(_) => NoticeKind::Next,
      StoppedNotice::Error(_) => NoticeKind::Error,
      StoppedNotice::Complete => NoticeKind::Complete,
    }
  }

  /// Downcast the diverted payload, if any.
  pub fn value<T: 'static>(&self) -> Option<&T> {
    match self {
      StoppedNotice::Next(v) | StoppedNotice::Error(v) => v.downcast_ref(),
      StoppedNotice::Complete => None,
    }
  }
}

impl fmt::Debug for StoppedNotice {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("StoppedNotice")
      .field("kind", &self.kind())
      .finish()
  }
}

/// Per-subscription configuration.
///
/// Carries the two observability hooks of the reactive core plus the
/// [`Reporter`] used when no hook is installed. Every subscriber holds a
/// clone; emission paths read it, nothing mutates it after construction.
#[derive(Clone)]
pub struct Config {
  on_unhandled_error: Option<Rc<dyn Fn(RxError)>>,
  on_stopped_notification: Option<Rc<dyn Fn(StoppedNotice)>>,
  reporter: Rc<dyn Reporter>,
}

impl Default for Config {
  fn default() -> Self {
    Config {
      on_unhandled_error: None,
      on_stopped_notification: None,
      reporter: Rc::new(LogReporter),
    }
  }
}

impl Config {
  pub fn new() -> Self { Self::default() }

  /// Install a hook invoked for stream errors that reach a subscriber with
  /// no error callback.
  pub fn with_unhandled_error(mut self, hook: impl Fn(RxError) + 'static) -> Self {
    self.on_unhandled_error = Some(Rc::new(hook));
    self
  }

  /// Install a hook invoked for notifications arriving after termination.
  pub fn with_stopped_notification(mut self, hook: impl Fn(StoppedNotice) + 'static) -> Self {
    self.on_stopped_notification = Some(Rc::new(hook));
    self
  }

  /// Replace the reporter used when no unhandled-error hook is installed.
  pub fn with_reporter(mut self, reporter: impl Reporter + 'static) -> Self {
    self.reporter = Rc::new(reporter);
    self
  }

  pub(crate) fn unhandled_error(&self, error: RxError) {
    match &self.on_unhandled_error {
      Some(hook) => hook(error),
      None => self.reporter.report(error),
    }
  }

  pub(crate) fn stopped_notification(&self, notice: StoppedNotice) {
    match &self.on_stopped_notification {
      Some(hook) => hook(notice),
      None => log::debug!("notification after termination: {notice:?}"),
    }
  }

  pub(crate) fn report(&self, error: RxError) { self.reporter.report(error); }
}
