//! Error taxonomy of the reactive core.
//!
//! Teardown callbacks and the unhandled-error path traffic in [`RxError`], a
//! boxed dynamic error, so heterogeneous failures can travel through one
//! channel. Stream errors themselves stay generic (`Err` on
//! [`Observer`](crate::observer::Observer)); the types here cover the
//! library's own failure modes.

use std::fmt;

use thiserror::Error;

/// Boxed dynamic error used by teardown callbacks and error reporting.
pub type RxError = Box<dyn std::error::Error + 'static>;

/// Aggregate error raised when one or more finalizers fail during
/// [`Subscription::unsubscribe`](crate::subscription::Subscription::unsubscribe).
///
/// Every finalizer runs even when earlier ones fail; the failures are
/// collected in registration order and raised once, after the whole tree has
/// been torn down. Nested aggregates (a child subscription that itself failed
/// to tear down) are flattened into the parent's list.
pub struct UnsubscribeError {
  errors: Vec<RxError>,
}

impl UnsubscribeError {
  /// Build an aggregate from raw collected errors, flattening any nested
  /// `UnsubscribeError` found among them.
  pub(crate) fn from_raw(raw: Vec<RxError>) -> Self {
    let mut errors = Vec::with_capacity(raw.len());
    for err in raw {
      match err.downcast::<UnsubscribeError>() {
        Ok(nested) => errors.extend(nested.errors),
        Err(other) => errors.push(other),
      }
    }
    UnsubscribeError { errors }
  }

  /// The flattened sub-errors, in the order their finalizers were registered.
  pub fn errors(&self) -> &[RxError] { &self.errors }

  pub fn into_errors(self) -> Vec<RxError> { self.errors }
}

impl fmt::Display for UnsubscribeError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} errors occurred during unsubscription", self.errors.len())?;
    for (i, err) in self.errors.iter().enumerate() {
      write!(f, "\n  {}) {}", i + 1, err)?;
    }
    Ok(())
  }
}

impl fmt::Debug for UnsubscribeError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("UnsubscribeError")
      .field("errors", &self.errors)
      .finish()
  }
}

impl std::error::Error for UnsubscribeError {}

/// Emission attempted on a subject that is already terminated or
/// unsubscribed.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Error)]
#[error("subject already closed")]
pub struct ClosedError;

/// A stream error reached a subscriber that has no error callback.
///
/// The original error is rendered into the message; the value travels to the
/// unhandled-error hook (or the configured reporter) instead of silently
/// disappearing.
#[derive(Debug, Error)]
#[error("unhandled error in stream: {0}")]
pub struct UnhandledError(pub String);

#[cfg(test)]
mod tests {
  use super::*;

  fn boxed(msg: &str) -> RxError { msg.into() }

  #[test]
  fn aggregate_keeps_order() {
    let err = UnsubscribeError::from_raw(vec![boxed("first"), boxed("second")]);
    let rendered: Vec<String> = err.errors().iter().map(|e| e.to_string()).collect();
    assert_eq!(rendered, vec!["first", "second"]);
  }

  #[test]
  fn nested_aggregates_flatten() {
    let inner = UnsubscribeError::from_raw(vec![boxed("a"), boxed("b")]);
    let outer = UnsubscribeError::from_raw(vec![boxed("before"), Box::new(inner), boxed("after")]);
    let rendered: Vec<String> = outer.errors().iter().map(|e| e.to_string()).collect();
    assert_eq!(rendered, vec!["before", "a", "b", "after"]);
  }

  #[test]
  fn display_counts_and_enumerates() {
    let err = UnsubscribeError::from_raw(vec![boxed("boom")]);
    let text = err.to_string();
    assert!(text.starts_with("1 errors occurred during unsubscription"));
    assert!(text.contains("1) boom"));
  }
}
