//! Disposable resource nodes forming a tree of teardown relationships.
//!
//! A [`Subscription`] owns an ordered list of finalizers (child subscriptions
//! and callbacks) and carries weak back-references to every parent that owns
//! it. Unsubscribing cascades down through the finalizers and detaches the
//! node from its parents; the operation is idempotent, and every finalizer
//! runs even when earlier ones fail.

use std::{fmt, mem};

use smallvec::SmallVec;

use crate::{
  error::{RxError, UnsubscribeError},
  rc::{MutRc, WeakRc},
};

/// A finalizer callback. May fail; failures are collected into the
/// [`UnsubscribeError`] aggregate rather than aborting teardown.
pub type TeardownFn = Box<dyn FnOnce() -> Result<(), RxError>>;

/// One releasable resource held by a [`Subscription`]: either a nested
/// subscription (torn down recursively) or a plain callback.
pub enum Teardown {
  Subscription(Subscription),
  Callback(TeardownFn),
}

impl Teardown {
  /// Wrap an infallible cleanup closure.
  pub fn callback(f: impl FnOnce() + 'static) -> Self {
    Teardown::Callback(Box::new(move || {
      f();
      Ok(())
    }))
  }

  /// Wrap a cleanup closure that may fail.
  pub fn fallible(f: impl FnOnce() -> Result<(), RxError> + 'static) -> Self {
    Teardown::Callback(Box::new(f))
  }

  /// Run the teardown outside of an `unsubscribe` pass. Used when a resource
  /// is attached to an already-closed subscription: it is released on the
  /// spot and never stored. Failures have no caller to return to, so they go
  /// to the log.
  fn execute_detached(self) {
    match self {
      Teardown::Callback(f) => {
        if let Err(err) = f() {
          log::error!("teardown failed after subscription closed: {err}");
        }
      }
      Teardown::Subscription(sub) => {
        if let Err(err) = sub.unsubscribe() {
          log::error!("teardown failed after subscription closed: {err}");
        }
      }
    }
  }
}

impl From<Subscription> for Teardown {
  fn from(sub: Subscription) -> Self { Teardown::Subscription(sub) }
}

/// Identifies one registered finalizer, for later [`Subscription::remove`].
///
/// Callbacks have no usable identity of their own in Rust, so `add` hands
/// back an id instead.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct FinalizerHandle(usize);

struct Inner {
  closed: bool,
  next_id: usize,
  /// Weak back-references; parentage never keeps a node alive.
  parents: SmallVec<[WeakRc<Inner>; 1]>,
  finalizers: SmallVec<[(usize, Teardown); 1]>,
  initial: Option<TeardownFn>,
}

impl Default for Inner {
  fn default() -> Self {
    Inner {
      closed: false,
      next_id: 0,
      parents: SmallVec::new(),
      finalizers: SmallVec::new(),
      initial: None,
    }
  }
}

/// A disposable handle over one or more releasable resources.
///
/// Cloning is cheap and yields the same node: identity follows the
/// underlying cell, not the handle. A subscription may be shared as a child
/// across multiple parents; whichever unsubscribes first releases it, and
/// the rest forget it.
#[derive(Clone, Default)]
pub struct Subscription(MutRc<Inner>);

impl Subscription {
  pub fn new() -> Self { Self::default() }

  /// Create a subscription whose initial teardown runs before any finalizer
  /// when the node is unsubscribed.
  pub fn with_teardown(f: impl FnOnce() + 'static) -> Self {
    Self::with_fallible_teardown(move || {
      f();
      Ok(())
    })
  }

  pub fn with_fallible_teardown(f: impl FnOnce() -> Result<(), RxError> + 'static) -> Self {
    let sub = Self::new();
    sub.0.rc_deref_mut().initial = Some(Box::new(f));
    sub
  }

  #[inline]
  pub fn is_closed(&self) -> bool { self.0.rc_deref().closed }

  /// Two handles designate the same node.
  #[inline]
  pub fn ptr_eq(&self, other: &Subscription) -> bool { self.0.ptr_eq(&other.0) }

  /// Attach a teardown to this node.
  ///
  /// Returns `None` without storing anything when the teardown is this node
  /// itself, an already-closed child, or a child that already lists this
  /// node as a parent. When this node is already closed the teardown is
  /// executed immediately instead of stored. Otherwise the child gains a
  /// back-reference to this node and the teardown joins the finalizer list.
  pub fn add(&self, teardown: impl Into<Teardown>) -> Option<FinalizerHandle> {
    let teardown = teardown.into();
    if self.is_closed() {
      teardown.execute_detached();
      return None;
    }
    if let Teardown::Subscription(child) = &teardown {
      if child.ptr_eq(self) || child.is_closed() || child.has_parent(self) {
        return None;
      }
      child.0.rc_deref_mut().parents.push(self.0.downgrade());
    }
    let mut inner = self.0.rc_deref_mut();
    let id = inner.next_id;
    inner.next_id += 1;
    inner.finalizers.push((id, teardown));
    Some(FinalizerHandle(id))
  }

  /// Detach one finalizer by handle. Child subscriptions also forget this
  /// node as a parent. Returns whether anything was removed.
  pub fn remove(&self, handle: FinalizerHandle) -> bool {
    let removed = {
      let mut inner = self.0.rc_deref_mut();
      inner
        .finalizers
        .iter()
        .position(|(id, _)| *id == handle.0)
        .map(|pos| inner.finalizers.remove(pos).1)
    };
    match removed {
      Some(Teardown::Subscription(child)) => {
        child.remove_parent(self);
        true
      }
      Some(Teardown::Callback(_)) => true,
      None => false,
    }
  }

  /// Detach a child subscription by identity, symmetric with `add`.
  pub fn remove_subscription(&self, child: &Subscription) -> bool {
    let mut found = false;
    {
      let mut inner = self.0.rc_deref_mut();
      inner.finalizers.retain(|(_, t)| match t {
        Teardown::Subscription(s) if s.ptr_eq(child) => {
          found = true;
          false
        }
        _ => true,
      });
    }
    if found {
      child.remove_parent(self);
    }
    found
  }

  /// Release every resource in this node's tree. Idempotent.
  ///
  /// The node closes and empties its finalizer list before anything runs, so
  /// re-entrant calls observe a closed node. Parents are told to forget this
  /// node, the initial teardown runs first, then every finalizer in
  /// insertion order. All finalizers run even when earlier ones fail; the
  /// collected failures come back as one flattened [`UnsubscribeError`].
  pub fn unsubscribe(&self) -> Result<(), UnsubscribeError> {
    let (initial, finalizers, parents) = {
      let mut inner = self.0.rc_deref_mut();
      if inner.closed {
        return Ok(());
      }
      inner.closed = true;
      (
        inner.initial.take(),
        mem::take(&mut inner.finalizers),
        mem::take(&mut inner.parents),
      )
    };

    for parent in parents {
      if let Some(parent) = parent.upgrade() {
        parent
          .rc_deref_mut()
          .finalizers
          .retain(|(_, t)| !matches!(t, Teardown::Subscription(s) if s.ptr_eq(self)));
      }
    }

    let mut errors: Vec<RxError> = Vec::new();
    if let Some(f) = initial {
      if let Err(err) = f() {
        errors.push(err);
      }
    }
    for (_, teardown) in finalizers {
      match teardown {
        Teardown::Callback(f) => {
          if let Err(err) = f() {
            errors.push(err);
          }
        }
        Teardown::Subscription(child) => {
          if let Err(err) = child.unsubscribe() {
            errors.push(Box::new(err));
          }
        }
      }
    }

    if errors.is_empty() { Ok(()) } else { Err(UnsubscribeError::from_raw(errors)) }
  }

  /// Activate RAII behavior: the returned guard unsubscribes on drop.
  pub fn unsubscribe_when_dropped(self) -> SubscriptionGuard { SubscriptionGuard(self) }

  fn has_parent(&self, candidate: &Subscription) -> bool {
    self
      .0
      .rc_deref()
      .parents
      .iter()
      .any(|p| p.ptr_eq(&candidate.0))
  }

  fn remove_parent(&self, parent: &Subscription) {
    self
      .0
      .rc_deref_mut()
      .parents
      .retain(|p| !p.ptr_eq(&parent.0));
  }

  #[cfg(test)]
  fn finalizer_count(&self) -> usize { self.0.rc_deref().finalizers.len() }

  #[cfg(test)]
  fn parent_count(&self) -> usize { self.0.rc_deref().parents.len() }
}

impl fmt::Debug for Subscription {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let inner = self.0.rc_deref();
    f.debug_struct("Subscription")
      .field("closed", &inner.closed)
      .field("finalizer_count", &inner.finalizers.len())
      .finish()
  }
}

/// An RAII wrapper that unsubscribes when dropped.
///
/// Teardown failures during drop have no caller to surface to, so they are
/// logged at `warn` level.
#[must_use]
#[derive(Debug)]
pub struct SubscriptionGuard(Subscription);

impl SubscriptionGuard {
  pub fn subscription(&self) -> &Subscription { &self.0 }
}

impl Drop for SubscriptionGuard {
  fn drop(&mut self) {
    if let Err(err) = self.0.unsubscribe() {
      log::warn!("teardown failed while dropping subscription guard: {err}");
    }
  }
}
