//! # rxlite: a dynamic reactive-stream core
//!
//! Observables, subscribers, and subjects over teardown-safe subscription
//! trees: the push-based core of Reactive Extensions, in its dynamic
//! (trait-object) form. Single-threaded, synchronous, cooperative — values
//! propagate on the caller's stack, and unsubscription is the one
//! cancellation mechanism.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::{cell::RefCell, rc::Rc};
//!
//! use rxlite::prelude::*;
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let c = seen.clone();
//!
//! Observable::<i32, &str>::from_iter(0..10)
//!   .pipe((map(|v: i32| v * 2),))
//!   .subscribe(move |v| c.borrow_mut().push(v));
//!
//! assert_eq!(seen.borrow().len(), 10);
//! ```
//!
//! ## Key Concepts
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Observable`] | A lazy push-based producer, composed via `lift`/`pipe` |
//! | [`Observer`] | Consumes `next`, `error`, and `complete` notifications |
//! | [`Subscriber`] | An active subscription that forwards to a destination |
//! | [`Subscription`] | A disposable handle over a tree of teardown resources |
//! | [`Subject`] | A multicast hub: observable and observer at once |
//! | [`Config`] | Per-subscription hooks and the error reporter |
//!
//! Teardown is aggregate-safe: every finalizer in a subscription tree runs
//! even when earlier ones fail, and the failures come back as one flattened
//! [`UnsubscribeError`](error::UnsubscribeError).
//!
//! [`Observable`]: observable::Observable
//! [`Observer`]: observer::Observer
//! [`Subscriber`]: subscriber::Subscriber
//! [`Subscription`]: subscription::Subscription
//! [`Subject`]: subject::Subject
//! [`Config`]: config::Config

pub mod config;
pub mod error;
pub mod observable;
pub mod observer;
pub mod ops;
pub mod prelude;
pub mod rc;
pub mod subject;
pub mod subscriber;
pub mod subscription;

pub use prelude::*;
