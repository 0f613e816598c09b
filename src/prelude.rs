//! Prelude module for convenient imports
//!
//! This module re-exports commonly used types and traits for easy access.

pub use crate::{
  config::{CollectReporter, Config, LogReporter, NoticeKind, Reporter, StoppedNotice},
  error::{ClosedError, RxError, UnhandledError, UnsubscribeError},
  observable::{pipe, Observable, Operator, PipeChain},
  observer::{Observer, ObserverFns},
  ops::{map, map_indexed, map_to, operate, try_map},
  subject::Subject,
  subscriber::Subscriber,
  subscription::{FinalizerHandle, Subscription, SubscriptionGuard, Teardown, TeardownFn},
};
