//! The lazy, push-based producer.
//!
//! An [`Observable`] is one of three things under the hood: a root producer
//! function, a derivation built by [`lift`](Observable::lift) (an upstream
//! source paired with an operator), or an operator-less chain onto another
//! source (a pass-through). The representation is an explicit tagged variant;
//! subscription dispatches on it rather than probing shapes at runtime.

use std::{fmt::Debug, rc::Rc};

mod pipe;
pub use pipe::{pipe, PipeChain};

use crate::{
  config::Config,
  observer::{Observer, ObserverFns},
  subscriber::Subscriber,
  subscription::Subscription,
};

/// A subscription-time transformation attached by [`Observable::lift`].
///
/// `call` receives the downstream subscriber and the upstream source, wires
/// whatever intermediate observers the operator needs, and subscribes the
/// source. A synchronous error return is routed to the subscriber's error
/// path by the subscribe machinery.
pub trait Operator<Err> {
  type In;
  type Out;

  fn call(
    &self, subscriber: Subscriber<Self::Out, Err>, source: &Observable<Self::In, Err>,
  ) -> Result<(), Err>;
}

/// Anything a pass-through observable can chain onto: an upstream that knows
/// how to accept a ready-made subscriber. Implemented by [`Observable`]
/// itself and by [`Subject`](crate::subject::Subject).
pub(crate) trait SourceLink<Item, Err> {
  fn attach(&self, subscriber: Subscriber<Item, Err>) -> Result<(), Err>;
}

type Producer<Item, Err> = dyn Fn(&mut Subscriber<Item, Err>) -> Result<(), Err>;

/// Type-erased `lift` pairing: holds the typed upstream plus the operator.
trait LiftedSource<Out, Err> {
  fn call(&self, subscriber: Subscriber<Out, Err>) -> Result<(), Err>;
}

struct Lift<Op: Operator<Err>, Err> {
  source: Observable<Op::In, Err>,
  operator: Op,
}

impl<Op: Operator<Err>, Err> LiftedSource<Op::Out, Err> for Lift<Op, Err> {
  fn call(&self, subscriber: Subscriber<Op::Out, Err>) -> Result<(), Err> {
    self.operator.call(subscriber, &self.source)
  }
}

enum Inner<Item, Err> {
  Producer(Box<Producer<Item, Err>>),
  Lifted(Box<dyn LiftedSource<Item, Err>>),
  Chained(Rc<dyn SourceLink<Item, Err>>),
}

/// A lazy producer of values over time. Cloning is cheap and shares the
/// definition; every subscription runs the producer anew.
pub struct Observable<Item, Err> {
  inner: Rc<Inner<Item, Err>>,
}

impl<Item, Err> Clone for Observable<Item, Err> {
  fn clone(&self) -> Self { Self { inner: self.inner.clone() } }
}

impl<Item: 'static, Err: Debug + 'static> Observable<Item, Err> {
  /// Create a root observable from a producer function.
  ///
  /// The producer drives the subscriber and registers any teardown on it
  /// via [`Subscriber::add`]. A synchronous `Err` return is delivered
  /// through the subscriber's error path.
  ///
  /// ```rust
  /// use rxlite::prelude::*;
  ///
  /// let numbers: Observable<i32, &str> = Observable::new(|subscriber| {
  ///   subscriber.next(1);
  ///   subscriber.next(2);
  ///   subscriber.complete();
  ///   Ok(())
  /// });
  /// numbers.subscribe(|v| println!("{v}"));
  /// ```
  pub fn new(producer: impl Fn(&mut Subscriber<Item, Err>) -> Result<(), Err> + 'static) -> Self {
    Self { inner: Rc::new(Inner::Producer(Box::new(producer))) }
  }

  pub(crate) fn chained(source: Rc<dyn SourceLink<Item, Err>>) -> Self {
    Self { inner: Rc::new(Inner::Chained(source)) }
  }

  /// Derive a new observable by attaching an operator; `self` is untouched
  /// and remains subscribable.
  pub fn lift<Op>(&self, operator: Op) -> Observable<Op::Out, Err>
  where
    Op: Operator<Err, In = Item> + 'static,
    Op::Out: 'static,
  {
    Observable {
      inner: Rc::new(Inner::Lifted(Box::new(Lift { source: self.clone(), operator }))),
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

  /// Subscribe with a partial observer record and an explicit config.
  pub fn subscribe_with_config(&self, fns: ObserverFns<Item, Err>, config: Config) -> Subscription {
    self.subscribe_subscriber(Subscriber::new(fns, config))
  }

  /// Subscribe with a full observer.
  pub fn subscribe_observer(&self, observer: impl Observer<Item, Err> + 'static) -> Subscription {
    self.subscribe_subscriber(Subscriber::from_observer(observer, Config::default()))
  }

  /// Subscribe with a ready-made subscriber, reused as-is. This is the
  /// normalization point every other `subscribe` variant funnels into, and
  /// the entry operators use to chain upstream.
  pub fn subscribe_subscriber(&self, subscriber: Subscriber<Item, Err>) -> Subscription {
    let handle = subscriber.subscription();
    match &*self.inner {
      Inner::Producer(produce) => {
        let mut subscriber = subscriber;
        if let Err(err) = produce(&mut subscriber) {
          subscriber.error(err);
        }
      }
      Inner::Lifted(lifted) => {
        let mut fallback = subscriber.clone();
        if let Err(err) = lifted.call(subscriber) {
          fallback.error(err);
        }
      }
      Inner::Chained(source) => {
        let mut fallback = subscriber.clone();
        if let Err(err) = source.attach(subscriber) {
          fallback.error(err);
        }
      }
    }
    handle
  }

  /// Compose this observable through a tuple of unary transforms, applied
  /// left to right. The empty tuple is the identity.
  ///
  /// ```rust
  /// use rxlite::prelude::*;
  ///
  /// let doubled_strings = Observable::<i32, &str>::from_iter(0..3)
  ///   .pipe((map(|v: i32| v * 2), map(|v: i32| v.to_string())));
  /// doubled_strings.subscribe(|s| println!("{s}"));
  /// ```
  pub fn pipe<Ops: PipeChain<Self>>(self, ops: Ops) -> Ops::Out { ops.apply(self) }

  /// Emit one value, then complete.
  pub fn of(value: Item) -> Self
  where
    Item: Clone,
  {
    Observable::new(move |subscriber| {
      subscriber.next(value.clone());
      subscriber.complete();
      Ok(())
    })
  }

  /// Emit every item of a (re-iterable) collection, then complete. The
  /// producer checks [`Subscriber::is_stopped`] between items so a consumer
  /// that cancels mid-iteration stops the loop.
  pub fn from_iter<I>(iter: I) -> Self
  where
    I: IntoIterator<Item = Item> + Clone + 'static,
  {
    Observable::new(move |subscriber| {
      for value in iter.clone() {
        if subscriber.is_stopped() {
          return Ok(());
        }
        subscriber.next(value);
      }
      subscriber.complete();
      Ok(())
    })
  }

  /// Complete immediately without emitting.
  pub fn empty() -> Self {
    Observable::new(|subscriber| {
      subscriber.complete();
      Ok(())
    })
  }

  /// Never emit and never complete.
  pub fn never() -> Self { Observable::new(|_| Ok(())) }

  /// Error immediately without emitting.
  pub fn throw(err: Err) -> Self
  where
    Err: Clone,
  {
    Observable::new(move |_| Err(err.clone()))
  }
}

impl<Item: 'static, Err: Debug + 'static> SourceLink<Item, Err> for Observable<Item, Err> {
  fn attach(&self, subscriber: Subscriber<Item, Err>) -> Result<(), Err> {
    self.subscribe_subscriber(subscriber);
    Ok(())
  }
}
