//! Operator construction helpers and the built-in operators.

use std::{fmt::Debug, marker::PhantomData};

pub mod map;
pub use map::{map, map_indexed, map_to, try_map};

use crate::{
  observable::{Observable, Operator},
  subscriber::Subscriber,
};

struct FnOperator<F, In, Out> {
  f: F,
  _p: PhantomData<(In, Out)>,
}

impl<F, In, Out, Err> Operator<Err> for FnOperator<F, In, Out>
where
  F: Fn(Subscriber<Out, Err>, &Observable<In, Err>) -> Result<(), Err>,
{
  type In = In;
  type Out = Out;

  fn call(
    &self, subscriber: Subscriber<Out, Err>, source: &Observable<In, Err>,
  ) -> Result<(), Err> {
    (self.f)(subscriber, source)
  }
}

/// Build a reusable unary observable transform from a subscription-time
/// function.
///
/// Applied to a source, the transform derives a new observable via
/// [`Observable::lift`]; at subscription time `f` receives the downstream
/// subscriber and the source, and wires the two together. A synchronous
/// `Err` return is forwarded to the subscriber's error path. Custom
/// operators typically build an intermediate observer around the downstream
/// subscriber and hand it upstream via [`Subscriber::with_shared`], so the
/// whole chain shares one teardown tree.
///
/// ```rust
/// use std::{cell::RefCell, rc::Rc};
///
/// use rxlite::prelude::*;
///
/// // The simplest possible operator: forward the source untouched.
/// let passthrough = operate(|subscriber: Subscriber<i32, &str>, source: &Observable<i32, &str>| {
///   source.subscribe_subscriber(subscriber);
///   Ok(())
/// });
///
/// let seen = Rc::new(RefCell::new(Vec::new()));
/// let c = seen.clone();
/// Observable::<i32, &str>::from_iter(1..4)
///   .pipe((passthrough,))
///   .subscribe(move |v| c.borrow_mut().push(v));
/// assert_eq!(*seen.borrow(), vec![1, 2, 3]);
/// ```
pub fn operate<In, Out, Err, F>(f: F) -> impl FnOnce(Observable<In, Err>) -> Observable<Out, Err>
where
  In: 'static,
  Out: 'static,
  Err: Debug + 'static,
  F: Fn(Subscriber<Out, Err>, &Observable<In, Err>) -> Result<(), Err> + 'static,
{
  move |source| source.lift(FnOperator { f, _p: PhantomData })
}
