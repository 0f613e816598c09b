//! The `map` operator family: project each value before forwarding.

use std::{fmt::Debug, marker::PhantomData};

use crate::{
  observable::{Observable, Operator},
  observer::Observer,
  subscriber::Subscriber,
};

pub struct MapOp<F, In, Out> {
  project: F,
  _p: PhantomData<(In, Out)>,
}

/// Intermediate observer: applies the projection, counts values, forwards.
struct MapObserver<F, Out, Err> {
  destination: Subscriber<Out, Err>,
  project: F,
  index: usize,
}

impl<F, In, Out, Err> Observer<In, Err> for MapObserver<F, Out, Err>
where
  F: FnMut(In, usize) -> Out,
  Out: 'static,
  Err: Debug + 'static,
{
  fn next(&mut self, value: In) {
    let index = self.index;
    self.index += 1;
    let mapped = (self.project)(value, index);
    self.destination.next(mapped);
  }

  fn error(&mut self, err: Err) { self.destination.error(err); }

  fn complete(&mut self) { self.destination.complete(); }
}

impl<F, In, Out, Err> Operator<Err> for MapOp<F, In, Out>
where
  F: FnMut(In, usize) -> Out + Clone + 'static,
  In: 'static,
  Out: 'static,
  Err: Debug + 'static,
{
  type In = In;
  type Out = Out;

  fn call(
    &self, subscriber: Subscriber<Out, Err>, source: &Observable<In, Err>,
  ) -> Result<(), Err> {
    let observer = MapObserver {
      destination: subscriber.clone(),
      project: self.project.clone(),
      index: 0,
    };
    let upstream =
      Subscriber::with_shared(subscriber.subscription(), subscriber.config(), observer);
    source.subscribe_subscriber(upstream);
    Ok(())
  }
}

/// Fallible projection: the first `Err` terminates the stream through the
/// subscriber's error path.
pub struct TryMapOp<F, In, Out> {
  project: F,
  _p: PhantomData<(In, Out)>,
}

struct TryMapObserver<F, Out, Err> {
  destination: Subscriber<Out, Err>,
  project: F,
  index: usize,
}

impl<F, In, Out, Err> Observer<In, Err> for TryMapObserver<F, Out, Err>
where
  F: FnMut(In, usize) -> Result<Out, Err>,
  Out: 'static,
  Err: Debug + 'static,
{
  fn next(&mut self, value: In) {
    let index = self.index;
    self.index += 1;
    match (self.project)(value, index) {
      Ok(mapped) => self.destination.next(mapped),
      Err(err) => self.destination.error(err),
    }
  }

  fn error(&mut self, err: Err) { self.destination.error(err); }

  fn complete(&mut self) { self.destination.complete(); }
}

impl<F, In, Out, Err> Operator<Err> for TryMapOp<F, In, Out>
where
  F: FnMut(In, usize) -> Result<Out, Err> + Clone + 'static,
  In: 'static,
  Out: 'static,
  Err: Debug + 'static,
{
  type In = In;
  type Out = Out;

  fn call(
    &self, subscriber: Subscriber<Out, Err>, source: &Observable<In, Err>,
  ) -> Result<(), Err> {
    let observer = TryMapObserver {
      destination: subscriber.clone(),
      project: self.project.clone(),
      index: 0,
    };
    let upstream =
      Subscriber::with_shared(subscriber.subscription(), subscriber.config(), observer);
    source.subscribe_subscriber(upstream);
    Ok(())
  }
}

impl<Item: 'static, Err: Debug + 'static> Observable<Item, Err> {
  /// Derive a stream that applies `project` to every value.
  ///
  /// ```rust
  /// use std::{cell::RefCell, rc::Rc};
  ///
  /// use rxlite::prelude::*;
  ///
  /// let seen = Rc::new(RefCell::new(Vec::new()));
  /// let c = seen.clone();
  /// Observable::<i32, &str>::from_iter(1..4)
  ///   .map(|v| v * 10)
  ///   .subscribe(move |v| c.borrow_mut().push(v));
  /// assert_eq!(*seen.borrow(), vec![10, 20, 30]);
  /// ```
  pub fn map<Out, F>(&self, mut project: F) -> Observable<Out, Err>
  where
    Out: 'static,
    F: FnMut(Item) -> Out + Clone + 'static,
  {
    self.lift(MapOp { project: move |v, _| project(v), _p: PhantomData })
  }

  /// Like [`map`](Observable::map), but the projection also receives the
  /// zero-based index of the value within the subscription.
  pub fn map_indexed<Out, F>(&self, project: F) -> Observable<Out, Err>
  where
    Out: 'static,
    F: FnMut(Item, usize) -> Out + Clone + 'static,
  {
    self.lift(MapOp { project, _p: PhantomData })
  }

  /// Fallible projection: an `Err` from `project` terminates the stream via
  /// the error path; no further values are delivered downstream.
  pub fn try_map<Out, F>(&self, mut project: F) -> Observable<Out, Err>
  where
    Out: 'static,
    F: FnMut(Item) -> Result<Out, Err> + Clone + 'static,
  {
    self.lift(TryMapOp { project: move |v, _| project(v), _p: PhantomData })
  }

  /// Replace every value with `value`.
  pub fn map_to<Out>(&self, value: Out) -> Observable<Out, Err>
  where
    Out: Clone + 'static,
  {
    self.map(move |_| value.clone())
  }
}

/// Unary-transform form of [`Observable::map`] for use with `pipe`.
pub fn map<In, Out, Err, F>(project: F) -> impl FnOnce(Observable<In, Err>) -> Observable<Out, Err>
where
  In: 'static,
  Out: 'static,
  Err: Debug + 'static,
  F: FnMut(In) -> Out + Clone + 'static,
{
  move |source| source.map(project)
}

/// Unary-transform form of [`Observable::map_indexed`].
pub fn map_indexed<In, Out, Err, F>(
  project: F,
) -> impl FnOnce(Observable<In, Err>) -> Observable<Out, Err>
where
  In: 'static,
  Out: 'static,
  Err: Debug + 'static,
  F: FnMut(In, usize) -> Out + Clone + 'static,
{
  move |source| source.map_indexed(project)
}

/// Unary-transform form of [`Observable::try_map`].
pub fn try_map<In, Out, Err, F>(
  project: F,
) -> impl FnOnce(Observable<In, Err>) -> Observable<Out, Err>
where
  In: 'static,
  Out: 'static,
  Err: Debug + 'static,
  F: FnMut(In) -> Result<Out, Err> + Clone + 'static,
{
  move |source| source.try_map(project)
}

/// Unary-transform form of [`Observable::map_to`].
pub fn map_to<In, Out, Err>(value: Out) -> impl FnOnce(Observable<In, Err>) -> Observable<Out, Err>
where
  In: 'static,
  Out: Clone + 'static,
  Err: Debug + 'static,
{
  move |source| source.map_to(value)
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use super::*;
  use crate::observer::ObserverFns;

  fn seen<T>() -> (Rc<RefCell<Vec<T>>>, Rc<RefCell<Vec<T>>>) {
    let cell = Rc::new(RefCell::new(Vec::new()));
    (cell.clone(), cell)
  }

  #[test]
  fn preserves_order_and_count() {
    let (seen, c) = seen();
    Observable::<i32, &str>::from_iter(0..5)
      .map(|v| v * v)
      .subscribe(move |v| c.borrow_mut().push(v));
    assert_eq!(*seen.borrow(), vec![0, 1, 4, 9, 16]);
  }

  #[test]
  fn index_is_zero_based_per_subscription() {
    let source = Observable::<&str, &str>::from_iter(vec!["a", "b", "c"]);
    let mapped = source.map_indexed(|v, i| format!("{i}:{v}"));

    for _ in 0..2 {
      let (seen, c) = seen();
      mapped.subscribe(move |v| c.borrow_mut().push(v));
      assert_eq!(*seen.borrow(), vec!["0:a", "1:b", "2:c"]);
    }
  }

  #[test]
  fn failing_projection_cuts_the_stream() {
    let (values, v) = seen();
    let errors = Rc::new(RefCell::new(Vec::new()));
    let e = errors.clone();

    Observable::<i32, String>::from_iter(0..10)
      .try_map(|n| {
        if n == 3 { Err(format!("choked on {n}")) } else { Ok(n * 2) }
      })
      .subscribe_with(
        ObserverFns::new()
          .on_next(move |n| v.borrow_mut().push(n))
          .on_error(move |err: String| e.borrow_mut().push(err)),
      );

    // Exactly the values before the failure, then one error, then silence.
    assert_eq!(*values.borrow(), vec![0, 2, 4]);
    assert_eq!(*errors.borrow(), vec!["choked on 3"]);
  }

  #[test]
  fn upstream_error_passes_through() {
    let errors = Rc::new(RefCell::new(Vec::new()));
    let e = errors.clone();
    Observable::<i32, &str>::throw("root failure")
      .map(|v| v + 1)
      .subscribe_with(ObserverFns::new().on_error(move |err: &str| e.borrow_mut().push(err)));
    assert_eq!(*errors.borrow(), vec!["root failure"]);
  }

  #[test]
  fn map_to_replaces_every_value() {
    let (seen, c) = seen();
    Observable::<i32, &str>::from_iter(0..3)
      .map_to("x")
      .subscribe(move |v| c.borrow_mut().push(v));
    assert_eq!(*seen.borrow(), vec!["x", "x", "x"]);
  }

  #[test]
  fn pipe_forms_compose() {
    let (seen, c) = seen();
    Observable::<i32, &str>::from_iter(1..4)
      .pipe((map(|v: i32| v * 2), map(|v: i32| v + 1)))
      .subscribe(move |v| c.borrow_mut().push(v));
    assert_eq!(*seen.borrow(), vec![3, 5, 7]);
  }
}
