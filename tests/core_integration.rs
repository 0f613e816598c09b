//! Cross-module behavior: operator chains over subjects, teardown cascades
//! through pipes, and error aggregation observed end to end.

use std::{cell::RefCell, rc::Rc};

use rxlite::prelude::*;

#[test_log::test]
fn pipe_unsubscribe_cascades_upstream_exactly_once() {
  let teardowns = Rc::new(RefCell::new(0));
  let t = teardowns.clone();

  let source = Observable::<i32, &str>::new(move |subscriber| {
    let t = t.clone();
    subscriber.add(Teardown::callback(move || *t.borrow_mut() += 1));
    subscriber.next(1);
    subscriber.next(2);
    Ok(())
  });

  let seen = Rc::new(RefCell::new(Vec::new()));
  let c = seen.clone();
  let handle = source
    .pipe((map(|v: i32| v * 10), map(|v: i32| v + 1)))
    .subscribe(move |v| c.borrow_mut().push(v));

  assert_eq!(*seen.borrow(), vec![11, 21]);
  assert_eq!(*teardowns.borrow(), 0);

  handle.unsubscribe().unwrap();
  assert_eq!(*teardowns.borrow(), 1);
  // Idempotent across the whole chain.
  handle.unsubscribe().unwrap();
  assert_eq!(*teardowns.borrow(), 1);
}

#[test_log::test]
fn subject_composes_through_pipe() {
  let subject: Subject<i32, &str> = Subject::new();
  let seen = Rc::new(RefCell::new(Vec::new()));
  let c = seen.clone();

  let handle = subject
    .as_observable()
    .pipe((map(|v: i32| v * 2),))
    .subscribe(move |v| c.borrow_mut().push(v));
  assert_eq!(subject.observer_count(), 1);

  subject.next(1).unwrap();
  subject.next(2).unwrap();
  assert_eq!(*seen.borrow(), vec![2, 4]);

  // Cancelling the downstream handle removes the chain from the subject.
  handle.unsubscribe().unwrap();
  assert_eq!(subject.observer_count(), 0);
  subject.next(3).unwrap();
  assert_eq!(*seen.borrow(), vec![2, 4]);
}

#[test_log::test]
fn subject_error_terminates_piped_chain() {
  let subject: Subject<i32, &str> = Subject::new();
  let values = Rc::new(RefCell::new(Vec::new()));
  let errors = Rc::new(RefCell::new(Vec::new()));
  let v = values.clone();
  let e = errors.clone();

  subject.as_observable().map(|n| n + 1).subscribe_with(
    ObserverFns::new()
      .on_next(move |n| v.borrow_mut().push(n))
      .on_error(move |err: &str| e.borrow_mut().push(err)),
  );

  subject.next(1).unwrap();
  subject.error("upstream died").unwrap();
  assert_eq!(subject.next(2), Err(ClosedError));

  assert_eq!(*values.borrow(), vec![2]);
  assert_eq!(*errors.borrow(), vec!["upstream died"]);
}

#[test_log::test]
fn subject_subscribed_to_observable_rebroadcasts() {
  let subject: Subject<i32, &str> = Subject::new();
  let first = Rc::new(RefCell::new(Vec::new()));
  let second = Rc::new(RefCell::new(Vec::new()));
  let f = first.clone();
  let s = second.clone();
  subject.subscribe(move |v| f.borrow_mut().push(v));
  subject.subscribe(move |v| s.borrow_mut().push(v));

  Observable::<i32, &str>::from_iter(1..4).subscribe_observer(subject.clone());

  assert_eq!(*first.borrow(), vec![1, 2, 3]);
  assert_eq!(*second.borrow(), vec![1, 2, 3]);
  // from_iter completed, which completed the subject.
  assert!(subject.is_stopped());
  assert_eq!(subject.observer_count(), 0);
}

#[test_log::test]
fn failing_teardowns_aggregate_through_terminal_notification() {
  let reporter = CollectReporter::new();
  let config = Config::new().with_reporter(reporter.clone());

  let source = Observable::<i32, &str>::new(|subscriber| {
    subscriber.add(Teardown::fallible(|| Err("socket close failed".into())));
    subscriber.add(Teardown::fallible(|| Err("buffer flush failed".into())));
    subscriber.next(1);
    subscriber.complete();
    Ok(())
  });

  source.subscribe_with_config(ObserverFns::new(), config);

  // Terminal teardown has no caller to return to; both failures reach the
  // reporter as one aggregate, in registration order.
  let collected = reporter.take();
  assert_eq!(collected.len(), 1);
  let aggregate = collected[0]
    .downcast_ref::<UnsubscribeError>()
    .expect("aggregate error");
  let rendered: Vec<String> = aggregate.errors().iter().map(|e| e.to_string()).collect();
  assert_eq!(rendered, vec!["socket close failed", "buffer flush failed"]);
}

#[test_log::test]
fn failing_teardowns_aggregate_through_explicit_unsubscribe() {
  let source = Observable::<i32, &str>::new(|subscriber| {
    subscriber.add(Teardown::fallible(|| Err("first".into())));
    subscriber.add(Teardown::fallible(|| Err("second".into())));
    subscriber.next(1);
    Ok(())
  });

  let handle = source.subscribe(|_| {});
  let err = handle.unsubscribe().unwrap_err();
  let rendered: Vec<String> = err.errors().iter().map(|e| e.to_string()).collect();
  assert_eq!(rendered, vec!["first", "second"]);
  // Second pass is a no-op.
  assert!(handle.unsubscribe().is_ok());
}

#[test_log::test]
fn unhandled_error_reaches_hook_through_a_chain() {
  let unhandled = Rc::new(RefCell::new(Vec::new()));
  let u = unhandled.clone();
  let config = Config::new().with_unhandled_error(move |err| u.borrow_mut().push(err.to_string()));

  // No error callback anywhere downstream.
  Observable::<i32, &str>::throw("nobody caught this")
    .map(|v| v + 1)
    .subscribe_with_config(ObserverFns::new().on_next(|_| {}), config);

  let seen = unhandled.borrow();
  assert_eq!(seen.len(), 1);
  assert!(seen[0].contains("nobody caught this"));
}

#[test_log::test]
fn stopped_notifications_surface_late_subject_traffic() {
  let notices = Rc::new(RefCell::new(Vec::new()));
  let n = notices.clone();
  let config =
    Config::new().with_stopped_notification(move |notice| n.borrow_mut().push(notice.kind()));

  let source = Observable::<i32, &str>::new(|subscriber| {
    subscriber.next(1);
    subscriber.complete();
    // Late traffic from a sloppy producer.
    subscriber.next(2);
    Ok(())
  });
  source.subscribe_with_config(ObserverFns::new().on_next(|_| {}), config);

  assert_eq!(*notices.borrow(), vec![NoticeKind::Next]);
}
