use std::cell::RefCell;
use std::rc::Rc;

use pretty_assertions::assert_eq;

use super::*;

fn recorder<T: Clone + 'static>() -> (Rc<RefCell<Vec<T>>>, impl Fn(&T) + 'static) {
	let seen = Rc::new(RefCell::new(Vec::new()));
	let sink = Rc::clone(&seen);
	(seen, move |v: &T| sink.borrow_mut().push(v.clone()))
}

#[test]
fn set_notifies_only_on_change() {
	let var = Var::new(1);
	let (seen, cb) = recorder();
	let _sub = var.subscribe(cb);

	assert!(!var.set(1));
	assert!(var.set(2));
	assert!(var.set(3));
	assert!(!var.set(3));

	assert_eq!(*seen.borrow(), vec![2, 3]);
}

#[test]
fn dropping_subscription_unsubscribes() {
	let var = Var::new(String::new());
	let (seen, cb) = recorder();
	let sub = var.subscribe(cb);
	var.set("a".into());
	drop(sub);
	var.set("b".into());

	assert_eq!(*seen.borrow(), vec!["a".to_string()]);
	assert_eq!(var.subscriber_count(), 0);
}

#[test]
fn detached_subscription_stays_registered() {
	let var = Var::new(0);
	let (seen, cb) = recorder();
	var.subscribe(cb).detach();
	var.set(7);
	assert_eq!(*seen.borrow(), vec![7]);
}

#[test]
fn observe_runs_immediately() {
	let var = Var::new(5);
	let (seen, cb) = recorder();
	let _sub = var.observe(cb);
	var.set(6);
	assert_eq!(*seen.borrow(), vec![5, 6]);
}

#[test]
fn map_caches_derived_value() {
	let var = Var::new(10);
	let parity = var.map(|v| v % 2 == 0);
	let (seen, cb) = recorder();
	let _sub = parity.subscribe(cb);

	var.set(12);
	var.set(13);
	var.set(15);
	var.set(16);

	assert_eq!(*seen.borrow(), vec![false, true]);
	assert!(parity.get());
}

#[test]
fn reentrant_set_restarts_round_with_latest_value() {
	let var = Var::new(0);
	let writer = var.clone();
	let _clamp = var.subscribe(move |v| {
		if *v > 10 {
			writer.set(10);
		}
	});
	let (seen, cb) = recorder();
	let _sub = var.subscribe(cb);

	var.set(42);

	// The second subscriber never observes the superseded 42.
	assert_eq!(*seen.borrow(), vec![10]);
	assert_eq!(var.get(), 10);
}

#[test]
fn subscriber_may_unsubscribe_during_notification() {
	let var = Var::new(0);
	let slot: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
	let inner_slot = Rc::clone(&slot);
	let sub = var.subscribe(move |_| {
		inner_slot.borrow_mut().take();
	});
	*slot.borrow_mut() = Some(sub);

	var.set(1);
	var.set(2);
	assert_eq!(var.subscriber_count(), 0);
}
