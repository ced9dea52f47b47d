//! Observable value holder.
//!
//! A [`Var`] notifies subscribers only when a `set` actually changes the
//! value. Notification is run-to-completion: a `set` issued from inside a
//! subscriber callback does not start a nested round. The running round is
//! abandoned instead and restarted with the newest value, so no subscriber is
//! left holding a value that was already superseded.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

type Callback<T> = Rc<dyn Fn(&T)>;

struct Inner<T> {
	value: RefCell<T>,
	subscribers: RefCell<Vec<(u64, Callback<T>)>>,
	next_id: Cell<u64>,
	notifying: Cell<bool>,
	dirty: Cell<bool>,
	/// Keeps upstream subscriptions of derived vars alive.
	upstream: RefCell<Vec<Subscription>>,
}

/// Shared, observable value.
///
/// Clones are handles to the same value.
pub struct Var<T> {
	inner: Rc<Inner<T>>,
}

impl<T> Clone for Var<T> {
	fn clone(&self) -> Self {
		Self {
			inner: Rc::clone(&self.inner),
		}
	}
}

impl<T: fmt::Debug> fmt::Debug for Var<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Var").field(&*self.inner.value.borrow()).finish()
	}
}

impl<T: Default + Clone + PartialEq + 'static> Default for Var<T> {
	fn default() -> Self {
		Self::new(T::default())
	}
}

impl<T: Clone + PartialEq + 'static> Var<T> {
	pub fn new(value: T) -> Self {
		Self {
			inner: Rc::new(Inner {
				value: RefCell::new(value),
				subscribers: RefCell::new(Vec::new()),
				next_id: Cell::new(0),
				notifying: Cell::new(false),
				dirty: Cell::new(false),
				upstream: RefCell::new(Vec::new()),
			}),
		}
	}

	/// Returns a clone of the current value.
	pub fn get(&self) -> T {
		self.inner.value.borrow().clone()
	}

	/// Runs `f` against the current value without cloning it.
	pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
		f(&self.inner.value.borrow())
	}

	/// Stores `value` and notifies subscribers if it differs from the current one.
	///
	/// Returns true if the value changed.
	pub fn set(&self, value: T) -> bool {
		{
			let mut current = self.inner.value.borrow_mut();
			if *current == value {
				return false;
			}
			*current = value;
		}
		self.notify();
		true
	}

	/// Registers `f` to run after every change.
	pub fn subscribe(&self, f: impl Fn(&T) + 'static) -> Subscription {
		let id = self.inner.next_id.get();
		self.inner.next_id.set(id + 1);
		self.inner.subscribers.borrow_mut().push((id, Rc::new(f)));

		let weak: Weak<Inner<T>> = Rc::downgrade(&self.inner);
		Subscription::new(move || {
			if let Some(inner) = weak.upgrade() {
				inner.subscribers.borrow_mut().retain(|(sub, _)| *sub != id);
			}
		})
	}

	/// Like [`Var::subscribe`], but also runs `f` once with the current value.
	pub fn observe(&self, f: impl Fn(&T) + 'static) -> Subscription {
		let current = self.get();
		f(&current);
		self.subscribe(f)
	}

	/// Derives a var that tracks `f(self)`.
	///
	/// The derived value is cached, so downstream subscribers only hear about
	/// upstream changes that change the mapped value.
	pub fn map<U: Clone + PartialEq + 'static>(&self, f: impl Fn(&T) -> U + 'static) -> Var<U> {
		let derived = Var::new(self.with(|v| f(v)));
		let weak = Rc::downgrade(&derived.inner);
		let sub = self.subscribe(move |v| {
			if let Some(inner) = weak.upgrade() {
				Var { inner }.set(f(v));
			}
		});
		derived.inner.upstream.borrow_mut().push(sub);
		derived
	}

	/// Returns the number of live subscribers.
	pub fn subscriber_count(&self) -> usize {
		self.inner.subscribers.borrow().len()
	}

	fn notify(&self) {
		if self.inner.notifying.replace(true) {
			self.inner.dirty.set(true);
			return;
		}
		let _round = NotifyRound(&self.inner.notifying);

		loop {
			self.inner.dirty.set(false);
			let snapshot = self.get();
			let subscribers: Vec<Callback<T>> = self.inner.subscribers.borrow().iter().map(|(_, cb)| Rc::clone(cb)).collect();
			for cb in subscribers {
				cb(&snapshot);
				if self.inner.dirty.get() {
					break;
				}
			}
			if !self.inner.dirty.get() {
				break;
			}
		}
	}
}

/// Clears the notifying flag even if a subscriber panics.
struct NotifyRound<'a>(&'a Cell<bool>);

impl Drop for NotifyRound<'_> {
	fn drop(&mut self) {
		self.0.set(false);
	}
}

/// Handle to a registered callback; unsubscribes when dropped.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
	cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
	pub fn new(cancel: impl FnOnce() + 'static) -> Self {
		Self {
			cancel: Some(Box::new(cancel)),
		}
	}

	/// A subscription that owns nothing.
	pub fn empty() -> Self {
		Self { cancel: None }
	}

	/// Unsubscribes now.
	pub fn unsubscribe(mut self) {
		if let Some(cancel) = self.cancel.take() {
			cancel();
		}
	}

	/// Keeps the callback registered for the lifetime of its source.
	pub fn detach(mut self) {
		self.cancel = None;
	}
}

impl fmt::Debug for Subscription {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Subscription").field("active", &self.cancel.is_some()).finish()
	}
}

impl Drop for Subscription {
	fn drop(&mut self) {
		if let Some(cancel) = self.cancel.take() {
			cancel();
		}
	}
}

#[cfg(test)]
mod tests;
