//! Deadline-based coalescing.
//!
//! Both types here are passive: callers report triggers together with the
//! current instant and later `poll` with a newer instant. A pending trigger
//! is superseded by the next one rather than cancelled.

use std::time::{Duration, Instant};

/// Trailing-edge debouncer.
///
/// Every [`trigger`](Self::trigger) replaces the pending value and pushes
/// the deadline out to `now + delay`, so a burst of triggers closer together
/// than `delay` yields exactly one value: the last one.
#[derive(Debug)]
pub struct Debouncer<T> {
	delay: Duration,
	pending: Option<Pending<T>>,
}

#[derive(Debug)]
struct Pending<T> {
	value: T,
	deadline: Instant,
}

impl<T> Debouncer<T> {
	pub fn new(delay: Duration) -> Self {
		Self { delay, pending: None }
	}

	pub fn delay(&self) -> Duration {
		self.delay
	}

	/// Changes the window used by subsequent triggers.
	pub fn set_delay(&mut self, delay: Duration) {
		self.delay = delay;
	}

	/// Records a trigger at `now`, superseding any pending one.
	pub fn trigger(&mut self, value: T, now: Instant) {
		self.pending = Some(Pending {
			value,
			deadline: now + self.delay,
		});
	}

	/// Takes the pending value if its deadline has passed.
	pub fn poll(&mut self, now: Instant) -> Option<T> {
		if self.pending.as_ref().is_some_and(|p| p.deadline <= now) {
			self.pending.take().map(|p| p.value)
		} else {
			None
		}
	}

	/// Deadline of the pending trigger, if any.
	pub fn deadline(&self) -> Option<Instant> {
		self.pending.as_ref().map(|p| p.deadline)
	}

	pub fn is_pending(&self) -> bool {
		self.pending.is_some()
	}
}

/// Holds back transitions to `None`.
///
/// A `Some` is published immediately. A `None` is only published once it
/// has stood unchallenged for the veto window; a `Some` arriving inside the
/// window vetoes it.
#[derive(Debug)]
pub struct NullVeto {
	window: Duration,
	pending_since: Option<Instant>,
}

/// What the owner of a [`NullVeto`] should publish after an offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VetoDecision {
	/// Publish the offered value now.
	Publish,
	/// Keep the current value; a `None` is pending.
	Hold,
}

impl NullVeto {
	pub fn new(window: Duration) -> Self {
		Self {
			window,
			pending_since: None,
		}
	}

	pub fn window(&self) -> Duration {
		self.window
	}

	/// Reports a new upstream value at `now`.
	pub fn offer<T>(&mut self, value: Option<&T>, now: Instant) -> VetoDecision {
		match value {
			Some(_) => {
				self.pending_since = None;
				VetoDecision::Publish
			}
			None if self.window.is_zero() => VetoDecision::Publish,
			None => {
				// The window runs from the first null of a streak.
				self.pending_since.get_or_insert(now);
				VetoDecision::Hold
			}
		}
	}

	/// Returns true once a held `None` should be published.
	pub fn poll(&mut self, now: Instant) -> bool {
		match self.pending_since {
			Some(since) if since + self.window <= now => {
				self.pending_since = None;
				true
			}
			_ => false,
		}
	}

	pub fn deadline(&self) -> Option<Instant> {
		self.pending_since.map(|since| since + self.window)
	}
}
