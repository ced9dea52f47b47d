//! Time sources.
//!
//! Debounce windows are measured against a [`Clock`] instead of
//! [`Instant::now`] so headless drivers and tests can step time explicitly.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Source of the current instant.
pub trait Clock {
	fn now(&self) -> Instant;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
	fn now(&self) -> Instant {
		Instant::now()
	}
}

/// Clock that only advances when told to.
///
/// Clones share the same instant, so a test can hand one clone to the
/// designer and keep another to step time.
#[derive(Debug, Clone)]
pub struct ManualClock {
	now: Rc<Cell<Instant>>,
}

impl ManualClock {
	pub fn new() -> Self {
		Self {
			now: Rc::new(Cell::new(Instant::now())),
		}
	}

	/// Moves the clock forward by `by`.
	pub fn advance(&self, by: Duration) {
		self.now.set(self.now.get() + by);
	}

	/// Moves the clock to `to` if it lies in the future.
	pub fn advance_to(&self, to: Instant) {
		if to > self.now.get() {
			self.now.set(to);
		}
	}
}

impl Default for ManualClock {
	fn default() -> Self {
		Self::new()
	}
}

impl Clock for ManualClock {
	fn now(&self) -> Instant {
		self.now.get()
	}
}
