//! Suspension of an outbound event path.
//!
//! A panel that programmatically changes its own widget in response to an
//! inbound selection holds a [`SuspendGuard`] for the duration of the
//! update, so the widget's change callback does not re-publish the event.

use std::cell::Cell;
use std::rc::Rc;

/// Nesting counter shared by a panel and its guards.
#[derive(Debug, Clone, Default)]
pub struct SuspendFlag {
	depth: Rc<Cell<usize>>,
}

impl SuspendFlag {
	pub fn new() -> Self {
		Self::default()
	}

	/// Suspends until the returned guard is dropped. Guards nest.
	pub fn suspend(&self) -> SuspendGuard {
		self.depth.set(self.depth.get() + 1);
		SuspendGuard {
			depth: Rc::clone(&self.depth),
		}
	}

	/// Returns true while at least one guard is alive.
	pub fn is_suspended(&self) -> bool {
		self.depth.get() > 0
	}
}

/// Guard returned by [`SuspendFlag::suspend`].
#[derive(Debug)]
pub struct SuspendGuard {
	depth: Rc<Cell<usize>>,
}

impl Drop for SuspendGuard {
	fn drop(&mut self) {
		let prev = self.depth.get();
		debug_assert!(prev > 0, "suspend depth underflow");
		self.depth.set(prev.saturating_sub(1));
	}
}
