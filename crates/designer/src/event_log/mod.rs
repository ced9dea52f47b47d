//! Bounded audit log shown in the event log panel.
//!
//! Entries come from two places: components that report to an
//! [`AuditSink`] (parse results, evaluation results, channel traffic in
//! developer mode) and [`EventLogLayer`], which copies warnings from the
//! tracing pipeline.
//!
//! A success entry retroactively resolves the failures it makes stale: a
//! `ParseOk` resolves every earlier `ParseException`, a `QueryOk` every
//! earlier `QueryEvaluation`. Resolved entries are kept but hidden from
//! [`EventLog::visible_entries`].

mod layer;

use std::collections::VecDeque;
use std::time::SystemTime;

use parking_lot::Mutex;
use quarry_reactive::{AuditEntry, AuditSink, Category};

pub use self::layer::EventLogLayer;

/// Maximum number of entries retained.
pub const MAX_LOG_ENTRIES: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
	pub category: Category,
	pub message: String,
	/// Full detail, shown on demand.
	pub detail: Option<String>,
	pub at: SystemTime,
	/// Set once a later success made this failure stale.
	pub resolved: bool,
}

/// Thread-safe ring buffer of [`LogEntry`]s.
pub struct EventLog {
	entries: Mutex<VecDeque<LogEntry>>,
	capacity: usize,
}

impl EventLog {
	pub fn new() -> Self {
		Self::with_capacity(MAX_LOG_ENTRIES)
	}

	pub fn with_capacity(capacity: usize) -> Self {
		Self {
			entries: Mutex::new(VecDeque::with_capacity(capacity.min(MAX_LOG_ENTRIES))),
			capacity: capacity.max(1),
		}
	}

	pub fn push(&self, entry: AuditEntry) {
		let mut entries = self.entries.lock();
		if let Some(stale) = entry.category.resolves() {
			for old in entries.iter_mut().filter(|e| e.category == stale) {
				old.resolved = true;
			}
		}
		if entries.len() >= self.capacity {
			entries.pop_front();
		}
		entries.push_back(LogEntry {
			category: entry.category,
			message: entry.message,
			detail: entry.detail,
			at: SystemTime::now(),
			resolved: false,
		});
	}

	/// All retained entries, oldest first.
	pub fn entries(&self) -> Vec<LogEntry> {
		self.entries.lock().iter().cloned().collect()
	}

	/// Entries that are not resolved, oldest first.
	pub fn visible_entries(&self) -> Vec<LogEntry> {
		self.entries.lock().iter().filter(|e| !e.resolved).cloned().collect()
	}

	/// Number of unresolved entries of `category`.
	pub fn unresolved(&self, category: Category) -> usize {
		self.entries
			.lock()
			.iter()
			.filter(|e| e.category == category && !e.resolved)
			.count()
	}

	pub fn len(&self) -> usize {
		self.entries.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.lock().is_empty()
	}

	pub fn clear(&self) {
		self.entries.lock().clear();
	}
}

impl Default for EventLog {
	fn default() -> Self {
		Self::new()
	}
}

impl AuditSink for EventLog {
	fn record(&self, entry: AuditEntry) {
		self.push(entry);
	}
}
