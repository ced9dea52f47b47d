//! Audit collaborator.
//!
//! The channel and the parse model report noteworthy events to an
//! [`AuditSink`]. Recording is fire-and-forget: sinks must not fail or block.

use std::fmt;

/// Category of an audit entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
	/// The source could not be parsed.
	ParseException,
	/// A parse succeeded; earlier parse exceptions are stale.
	ParseOk,
	/// An optional post-parse pass failed.
	PostParsePass,
	/// Query evaluation failed.
	QueryEvaluation,
	/// Query evaluation succeeded; earlier evaluation failures are stale.
	QueryOk,
	/// A selection event travelled over the selection channel.
	SelectionEvent,
	/// A message travelled over some other channel.
	ChannelMessage,
	/// Anything else worth keeping for developers.
	Internal,
}

impl Category {
	pub fn label(self) -> &'static str {
		match self {
			Self::ParseException => "parse-exception",
			Self::ParseOk => "parse-ok",
			Self::PostParsePass => "post-parse-pass",
			Self::QueryEvaluation => "query-evaluation",
			Self::QueryOk => "query-ok",
			Self::SelectionEvent => "selection-event",
			Self::ChannelMessage => "channel-message",
			Self::Internal => "internal",
		}
	}

	/// Returns the failure category a success of this category resolves.
	pub fn resolves(self) -> Option<Category> {
		match self {
			Self::ParseOk => Some(Self::ParseException),
			Self::QueryOk => Some(Self::QueryEvaluation),
			_ => None,
		}
	}
}

impl fmt::Display for Category {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.label())
	}
}

/// A single audit record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
	pub category: Category,
	/// Short, human-readable message.
	pub message: String,
	/// Full detail (error chain, payload dump), shown in developer mode only.
	pub detail: Option<String>,
}

impl AuditEntry {
	pub fn new(category: Category, message: impl Into<String>) -> Self {
		Self {
			category,
			message: message.into(),
			detail: None,
		}
	}

	pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
		self.detail = Some(detail.into());
		self
	}
}

/// Receiver of audit entries.
pub trait AuditSink {
	fn record(&self, entry: AuditEntry);
}

/// Sink that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAuditSink;

impl AuditSink for NullAuditSink {
	fn record(&self, _entry: AuditEntry) {}
}
