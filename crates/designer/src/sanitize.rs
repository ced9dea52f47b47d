//! Human-facing error messages.
//!
//! Collaborator errors often arrive wrapped in type-name prefixes
//! (`quarry::QueryError: ...`, `org.example.ParseException: ...`). Panels show
//! the root message without them; the full chain goes to the event log.

use std::error::Error;
use std::sync::LazyLock;

use regex::Regex;

/// A leading qualified type name ending in `Exception` or `Error`, and its colon.
static TYPE_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^\s*(?:[A-Za-z_$][\w$]*(?:\.|::))*[A-Za-z_$]*(?:Exception|Error)\s*:\s*")
		.expect("valid type prefix pattern")
});

/// Strips every leading error type prefix from `message` and trims it.
pub fn sanitize_message(message: &str) -> String {
	let mut rest = message.trim();
	while let Some(m) = TYPE_PREFIX.find(rest) {
		if m.end() == 0 {
			break;
		}
		rest = &rest[m.end()..];
	}
	rest.trim().to_string()
}

/// Sanitized message of the innermost cause of `err`.
pub fn sanitize_error(err: &(dyn Error + 'static)) -> String {
	let mut root = err;
	while let Some(source) = root.source() {
		root = source;
	}
	sanitize_message(&root.to_string())
}

/// Full cause chain of `err`, outermost first, one cause per line.
pub fn error_chain(err: &(dyn Error + 'static)) -> String {
	let mut out = err.to_string();
	let mut current = err.source();
	while let Some(cause) = current {
		out.push_str("\ncaused by: ");
		out.push_str(&cause.to_string());
		current = cause.source();
	}
	out
}
