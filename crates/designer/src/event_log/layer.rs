//! Tracing layer that copies events into the [`EventLog`].

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use quarry_reactive::{AuditEntry, Category};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::Context;

use super::EventLog;

/// A [`tracing_subscriber::Layer`] writing WARN+ events to an [`EventLog`].
///
/// While developer mode is on, every event from a `quarry` target is kept
/// as well.
pub struct EventLogLayer {
	log: Arc<EventLog>,
	developer_mode: Arc<AtomicBool>,
}

impl EventLogLayer {
	pub fn new(log: Arc<EventLog>, developer_mode: Arc<AtomicBool>) -> Self {
		Self { log, developer_mode }
	}
}

#[derive(Default)]
struct MessageVisitor {
	message: String,
	fields: Vec<(&'static str, String)>,
}

impl Visit for MessageVisitor {
	fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
		if field.name() == "message" {
			self.message = format!("{value:?}");
		} else {
			self.fields.push((field.name(), format!("{value:?}")));
		}
	}

	fn record_str(&mut self, field: &Field, value: &str) {
		if field.name() == "message" {
			self.message = value.to_string();
		} else {
			self.fields.push((field.name(), value.to_string()));
		}
	}
}

impl<S: Subscriber> tracing_subscriber::Layer<S> for EventLogLayer {
	fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
		let metadata = event.metadata();
		let verbose = self.developer_mode.load(Ordering::Relaxed) && metadata.target().starts_with("quarry");
		if *metadata.level() > Level::WARN && !verbose {
			return;
		}

		let mut visitor = MessageVisitor::default();
		event.record(&mut visitor);
		let message = if visitor.message.is_empty() {
			metadata.name().to_string()
		} else {
			visitor.message
		};

		let mut entry = AuditEntry::new(Category::Internal, format!("[{}] {message}", metadata.level()));
		if !visitor.fields.is_empty() {
			let fields = visitor
				.fields
				.iter()
				.map(|(k, v)| format!("{k}={v}"))
				.collect::<Vec<_>>()
				.join(" ");
			entry = entry.with_detail(format!("{} {fields}", metadata.target()));
		}
		self.log.push(entry);
	}
}
