use std::cell::{Cell, RefCell};
use std::time::{Duration, Instant};

use quarry_reactive::{Debouncer, MessageChannel};
use quarry_tree::{NodeRef, Span};
use tracing::trace;

use crate::parse_model::ParseModel;
use crate::sanitize::sanitize_message;
use crate::selection::{NodeSelectionEvent, NodeSelectionSource, SelectionHandle, SelectionOptions};

/// Source editor.
///
/// Keystrokes are collected by a debouncer and handed to the parse model
/// once typing pauses.
pub struct CodeAreaPanel {
	selection: SelectionHandle,
	parse_model: ParseModel,
	text: RefCell<String>,
	edits: RefCell<Debouncer<String>>,
	highlight: Cell<Option<Span>>,
	caret: Cell<usize>,
}

impl CodeAreaPanel {
	pub const ID: &'static str = "code-area";

	pub fn new(channel: MessageChannel<NodeSelectionEvent>, parse_model: ParseModel, debounce: Duration) -> Self {
		Self {
			selection: SelectionHandle::new(Self::ID, channel),
			text: RefCell::new(parse_model.source_text()),
			parse_model,
			edits: RefCell::new(Debouncer::new(debounce)),
			highlight: Cell::new(None),
			caret: Cell::new(0),
		}
	}

	/// The user changed the text.
	pub fn edit(&self, text: impl Into<String>, now: Instant) {
		let text = text.into();
		*self.text.borrow_mut() = text.clone();
		self.edits.borrow_mut().trigger(text, now);
	}

	/// Replaces the text and reparses without waiting, e.g. on file open.
	pub fn load(&self, text: impl Into<String>) {
		let text = text.into();
		*self.text.borrow_mut() = text.clone();
		// A pending edit belongs to the replaced text.
		let delay = self.edits.borrow().delay();
		*self.edits.borrow_mut() = Debouncer::new(delay);
		self.parse_model.set_source_text(text);
	}

	/// Hands the debounced text to the parse model once typing paused.
	///
	/// Returns true if text was committed.
	pub fn poll(&self, now: Instant) -> bool {
		let Some(text) = self.edits.borrow_mut().poll(now) else {
			return false;
		};
		trace!(len = text.len(), "code_area.commit");
		self.parse_model.set_source_text(text);
		true
	}

	pub fn next_deadline(&self) -> Option<Instant> {
		self.edits.borrow().deadline()
	}

	pub fn text(&self) -> String {
		self.text.borrow().clone()
	}

	/// Byte range of the focused node.
	pub fn highlight(&self) -> Option<Span> {
		self.highlight.get()
	}

	pub fn caret(&self) -> usize {
		self.caret.get()
	}

	/// Sanitized message of the current parse error, shown under the editor.
	pub fn error_message(&self) -> Option<String> {
		self.parse_model
			.parse_error()
			.with(|err| err.as_ref().map(|e| sanitize_message(&e.to_string())))
	}

	/// Widget callback: the caret moved to `offset`. Selects the innermost
	/// node there.
	pub fn select_at_offset(&self, offset: usize) -> Option<NodeRef> {
		self.caret.set(offset);
		let tree = self.parse_model.compilation_unit().get()?;
		let node = NodeRef::new(tree.clone(), tree.node_at_offset(offset)?);
		if !self.selection.user_select(Some(node.clone()), SelectionOptions::empty()) {
			return None;
		}
		self.highlight.set(Some(node.span()));
		Some(node)
	}
}

impl NodeSelectionSource for CodeAreaPanel {
	fn selection(&self) -> &SelectionHandle {
		&self.selection
	}

	fn set_focus_node(&self, node: Option<&NodeRef>, options: SelectionOptions) -> anyhow::Result<()> {
		let span = node.map(NodeRef::span);
		self.highlight.set(span);
		if let Some(span) = span
			&& options.allows_scroll()
		{
			self.caret.set(span.start_byte);
		}
		Ok(())
	}
}
