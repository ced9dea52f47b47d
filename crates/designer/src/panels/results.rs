use std::cell::{Cell, RefCell};

use quarry_reactive::MessageChannel;
use quarry_tree::NodeRef;

use crate::query::EvaluationResult;
use crate::selection::{NodeSelectionEvent, NodeSelectionSource, SelectionHandle, SelectionOptions};

/// List of the nodes matched by the current query.
pub struct ResultListPanel {
	selection: SelectionHandle,
	result: RefCell<EvaluationResult>,
	selected_row: Cell<Option<usize>>,
}

impl ResultListPanel {
	pub const ID: &'static str = "results";

	pub fn new(channel: MessageChannel<NodeSelectionEvent>) -> Self {
		Self {
			selection: SelectionHandle::new(Self::ID, channel),
			result: RefCell::new(EvaluationResult::default()),
			selected_row: Cell::new(None),
		}
	}

	/// Replaces the displayed result.
	pub fn show(&self, result: &EvaluationResult) {
		*self.result.borrow_mut() = result.clone();
		let focused = self.selection.focused();
		self.selected_row.set(focused.and_then(|node| self.row_of(&node)));
	}

	pub fn result(&self) -> EvaluationResult {
		self.result.borrow().clone()
	}

	/// Matched nodes in document order. Empty for anything but a success.
	pub fn rows(&self) -> Vec<NodeRef> {
		self.result.borrow().nodes().to_vec()
	}

	/// Sanitized evaluation error.
	pub fn error(&self) -> Option<String> {
		self.result.borrow().error().map(|e| e.message.clone())
	}

	/// Property the failing expression refers to, offered for definition.
	pub fn missing_property(&self) -> Option<String> {
		self.result.borrow().error().and_then(|e| e.missing_property.clone())
	}

	/// One-line summary for the panel header.
	pub fn status(&self) -> String {
		match &*self.result.borrow() {
			EvaluationResult::NoCompilationUnit => "No compilation unit".to_string(),
			EvaluationResult::NoQuery => "No query".to_string(),
			EvaluationResult::Success(nodes) if nodes.len() == 1 => "1 match".to_string(),
			EvaluationResult::Success(nodes) => format!("{} matches", nodes.len()),
			EvaluationResult::Error(_) => "Error".to_string(),
		}
	}

	pub fn selected_row(&self) -> Option<usize> {
		self.selected_row.get()
	}

	/// Widget callback: the user clicked row `row`.
	pub fn select_row(&self, row: usize) -> bool {
		let Some(node) = self.result.borrow().nodes().get(row).cloned() else {
			return false;
		};
		if !self.selection.user_select(Some(node), SelectionOptions::empty()) {
			return false;
		}
		self.selected_row.set(Some(row));
		true
	}

	fn row_of(&self, node: &NodeRef) -> Option<usize> {
		self.result.borrow().nodes().iter().position(|n| n == node)
	}
}

impl NodeSelectionSource for ResultListPanel {
	fn selection(&self) -> &SelectionHandle {
		&self.selection
	}

	/// Highlights the row of `node`; a node outside the result deselects.
	fn set_focus_node(&self, node: Option<&NodeRef>, _options: SelectionOptions) -> anyhow::Result<()> {
		self.selected_row.set(node.and_then(|n| self.row_of(n)));
		Ok(())
	}
}
