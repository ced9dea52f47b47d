use std::cell::RefCell;

use quarry_reactive::MessageChannel;
use quarry_tree::NodeRef;

use crate::selection::{NodeSelectionEvent, NodeSelectionSource, SelectionHandle, SelectionOptions};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeRow {
	pub name: &'static str,
	pub value: String,
}

/// Attribute inspector for the focused node. Display only.
pub struct AttributePanel {
	selection: SelectionHandle,
	title: RefCell<Option<String>>,
	rows: RefCell<Vec<AttributeRow>>,
}

impl AttributePanel {
	pub const ID: &'static str = "attributes";

	pub fn new(channel: MessageChannel<NodeSelectionEvent>) -> Self {
		Self {
			selection: SelectionHandle::new(Self::ID, channel),
			title: RefCell::new(None),
			rows: RefCell::new(Vec::new()),
		}
	}

	/// Kind of the inspected node.
	pub fn title(&self) -> Option<String> {
		self.title.borrow().clone()
	}

	pub fn rows(&self) -> Vec<AttributeRow> {
		self.rows.borrow().clone()
	}
}

impl NodeSelectionSource for AttributePanel {
	fn selection(&self) -> &SelectionHandle {
		&self.selection
	}

	fn set_focus_node(&self, node: Option<&NodeRef>, _options: SelectionOptions) -> anyhow::Result<()> {
		*self.title.borrow_mut() = node.map(|n| n.kind().to_string());
		*self.rows.borrow_mut() = node
			.map(|n| {
				n.attributes()
					.iter()
					.map(|a| AttributeRow {
						name: a.name,
						value: a.value.to_string(),
					})
					.collect()
			})
			.unwrap_or_default();
		Ok(())
	}
}
