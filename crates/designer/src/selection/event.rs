use bitflags::bitflags;
use quarry_tree::NodeRef;

bitflags! {
	/// Hints attached to a selection.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
	pub struct SelectionOptions: u8 {
		/// Do not scroll the selected node into view.
		const NO_SCROLL = 1 << 0;
		/// The selection re-establishes a previous one after a reparse;
		/// avoid disruptive side effects.
		const SELECTION_RECOVERY = 1 << 1;
	}
}

impl SelectionOptions {
	/// Returns true if a panel may scroll to the selected node.
	pub fn allows_scroll(self) -> bool {
		!self.intersects(Self::NO_SCROLL | Self::SELECTION_RECOVERY)
	}
}

/// Payload of the selection channel. `node: None` clears the selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSelectionEvent {
	pub node: Option<NodeRef>,
	pub options: SelectionOptions,
}

impl NodeSelectionEvent {
	pub fn select(node: NodeRef) -> Self {
		Self {
			node: Some(node),
			options: SelectionOptions::empty(),
		}
	}

	pub fn clear() -> Self {
		Self {
			node: None,
			options: SelectionOptions::empty(),
		}
	}

	pub fn with_options(mut self, options: SelectionOptions) -> Self {
		self.options = options;
		self
	}
}
