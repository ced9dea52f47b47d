use std::cell::RefCell;

use quarry_reactive::{ComponentId, MessageChannel, SuspendFlag, SuspendGuard};
use quarry_tree::NodeRef;
use tracing::trace;

use super::event::{NodeSelectionEvent, SelectionOptions};

/// A panel that can display, and possibly originate, node selections.
pub trait NodeSelectionSource {
	fn selection(&self) -> &SelectionHandle;

	/// Updates the display for a selection made elsewhere.
	///
	/// Called with the panel's outbound path suspended, so widget callbacks
	/// fired by the update do not publish.
	fn set_focus_node(&self, node: Option<&NodeRef>, options: SelectionOptions) -> anyhow::Result<()>;

	/// Whether events this panel published are delivered back to it.
	fn always_handle_own_events(&self) -> bool {
		false
	}
}

/// Per-panel selection state: identity, focused node and outbound mute.
pub struct SelectionHandle {
	id: ComponentId,
	channel: MessageChannel<NodeSelectionEvent>,
	focus: RefCell<Option<NodeRef>>,
	outbound: SuspendFlag,
}

impl SelectionHandle {
	pub fn new(id: impl Into<ComponentId>, channel: MessageChannel<NodeSelectionEvent>) -> Self {
		Self {
			id: id.into(),
			channel,
			focus: RefCell::new(None),
			outbound: SuspendFlag::new(),
		}
	}

	pub fn id(&self) -> &ComponentId {
		&self.id
	}

	/// Node the panel is focused on; `None` while idle.
	pub fn focused(&self) -> Option<NodeRef> {
		self.focus.borrow().clone()
	}

	pub fn is_idle(&self) -> bool {
		self.focus.borrow().is_none()
	}

	/// Publishes a selection the user made in this panel.
	///
	/// Returns false without publishing while the outbound path is
	/// suspended, i.e. when the "selection" is the panel's own display update.
	pub fn user_select(&self, node: Option<NodeRef>, options: SelectionOptions) -> bool {
		if self.outbound.is_suspended() {
			trace!(panel = %self.id, "selection.suppressed");
			return false;
		}
		self.set_focus(node.clone());
		self.channel.push(self.id.clone(), NodeSelectionEvent { node, options });
		true
	}

	/// Mutes [`Self::user_select`] until the guard drops.
	pub fn suspend(&self) -> SuspendGuard {
		self.outbound.suspend()
	}

	pub fn is_suspended(&self) -> bool {
		self.outbound.is_suspended()
	}

	pub(crate) fn set_focus(&self, node: Option<NodeRef>) {
		*self.focus.borrow_mut() = node;
	}
}
