use std::cell::RefCell;
use std::rc::Rc;

use quarry_reactive::{ComponentId, MessageChannel, Subscription, Var};
use quarry_tree::NodeRef;
use tracing::{debug, warn};

use super::event::{NodeSelectionEvent, SelectionOptions};
use super::recovery::relocate;
use super::source::NodeSelectionSource;
use crate::parse_model::Tree;

/// Origin of selections re-established after a reparse.
pub const RECOVERY_ORIGIN: &str = "selection-recovery";

/// What [`SelectionSynchronizer::recover`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveryOutcome {
	/// The selection was re-located in the new tree.
	Relocated(NodeRef),
	/// No equivalent node exists; the selection was cleared.
	Cleared,
}

struct Inner {
	origin: ComponentId,
	channel: MessageChannel<NodeSelectionEvent>,
	compilation_unit: Var<Tree>,
	subscriptions: RefCell<Vec<Subscription>>,
}

/// Connects panels to the selection channel and keeps the selection valid
/// across reparses.
pub struct SelectionSynchronizer {
	inner: Rc<Inner>,
}

impl SelectionSynchronizer {
	pub fn new(channel: MessageChannel<NodeSelectionEvent>, compilation_unit: Var<Tree>) -> Self {
		let inner = Rc::new(Inner {
			origin: ComponentId::new(RECOVERY_ORIGIN),
			channel,
			compilation_unit,
			subscriptions: RefCell::new(Vec::new()),
		});
		Self { inner }
	}

	pub fn channel(&self) -> &MessageChannel<NodeSelectionEvent> {
		&self.inner.channel
	}

	/// Delivers selections from other origins to `panel`.
	///
	/// The panel immediately shows the channel's latest selection, if any.
	/// The synchronizer holds only a weak reference to the panel.
	pub fn attach<P: NodeSelectionSource + 'static>(&self, panel: &Rc<P>) {
		let handle = panel.selection();
		let weak = Rc::downgrade(panel);
		let subscription = self.inner.channel.subscribe(
			handle.id().clone(),
			panel.always_handle_own_events(),
			move |event: &NodeSelectionEvent| {
				if let Some(panel) = weak.upgrade() {
					apply(&*panel, event);
				}
				Ok(())
			},
		);
		self.inner.subscriptions.borrow_mut().push(subscription);

		if let Some(latest) = self.inner.channel.latest_value() {
			apply(&**panel, &latest);
		}
	}

	/// Re-locates the current selection if it points outside the current
	/// compilation unit. Returns `None` when there was nothing to do.
	///
	/// Any selected node from another tree is repaired, including one pushed
	/// by a panel still showing rows of the previous tree.
	pub fn recover(&self) -> Option<RecoveryOutcome> {
		let selected = self.stale_selection()?;
		let tree = self.inner.compilation_unit.get();

		match tree.as_ref().and_then(|tree| relocate(&selected, tree)) {
			Some(node) => {
				debug!(from = ?selected, to = ?node, "selection.recovered");
				self.inner.channel.push(
					self.inner.origin.clone(),
					NodeSelectionEvent::select(node.clone()).with_options(SelectionOptions::SELECTION_RECOVERY),
				);
				Some(RecoveryOutcome::Relocated(node))
			}
			None => {
				debug!(lost = ?selected, "selection.cleared");
				self.inner.channel.push(self.inner.origin.clone(), NodeSelectionEvent::clear());
				Some(RecoveryOutcome::Cleared)
			}
		}
	}

	/// Returns true if the selection is waiting for [`Self::recover`].
	pub fn is_pending(&self) -> bool {
		self.stale_selection().is_some()
	}

	/// The selected node, if it does not belong to the current tree.
	fn stale_selection(&self) -> Option<NodeRef> {
		let selected = self.inner.channel.latest_value()?.node?;
		let current = self.inner.compilation_unit.with(|tree| tree.as_ref().is_some_and(|t| selected.belongs_to(t)));
		(!current).then_some(selected)
	}
}

/// Shows `event` on `panel` with its outbound path muted.
fn apply(panel: &dyn NodeSelectionSource, event: &NodeSelectionEvent) {
	let handle = panel.selection();
	let _mute = handle.suspend();
	handle.set_focus(event.node.clone());
	if let Err(err) = panel.set_focus_node(event.node.as_ref(), event.options) {
		warn!(panel = %handle.id(), error = %err, "selection.handler_failed");
	}
}
