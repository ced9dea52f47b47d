use std::cell::RefCell;
use std::sync::Arc;

use quarry_reactive::MessageChannel;
use quarry_tree::{DeclarationKind, NodeRef, ScopeKind};

use crate::selection::{NodeSelectionEvent, NodeSelectionSource, SelectionHandle, SelectionOptions};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationRow {
	pub name: String,
	pub kind: DeclarationKind,
	pub node: NodeRef,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeRow {
	pub kind: ScopeKind,
	/// Node that opens the scope.
	pub node: NodeRef,
	pub declarations: Vec<DeclarationRow>,
}

/// Scopes enclosing the focused node, innermost first.
///
/// Picking a declaration selects its declaring node everywhere.
pub struct ScopePanel {
	selection: SelectionHandle,
	rows: RefCell<Vec<ScopeRow>>,
}

impl ScopePanel {
	pub const ID: &'static str = "scopes";

	pub fn new(channel: MessageChannel<NodeSelectionEvent>) -> Self {
		Self {
			selection: SelectionHandle::new(Self::ID, channel),
			rows: RefCell::new(Vec::new()),
		}
	}

	pub fn rows(&self) -> Vec<ScopeRow> {
		self.rows.borrow().clone()
	}

	/// Widget callback: the user picked declaration `declaration` of scope
	/// row `scope`.
	pub fn select_declaration(&self, scope: usize, declaration: usize) -> bool {
		let node = self
			.rows
			.borrow()
			.get(scope)
			.and_then(|row| row.declarations.get(declaration))
			.map(|d| d.node.clone());
		match node {
			Some(node) => self.selection.user_select(Some(node), SelectionOptions::empty()),
			None => false,
		}
	}

	fn rows_for(node: &NodeRef) -> Vec<ScopeRow> {
		let tree = node.tree();
		let at = |idx| NodeRef::new(Arc::clone(tree), idx);
		tree.enclosing_scopes(node.index())
			.into_iter()
			.map(|scope| ScopeRow {
				kind: scope.kind,
				node: at(scope.node),
				declarations: scope
					.declarations
					.iter()
					.map(|d| DeclarationRow {
						name: d.name.clone(),
						kind: d.kind,
						node: at(d.node),
					})
					.collect(),
			})
			.collect()
	}
}

impl NodeSelectionSource for ScopePanel {
	fn selection(&self) -> &SelectionHandle {
		&self.selection
	}

	fn set_focus_node(&self, node: Option<&NodeRef>, _options: SelectionOptions) -> anyhow::Result<()> {
		*self.rows.borrow_mut() = node.map(Self::rows_for).unwrap_or_default();
		Ok(())
	}
}
