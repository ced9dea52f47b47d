use std::cell::RefCell;
use std::sync::Arc;

use quarry_reactive::MessageChannel;
use quarry_tree::{NodeIdx, NodePath, NodeRef, SyntaxTree};
use rustc_hash::FxHashSet;

use crate::parse_model::Tree;
use crate::selection::{NodeSelectionEvent, NodeSelectionSource, SelectionHandle, SelectionOptions};

/// One visible line of the tree view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRow {
	pub depth: usize,
	pub kind: String,
	pub path: NodePath,
	pub expanded: bool,
	pub focused: bool,
}

/// Outline of the compilation unit.
///
/// Expansion is remembered by child-index path, so it survives reparses
/// that keep the tree's shape.
pub struct TreeViewPanel {
	selection: SelectionHandle,
	tree: RefCell<Tree>,
	expanded: RefCell<FxHashSet<NodePath>>,
	scroll_target: RefCell<Option<NodeRef>>,
}

impl TreeViewPanel {
	pub const ID: &'static str = "tree-view";

	pub fn new(channel: MessageChannel<NodeSelectionEvent>) -> Self {
		Self {
			selection: SelectionHandle::new(Self::ID, channel),
			tree: RefCell::new(None),
			expanded: RefCell::default(),
			scroll_target: RefCell::new(None),
		}
	}

	/// Shows a new compilation unit.
	pub fn set_tree(&self, tree: Tree) {
		*self.tree.borrow_mut() = tree;
		self.scroll_target.borrow_mut().take();
	}

	pub fn tree(&self) -> Tree {
		self.tree.borrow().clone()
	}

	/// Widget callback: the user picked a row.
	pub fn on_row_selected(&self, node: Option<NodeRef>) -> bool {
		if !self.selection.user_select(node.clone(), SelectionOptions::empty()) {
			return false;
		}
		let _mute = self.selection.suspend();
		// The row is already visible; only reveal its ancestors.
		self.reveal(node.as_ref(), SelectionOptions::NO_SCROLL);
		true
	}

	/// Expands or collapses the row at `path`.
	pub fn toggle(&self, path: &NodePath) {
		let mut expanded = self.expanded.borrow_mut();
		if !expanded.remove(path) {
			expanded.insert(path.clone());
		}
	}

	pub fn is_expanded(&self, path: &NodePath) -> bool {
		self.expanded.borrow().contains(path)
	}

	/// Node the view was last asked to scroll to.
	pub fn scroll_target(&self) -> Option<NodeRef> {
		self.scroll_target.borrow().clone()
	}

	/// Visible rows in pre-order. Children of collapsed rows are hidden.
	pub fn rows(&self) -> Vec<TreeRow> {
		let Some(tree) = self.tree() else {
			return Vec::new();
		};
		let focused = self.selection.focused().filter(|n| n.belongs_to(&tree)).map(|n| n.index());
		let mut rows = Vec::new();
		self.collect_rows(&tree, tree.root(), NodePath::root(), focused, &mut rows);
		rows
	}

	fn collect_rows(&self, tree: &Arc<SyntaxTree>, idx: NodeIdx, path: NodePath, focused: Option<NodeIdx>, rows: &mut Vec<TreeRow>) {
		let expanded = self.is_expanded(&path);
		rows.push(TreeRow {
			depth: path.depth(),
			kind: tree.kind(idx).to_string(),
			path: path.clone(),
			expanded,
			focused: focused == Some(idx),
		});
		if !expanded {
			return;
		}
		for (i, &child) in tree.children(idx).iter().enumerate() {
			self.collect_rows(tree, child, path.child(i as u32), focused, rows);
		}
	}

	fn reveal(&self, node: Option<&NodeRef>, options: SelectionOptions) {
		let Some(node) = node else {
			return;
		};
		let mut expanded = self.expanded.borrow_mut();
		let mut path = node.path();
		while let Some(parent) = path.parent() {
			expanded.insert(parent.clone());
			path = parent;
		}
		drop(expanded);
		if options.allows_scroll() {
			*self.scroll_target.borrow_mut() = Some(node.clone());
		}
	}
}

impl NodeSelectionSource for TreeViewPanel {
	fn selection(&self) -> &SelectionHandle {
		&self.selection
	}

	fn set_focus_node(&self, node: Option<&NodeRef>, options: SelectionOptions) -> anyhow::Result<()> {
		if let (Some(node), Some(tree)) = (node, self.tree())
			&& !node.belongs_to(&tree)
		{
			anyhow::bail!("{node:?} is not part of the displayed tree {}", tree.id());
		}
		self.reveal(node, options);
		Ok(())
	}
}
