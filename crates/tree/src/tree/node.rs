use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use super::{AttrValue, Attribute, NodeIdx, NodePath, Span, SyntaxTree};

/// Shared handle to one node of a [`SyntaxTree`].
///
/// Two refs are equal only if they point at the same node of the same parse;
/// structurally identical nodes from different parses are distinct.
#[derive(Clone)]
pub struct NodeRef {
	tree: Arc<SyntaxTree>,
	idx: NodeIdx,
}

impl PartialEq for NodeRef {
	fn eq(&self, other: &Self) -> bool {
		self.idx == other.idx && self.tree.id() == other.tree.id()
	}
}

impl Eq for NodeRef {}

impl Hash for NodeRef {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.tree.id().hash(state);
		self.idx.hash(state);
	}
}

impl fmt::Debug for NodeRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let span = self.span();
		write!(
			f,
			"{}@{}:{}#{}/{}",
			self.kind(),
			span.begin_line,
			span.begin_column,
			self.tree.id(),
			self.idx.get()
		)
	}
}

impl NodeRef {
	pub fn new(tree: Arc<SyntaxTree>, idx: NodeIdx) -> Self {
		Self { tree, idx }
	}

	pub fn root(tree: Arc<SyntaxTree>) -> Self {
		let idx = tree.root();
		Self { tree, idx }
	}

	pub fn tree(&self) -> &Arc<SyntaxTree> {
		&self.tree
	}

	pub fn index(&self) -> NodeIdx {
		self.idx
	}

	pub fn kind(&self) -> &str {
		self.tree.kind(self.idx)
	}

	pub fn span(&self) -> Span {
		self.tree.node(self.idx).span()
	}

	pub fn text(&self) -> &str {
		self.tree.text(self.idx)
	}

	pub fn attributes(&self) -> &[Attribute] {
		self.tree.node(self.idx).attributes()
	}

	pub fn attribute(&self, name: &str) -> Option<&AttrValue> {
		self.tree.node(self.idx).attribute(name)
	}

	pub fn parent(&self) -> Option<NodeRef> {
		self.tree.parent(self.idx).map(|p| self.sibling_ref(p))
	}

	pub fn children(&self) -> impl Iterator<Item = NodeRef> + '_ {
		self.tree.children(self.idx).iter().map(|&c| self.sibling_ref(c))
	}

	/// Position among the parent's children; 0 for the root.
	pub fn child_index(&self) -> usize {
		self.tree.node(self.idx).index_in_parent() as usize
	}

	pub fn path(&self) -> NodePath {
		self.tree.path_of(self.idx)
	}

	/// Strict ancestors, nearest first.
	pub fn ancestors(&self) -> impl Iterator<Item = NodeRef> + '_ {
		self.tree.ancestors(self.idx).map(|a| self.sibling_ref(a))
	}

	/// Returns true if this node is part of `tree`.
	pub fn belongs_to(&self, tree: &SyntaxTree) -> bool {
		self.tree.id() == tree.id()
	}

	fn sibling_ref(&self, idx: NodeIdx) -> NodeRef {
		NodeRef {
			tree: Arc::clone(&self.tree),
			idx,
		}
	}
}
