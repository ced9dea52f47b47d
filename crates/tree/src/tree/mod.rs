//! Arena syntax tree.
//!
//! Nodes are stored in pre-order, so a node's descendants occupy the
//! contiguous index range `idx + 1 .. subtree_end` and index order is
//! document order.

mod node;
mod path;

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

pub use node::NodeRef;
pub use path::{NodePath, PathParseError};

use crate::language::LanguageVersion;
use crate::scope::{Scope, ScopeTable};

/// Unique identity of one parse result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TreeId(u64);

impl TreeId {
	fn fresh() -> Self {
		static NEXT: AtomicU64 = AtomicU64::new(1);
		Self(NEXT.fetch_add(1, Ordering::Relaxed))
	}

	pub fn get(self) -> u64 {
		self.0
	}
}

impl fmt::Display for TreeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "t{}", self.0)
	}
}

/// Index of a node inside its tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIdx(u32);

impl NodeIdx {
	pub fn get(self) -> usize {
		self.0 as usize
	}
}

/// Source extent of a node. Lines and columns are 1-based; the end column is
/// inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
	pub start_byte: usize,
	pub end_byte: usize,
	pub begin_line: u32,
	pub begin_column: u32,
	pub end_line: u32,
	pub end_column: u32,
}

impl Span {
	pub fn contains_offset(&self, offset: usize) -> bool {
		self.start_byte <= offset && offset < self.end_byte
	}

	pub fn len(&self) -> usize {
		self.end_byte - self.start_byte
	}

	pub fn is_empty(&self) -> bool {
		self.start_byte == self.end_byte
	}
}

/// Value of a node attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
	Str(String),
	Int(i64),
	Bool(bool),
}

impl fmt::Display for AttrValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Str(s) => f.write_str(s),
			Self::Int(i) => write!(f, "{i}"),
			Self::Bool(b) => write!(f, "{b}"),
		}
	}
}

impl From<&str> for AttrValue {
	fn from(s: &str) -> Self {
		Self::Str(s.to_string())
	}
}

impl From<String> for AttrValue {
	fn from(s: String) -> Self {
		Self::Str(s)
	}
}

impl From<i64> for AttrValue {
	fn from(i: i64) -> Self {
		Self::Int(i)
	}
}

impl From<bool> for AttrValue {
	fn from(b: bool) -> Self {
		Self::Bool(b)
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
	pub name: &'static str,
	pub value: AttrValue,
}

/// Per-node storage.
#[derive(Debug, Clone)]
pub struct NodeData {
	kind: Box<str>,
	field: Option<&'static str>,
	parent: Option<NodeIdx>,
	children: Vec<NodeIdx>,
	index_in_parent: u32,
	subtree_end: u32,
	span: Span,
	attributes: Vec<Attribute>,
}

impl NodeData {
	pub fn kind(&self) -> &str {
		&self.kind
	}

	/// Grammar field under which the parent holds this node, if any.
	pub fn field(&self) -> Option<&'static str> {
		self.field
	}

	pub fn parent(&self) -> Option<NodeIdx> {
		self.parent
	}

	pub fn children(&self) -> &[NodeIdx] {
		&self.children
	}

	pub fn index_in_parent(&self) -> u32 {
		self.index_in_parent
	}

	pub fn span(&self) -> Span {
		self.span
	}

	pub fn attributes(&self) -> &[Attribute] {
		&self.attributes
	}

	pub fn attribute(&self, name: &str) -> Option<&AttrValue> {
		self.attributes.iter().find(|a| a.name == name).map(|a| &a.value)
	}
}

/// Parsed representation of one source text.
///
/// Equality is identity: every parse produces a tree unequal to all others.
pub struct SyntaxTree {
	id: TreeId,
	language: LanguageVersion,
	source: Arc<str>,
	nodes: Vec<NodeData>,
	scopes: ScopeTable,
}

impl PartialEq for SyntaxTree {
	fn eq(&self, other: &Self) -> bool {
		self.id == other.id
	}
}

impl Eq for SyntaxTree {}

impl fmt::Debug for SyntaxTree {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SyntaxTree")
			.field("id", &self.id)
			.field("language", &self.language)
			.field("nodes", &self.nodes.len())
			.finish()
	}
}

impl SyntaxTree {
	pub fn id(&self) -> TreeId {
		self.id
	}

	pub fn language(&self) -> LanguageVersion {
		self.language
	}

	pub fn source(&self) -> &str {
		&self.source
	}

	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	/// Trees always have a root, so this is always false.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	pub fn root(&self) -> NodeIdx {
		NodeIdx(0)
	}

	pub fn node(&self, idx: NodeIdx) -> &NodeData {
		&self.nodes[idx.get()]
	}

	pub fn kind(&self, idx: NodeIdx) -> &str {
		self.node(idx).kind()
	}

	pub fn parent(&self, idx: NodeIdx) -> Option<NodeIdx> {
		self.node(idx).parent
	}

	pub fn children(&self, idx: NodeIdx) -> &[NodeIdx] {
		&self.node(idx).children
	}

	/// Source text covered by `idx`.
	pub fn text(&self, idx: NodeIdx) -> &str {
		let span = self.node(idx).span;
		self.source.get(span.start_byte..span.end_byte).unwrap_or("")
	}

	/// Strict descendants of `idx` in document order.
	pub fn descendants(&self, idx: NodeIdx) -> impl DoubleEndedIterator<Item = NodeIdx> + use<> {
		let end = self.node(idx).subtree_end;
		(idx.0 + 1..end).map(NodeIdx)
	}

	/// Strict ancestors of `idx`, nearest first.
	pub fn ancestors(&self, idx: NodeIdx) -> impl Iterator<Item = NodeIdx> + '_ {
		std::iter::successors(self.parent(idx), |&p| self.parent(p))
	}

	/// Returns true if `ancestor` is a strict ancestor of `idx`.
	pub fn is_ancestor_of(&self, ancestor: NodeIdx, idx: NodeIdx) -> bool {
		ancestor < idx && idx.0 < self.node(ancestor).subtree_end
	}

	/// Child-index path from the root to `idx`.
	pub fn path_of(&self, idx: NodeIdx) -> NodePath {
		let mut indices: Vec<u32> = std::iter::once(idx)
			.chain(self.ancestors(idx))
			.filter(|&n| n != self.root())
			.map(|n| self.node(n).index_in_parent)
			.collect();
		indices.reverse();
		NodePath::from_indices(indices)
	}

	/// Walks `path` from the root.
	pub fn resolve(&self, path: &NodePath) -> Option<NodeIdx> {
		path.indices()
			.iter()
			.try_fold(self.root(), |node, &i| self.children(node).get(i as usize).copied())
	}

	/// Innermost node whose span contains `offset`.
	pub fn node_at_offset(&self, offset: usize) -> Option<NodeIdx> {
		let root = self.root();
		if !self.node(root).span.contains_offset(offset) {
			return None;
		}
		let mut current = root;
		while let Some(&child) = self
			.children(current)
			.iter()
			.find(|&&c| self.node(c).span.contains_offset(offset))
		{
			current = child;
		}
		Some(current)
	}

	/// Sets or replaces an attribute. Intended for post-parse passes.
	pub fn set_attribute(&mut self, idx: NodeIdx, name: &'static str, value: impl Into<AttrValue>) {
		let value = value.into();
		let attrs = &mut self.nodes[idx.get()].attributes;
		match attrs.iter_mut().find(|a| a.name == name) {
			Some(existing) => existing.value = value,
			None => attrs.push(Attribute { name, value }),
		}
	}

	pub fn scopes(&self) -> &ScopeTable {
		&self.scopes
	}

	pub fn scopes_mut(&mut self) -> &mut ScopeTable {
		&mut self.scopes
	}

	/// Scopes enclosing `idx` (including one opened at `idx`), innermost first.
	pub fn enclosing_scopes(&self, idx: NodeIdx) -> Vec<&Scope> {
		std::iter::once(idx)
			.chain(self.ancestors(idx))
			.filter_map(|n| self.scopes.get(n))
			.collect()
	}
}

/// Builds a [`SyntaxTree`] from nodes pushed in pre-order.
pub struct TreeBuilder {
	language: LanguageVersion,
	source: Arc<str>,
	nodes: Vec<NodeData>,
}

impl TreeBuilder {
	/// Starts a tree whose root has `kind` and `span`.
	pub fn new(language: LanguageVersion, source: impl Into<Arc<str>>, kind: impl Into<Box<str>>, span: Span) -> Self {
		Self {
			language,
			source: source.into(),
			nodes: vec![NodeData {
				kind: kind.into(),
				field: None,
				parent: None,
				children: Vec::new(),
				index_in_parent: 0,
				subtree_end: 1,
				span,
				attributes: Vec::new(),
			}],
		}
	}

	pub fn root(&self) -> NodeIdx {
		NodeIdx(0)
	}

	/// Appends a child of `parent`.
	///
	/// Nodes must arrive in pre-order: `parent` is the most recently pushed
	/// node or one of its ancestors.
	pub fn push(&mut self, parent: NodeIdx, kind: impl Into<Box<str>>, field: Option<&'static str>, span: Span) -> NodeIdx {
		let idx = NodeIdx(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
		let siblings = &mut self.nodes[parent.get()].children;
		debug_assert!(siblings.last().is_none_or(|&s| s < idx), "nodes must be pushed in pre-order");
		let index_in_parent = siblings.len() as u32;
		siblings.push(idx);
		self.nodes.push(NodeData {
			kind: kind.into(),
			field,
			parent: Some(parent),
			children: Vec::new(),
			index_in_parent,
			subtree_end: idx.0 + 1,
			span,
			attributes: Vec::new(),
		});
		idx
	}

	pub fn attribute(&mut self, idx: NodeIdx, name: &'static str, value: impl Into<AttrValue>) {
		self.nodes[idx.get()].attributes.push(Attribute {
			name,
			value: value.into(),
		});
	}

	pub fn kind(&self, idx: NodeIdx) -> &str {
		&self.nodes[idx.get()].kind
	}

	pub fn finish(mut self) -> SyntaxTree {
		// Pre-order: a node's subtree ends where its last child's subtree ends.
		for i in (0..self.nodes.len()).rev() {
			if let Some(&last) = self.nodes[i].children.last() {
				self.nodes[i].subtree_end = self.nodes[last.get()].subtree_end;
			}
		}
		SyntaxTree {
			id: TreeId::fresh(),
			language: self.language,
			source: self.source,
			nodes: self.nodes,
			scopes: ScopeTable::default(),
		}
	}
}

#[cfg(test)]
mod tests;
