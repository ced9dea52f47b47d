//! Scope table produced by the symbol-table pass.

use rustc_hash::FxHashMap;

use crate::tree::NodeIdx;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
	/// Class, interface, enum or record body.
	Type,
	/// Method, constructor or lambda parameters.
	Callable,
	/// Statement block.
	Block,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclarationKind {
	Type,
	Field,
	Method,
	Parameter,
	Local,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
	pub name: String,
	pub kind: DeclarationKind,
	/// Node that declares the name.
	pub node: NodeIdx,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
	/// Node that opens the scope.
	pub node: NodeIdx,
	pub kind: ScopeKind,
	/// Declarations in source order.
	pub declarations: Vec<Declaration>,
}

/// Scopes keyed by the node that opens them.
#[derive(Debug, Clone, Default)]
pub struct ScopeTable {
	scopes: Vec<Scope>,
	by_node: FxHashMap<NodeIdx, usize>,
}

impl ScopeTable {
	/// Opens a scope at `node`. Opening the same node twice is a no-op.
	pub fn open(&mut self, node: NodeIdx, kind: ScopeKind) {
		if self.by_node.contains_key(&node) {
			return;
		}
		self.by_node.insert(node, self.scopes.len());
		self.scopes.push(Scope {
			node,
			kind,
			declarations: Vec::new(),
		});
	}

	/// Adds a declaration to the scope opened at `scope`.
	///
	/// Returns false if no scope is open there.
	pub fn declare(&mut self, scope: NodeIdx, declaration: Declaration) -> bool {
		match self.by_node.get(&scope) {
			Some(&i) => {
				self.scopes[i].declarations.push(declaration);
				true
			}
			None => false,
		}
	}

	pub fn get(&self, node: NodeIdx) -> Option<&Scope> {
		self.by_node.get(&node).map(|&i| &self.scopes[i])
	}

	pub fn iter(&self) -> impl Iterator<Item = &Scope> {
		self.scopes.iter()
	}

	pub fn len(&self) -> usize {
		self.scopes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.scopes.is_empty()
	}

	pub fn clear(&mut self) {
		self.scopes.clear();
		self.by_node.clear();
	}
}
