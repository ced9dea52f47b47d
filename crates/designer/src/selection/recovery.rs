use std::sync::Arc;

use quarry_tree::{NodeRef, SyntaxTree};

/// Finds the node of `tree` that corresponds to `old`.
///
/// Walks the child-index path that led to `old` from the new root and
/// accepts the node found there only if it has the same kind. This is a
/// heuristic: an edit that keeps the tree's shape but changes meaning (a
/// renamed method) still re-locates to the same position.
pub fn relocate(old: &NodeRef, tree: &Arc<SyntaxTree>) -> Option<NodeRef> {
	if old.belongs_to(tree) {
		return Some(old.clone());
	}
	let idx = tree.resolve(&old.path())?;
	(tree.kind(idx) == old.kind()).then(|| NodeRef::new(Arc::clone(tree), idx))
}
