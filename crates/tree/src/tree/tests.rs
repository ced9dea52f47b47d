use std::sync::Arc;

use pretty_assertions::assert_eq;

use super::*;
use crate::scope::{Declaration, DeclarationKind, ScopeKind};

const TOY: LanguageVersion = LanguageVersion::new("toy", "1");

fn span(start: usize, end: usize) -> Span {
	Span {
		start_byte: start,
		end_byte: end,
		begin_line: 1,
		begin_column: start as u32 + 1,
		end_line: 1,
		end_column: end as u32,
	}
}

/// `a(b c(d)) e` shaped tree over "abcde":
///
/// ```text
/// Root          0..5
///   A           0..4
///     B         1..2
///     C         2..4
///       D       3..4
///   E           4..5
/// ```
fn sample() -> SyntaxTree {
	let mut b = TreeBuilder::new(TOY, "abcde", "Root", span(0, 5));
	let root = b.root();
	let a = b.push(root, "A", None, span(0, 4));
	b.push(a, "B", Some("left"), span(1, 2));
	let c = b.push(a, "C", Some("right"), span(2, 4));
	let d = b.push(c, "D", None, span(3, 4));
	b.attribute(d, "Image", "d");
	b.push(root, "E", None, span(4, 5));
	b.finish()
}

fn kinds(tree: &SyntaxTree, nodes: impl Iterator<Item = NodeIdx>) -> Vec<String> {
	nodes.map(|n| tree.kind(n).to_string()).collect()
}

#[test]
fn descendants_are_a_contiguous_preorder_range() {
	let tree = sample();
	assert_eq!(kinds(&tree, tree.descendants(tree.root())), ["A", "B", "C", "D", "E"]);
	let a = tree.children(tree.root())[0];
	assert_eq!(kinds(&tree, tree.descendants(a)), ["B", "C", "D"]);
	let e = tree.children(tree.root())[1];
	assert_eq!(tree.descendants(e).count(), 0);
}

#[test]
fn ancestors_nearest_first() {
	let tree = sample();
	let d = tree.resolve(&"/0/1/0".parse().unwrap()).unwrap();
	assert_eq!(tree.kind(d), "D");
	assert_eq!(kinds(&tree, tree.ancestors(d)), ["C", "A", "Root"]);
	assert!(tree.is_ancestor_of(tree.root(), d));
	assert!(!tree.is_ancestor_of(d, tree.root()));
}

#[test]
fn path_round_trips_through_resolve() {
	let tree = sample();
	for idx in std::iter::once(tree.root()).chain(tree.descendants(tree.root())) {
		let path = tree.path_of(idx);
		assert_eq!(tree.resolve(&path), Some(idx), "path {path}");
	}
	assert_eq!(tree.path_of(tree.root()).to_string(), "/");
}

#[test]
fn resolve_rejects_out_of_range_paths() {
	let tree = sample();
	assert_eq!(tree.resolve(&"/2".parse().unwrap()), None);
	assert_eq!(tree.resolve(&"/1/0".parse().unwrap()), None);
}

#[test]
fn node_at_offset_finds_innermost() {
	let tree = sample();
	assert_eq!(tree.node_at_offset(3).map(|n| tree.kind(n)), Some("D"));
	assert_eq!(tree.node_at_offset(0).map(|n| tree.kind(n)), Some("A"));
	assert_eq!(tree.node_at_offset(4).map(|n| tree.kind(n)), Some("E"));
	assert_eq!(tree.node_at_offset(5), None);
}

#[test]
fn text_and_attributes() {
	let mut tree = sample();
	let d = tree.resolve(&"/0/1/0".parse().unwrap()).unwrap();
	assert_eq!(tree.text(d), "d");
	assert_eq!(tree.node(d).attribute("Image"), Some(&AttrValue::Str("d".into())));

	tree.set_attribute(d, "Image", "x");
	tree.set_attribute(d, "Depth", 3i64);
	assert_eq!(tree.node(d).attribute("Image"), Some(&AttrValue::Str("x".into())));
	assert_eq!(tree.node(d).attributes().len(), 2);
}

#[test]
fn field_names_are_kept() {
	let tree = sample();
	let a = tree.children(tree.root())[0];
	let fields: Vec<_> = tree.children(a).iter().map(|&c| tree.node(c).field()).collect();
	assert_eq!(fields, [Some("left"), Some("right")]);
}

#[test]
fn every_parse_has_its_own_identity() {
	let first = Arc::new(sample());
	let second = Arc::new(sample());
	assert_ne!(first.id(), second.id());
	assert_ne!(*first, *second);

	let a1 = NodeRef::root(Arc::clone(&first));
	let a2 = NodeRef::root(Arc::clone(&first));
	let b = NodeRef::root(second);
	assert_eq!(a1, a2);
	assert_ne!(a1, b, "structurally equal nodes of different parses are distinct");
}

#[test]
fn node_ref_navigation() {
	let tree = Arc::new(sample());
	let root = NodeRef::root(Arc::clone(&tree));
	let a = root.children().next().unwrap();
	let c = a.children().nth(1).unwrap();
	assert_eq!(c.kind(), "C");
	assert_eq!(c.child_index(), 1);
	assert_eq!(c.parent(), Some(a.clone()));
	assert_eq!(c.path().to_string(), "/0/1");
	assert_eq!(c.ancestors().map(|n| n.kind().to_string()).collect::<Vec<_>>(), ["A", "Root"]);
	assert!(c.belongs_to(&tree));
	assert_eq!(format!("{c:?}"), format!("C@1:3#{}/3", tree.id()));
}

#[test]
fn enclosing_scopes_innermost_first() {
	let mut tree = sample();
	let a = tree.children(tree.root())[0];
	let c = tree.children(a)[1];
	let d = tree.children(c)[0];
	let root = tree.root();
	tree.scopes_mut().open(root, ScopeKind::Type);
	tree.scopes_mut().open(c, ScopeKind::Block);
	assert!(tree.scopes_mut().declare(
		c,
		Declaration {
			name: "d".into(),
			kind: DeclarationKind::Local,
			node: d,
		}
	));

	let kinds: Vec<_> = tree.enclosing_scopes(d).iter().map(|s| s.kind).collect();
	assert_eq!(kinds, [ScopeKind::Block, ScopeKind::Type]);
	assert_eq!(tree.scopes().get(c).map(|s| s.declarations.len()), Some(1));
}

#[test]
fn path_parsing() {
	assert_eq!("/".parse::<NodePath>(), Ok(NodePath::root()));
	assert_eq!("/0/2/1".parse::<NodePath>().map(|p| p.indices().to_vec()), Ok(vec![0, 2, 1]));
	assert_eq!("0/1".parse::<NodePath>(), Err(PathParseError::MissingLeadingSlash));
	assert_eq!("/0/x".parse::<NodePath>(), Err(PathParseError::InvalidSegment("x".into())));

	let p: NodePath = "/3/4".parse().unwrap();
	assert_eq!(p.parent().map(|p| p.to_string()), Some("/3".to_string()));
	assert_eq!(p.child(7).to_string(), "/3/4/7");
	assert_eq!(NodePath::root().parent(), None);
}
