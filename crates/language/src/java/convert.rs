//! Concrete syntax tree to [`SyntaxTree`] conversion.
//!
//! Only named, non-extra nodes survive: punctuation and keywords are dropped
//! and comments do not appear in the tree. Kinds are renamed from
//! tree-sitter's snake_case to PascalCase, with `program` becoming
//! `CompilationUnit`.

use quarry_tree::{LanguageVersion, NodeIdx, ParseError, Span, SyntaxTree, TreeBuilder};
use tree_sitter::{Node, TreeCursor};

/// Modifier keywords exposed as boolean attributes.
const MODIFIERS: &[(&str, &str)] = &[
	("public", "Public"),
	("protected", "Protected"),
	("private", "Private"),
	("static", "Static"),
	("final", "Final"),
	("abstract", "Abstract"),
];

/// Declarations that always carry every modifier attribute.
const DECLARATIONS: &[&str] = &[
	"class_declaration",
	"interface_declaration",
	"enum_declaration",
	"record_declaration",
	"annotation_type_declaration",
	"method_declaration",
	"constructor_declaration",
	"field_declaration",
	"local_variable_declaration",
];

pub(super) fn convert(root: Node<'_>, source: &str, version: LanguageVersion) -> SyntaxTree {
	let mut builder = TreeBuilder::new(version, source, kind_name(root.kind()), span_of(root));
	let root_idx = builder.root();
	decorate(&mut builder, root_idx, root, source);

	let mut cursor = root.walk();
	convert_children(&mut cursor, &mut builder, root_idx, source);
	builder.finish()
}

fn convert_children(cursor: &mut TreeCursor<'_>, builder: &mut TreeBuilder, parent: NodeIdx, source: &str) {
	if !cursor.goto_first_child() {
		return;
	}
	loop {
		let node = cursor.node();
		if node.is_named() && !node.is_extra() {
			let idx = builder.push(parent, kind_name(node.kind()), cursor.field_name(), span_of(node));
			decorate(builder, idx, node, source);
			convert_children(cursor, builder, idx, source);
		}
		if !cursor.goto_next_sibling() {
			break;
		}
	}
	cursor.goto_parent();
}

fn decorate(builder: &mut TreeBuilder, idx: NodeIdx, node: Node<'_>, source: &str) {
	let span = span_of(node);
	builder.attribute(idx, "BeginLine", i64::from(span.begin_line));
	builder.attribute(idx, "BeginColumn", i64::from(span.begin_column));
	builder.attribute(idx, "EndLine", i64::from(span.end_line));
	builder.attribute(idx, "EndColumn", i64::from(span.end_column));

	if node.named_child_count() == 0 {
		builder.attribute(idx, "Image", text_of(node, source));
	}
	if let Some(name) = node.child_by_field_name("name") {
		builder.attribute(idx, "Name", text_of(name, source));
	}
	if DECLARATIONS.contains(&node.kind()) {
		let present = modifier_keywords(node);
		for &(keyword, attr) in MODIFIERS {
			builder.attribute(idx, attr, present.contains(&keyword));
		}
	}
}

/// Keywords of the node's `modifiers` child, if it has one.
fn modifier_keywords(node: Node<'_>) -> Vec<&'static str> {
	let mut cursor = node.walk();
	let Some(modifiers) = node.children(&mut cursor).find(|c| c.kind() == "modifiers") else {
		return Vec::new();
	};
	let mut inner = modifiers.walk();
	modifiers.children(&mut inner).map(|m| m.kind()).collect()
}

fn text_of<'s>(node: Node<'_>, source: &'s str) -> &'s str {
	source.get(node.start_byte()..node.end_byte()).unwrap_or("")
}

fn span_of(node: Node<'_>) -> Span {
	let start = node.start_position();
	let end = node.end_position();
	Span {
		start_byte: node.start_byte(),
		end_byte: node.end_byte(),
		begin_line: start.row as u32 + 1,
		begin_column: start.column as u32 + 1,
		end_line: end.row as u32 + 1,
		end_column: end.column as u32,
	}
}

/// `field_declaration` becomes `FieldDeclaration`.
pub(super) fn kind_name(kind: &str) -> String {
	if kind == "program" {
		return "CompilationUnit".to_string();
	}
	kind.split('_')
		.filter(|part| !part.is_empty())
		.map(|part| {
			let mut chars = part.chars();
			chars
				.next()
				.map(|first| first.to_ascii_uppercase().to_string() + chars.as_str())
				.unwrap_or_default()
		})
		.collect()
}

/// Error for the first `ERROR` or missing node in document order.
pub(super) fn first_syntax_error(root: Node<'_>, source: &str) -> ParseError {
	let mut cursor = root.walk();
	let culprit = loop {
		let node = cursor.node();
		if node.is_error() || node.is_missing() {
			break Some(node);
		}
		if node.has_error() && cursor.goto_first_child() {
			continue;
		}
		// Move to the next sibling, climbing until one exists.
		let mut advanced = cursor.goto_next_sibling();
		while !advanced {
			if !cursor.goto_parent() {
				break;
			}
			advanced = cursor.goto_next_sibling();
		}
		if !advanced {
			break None;
		}
	};

	let node = culprit.unwrap_or(root);
	let position = node.start_position();
	let message = if node.is_missing() {
		format!("missing '{}'", node.kind())
	} else {
		let snippet: String = text_of(node, source).chars().take(20).collect();
		if snippet.is_empty() {
			"unexpected end of input".to_string()
		} else {
			format!("unexpected '{snippet}'")
		}
	};
	ParseError::Syntax {
		line: position.row as u32 + 1,
		column: position.column as u32 + 1,
		message,
	}
}
