//! Java language module.
//!
//! Parsing goes through `tree-sitter-java`, which accepts the union of all
//! Java versions. Language-level restrictions are enforced afterwards by
//! walking the converted tree for constructs newer than the requested
//! version.

mod convert;

use quarry_tree::{LanguageVersion, NodeIdx, ParseError, Parser, PostParsePass, SyntaxTree};
use tracing::debug;

use crate::passes::{SymbolTablePass, TypeResolutionPass};

pub const LANGUAGE: &str = "java";

/// Versions offered for selection, oldest first.
pub const VERSIONS: &[&str] = &["1.8", "11", "17", "21"];

pub const DEFAULT_VERSION: &str = "21";

/// Constructs gated on a minimum language level.
const FEATURE_GATES: &[FeatureGate] = &[
	FeatureGate {
		feature: "local variable type inference ('var')",
		since: 10,
		matches: is_var_declaration,
	},
	FeatureGate {
		feature: "switch rules ('->')",
		since: 14,
		matches: is_switch_rule,
	},
	FeatureGate {
		feature: "record declarations",
		since: 16,
		matches: is_record,
	},
];

struct FeatureGate {
	feature: &'static str,
	since: u32,
	matches: fn(&SyntaxTree, NodeIdx) -> bool,
}

fn is_var_declaration(tree: &SyntaxTree, idx: NodeIdx) -> bool {
	tree.kind(idx) == "LocalVariableDeclaration"
		&& tree
			.children(idx)
			.iter()
			.any(|&c| tree.node(c).field() == Some("type") && tree.text(c) == "var")
}

fn is_switch_rule(tree: &SyntaxTree, idx: NodeIdx) -> bool {
	tree.kind(idx) == "SwitchRule"
}

fn is_record(tree: &SyntaxTree, idx: NodeIdx) -> bool {
	tree.kind(idx) == "RecordDeclaration"
}

/// Feature level of a version string: `1.8` is 8, `17` is 17.
pub fn feature_level(version: &str) -> Option<u32> {
	version.strip_prefix("1.").unwrap_or(version).parse().ok()
}

/// Java parser with its post-parse passes.
pub struct JavaParser {
	passes: Vec<Box<dyn PostParsePass>>,
}

impl Default for JavaParser {
	fn default() -> Self {
		Self::new()
	}
}

impl JavaParser {
	pub fn new() -> Self {
		Self {
			passes: vec![Box::new(SymbolTablePass), Box::new(TypeResolutionPass)],
		}
	}

	/// Version value for `version`, if it is one of [`VERSIONS`].
	pub fn version(version: &str) -> Option<LanguageVersion> {
		VERSIONS
			.iter()
			.find(|v| **v == version)
			.map(|v| LanguageVersion::new(LANGUAGE, *v))
	}

	pub fn default_version() -> LanguageVersion {
		LanguageVersion::new(LANGUAGE, DEFAULT_VERSION)
	}

	fn check_level(tree: &SyntaxTree, version: LanguageVersion) -> Result<(), ParseError> {
		let level = feature_level(version.version).ok_or_else(|| ParseError::UnknownVersion {
			language: LANGUAGE,
			version: version.version.to_string(),
		})?;

		for idx in tree.descendants(tree.root()) {
			let Some(gate) = FEATURE_GATES.iter().find(|g| level < g.since && (g.matches)(tree, idx)) else {
				continue;
			};
			let span = tree.node(idx).span();
			return Err(ParseError::Unsupported {
				feature: gate.feature,
				version,
				line: span.begin_line,
				column: span.begin_column,
			});
		}
		Ok(())
	}
}

impl Parser for JavaParser {
	fn language(&self) -> &'static str {
		LANGUAGE
	}

	fn parse(&self, source: &str, version: LanguageVersion) -> Result<SyntaxTree, ParseError> {
		if version.language != LANGUAGE {
			return Err(ParseError::UnknownLanguage(version.language.to_string()));
		}

		let mut parser = tree_sitter::Parser::new();
		parser
			.set_language(&tree_sitter_java::LANGUAGE.into())
			.map_err(|e| ParseError::Backend(e.to_string()))?;
		let cst = parser
			.parse(source, None)
			.ok_or_else(|| ParseError::Backend("parser produced no tree".to_string()))?;

		let root = cst.root_node();
		if root.has_error() {
			return Err(convert::first_syntax_error(root, source));
		}

		let tree = convert::convert(root, source, version);
		Self::check_level(&tree, version)?;
		debug!(%version, nodes = tree.len(), "java.parsed");
		Ok(tree)
	}

	fn passes(&self) -> &[Box<dyn PostParsePass>] {
		&self.passes
	}
}
