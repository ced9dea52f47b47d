//! Parser collaborator contracts.

use std::path::PathBuf;
use std::rc::Rc;

use thiserror::Error;

use crate::language::{LanguageVersion, ResolutionContext};
use crate::tree::SyntaxTree;

/// Turns source text into a [`SyntaxTree`] for one language.
pub trait Parser {
	/// Name of the language this parser handles.
	fn language(&self) -> &'static str;

	fn parse(&self, source: &str, version: LanguageVersion) -> Result<SyntaxTree, ParseError>;

	/// Best-effort passes to run on every successful parse, in order.
	fn passes(&self) -> &[Box<dyn PostParsePass>] {
		&[]
	}
}

/// Looks parsers up by language name.
pub trait ParserProvider {
	fn parser(&self, language: &str) -> Option<Rc<dyn Parser>>;
}

/// Semantic decoration applied after parsing (symbol tables, types).
///
/// A failing pass may leave partial decorations behind; the tree stays usable
/// for structural queries either way.
pub trait PostParsePass {
	fn name(&self) -> &'static str;

	fn run(&self, tree: &mut SyntaxTree, context: &ResolutionContext) -> Result<(), PassError>;
}

/// Reasons the source could not be turned into a tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
	#[error("syntax error at line {line}, column {column}: {message}")]
	Syntax { line: u32, column: u32, message: String },

	#[error("{feature} not supported in {version} (line {line}, column {column})")]
	Unsupported {
		feature: &'static str,
		version: LanguageVersion,
		line: u32,
		column: u32,
	},

	#[error("no parser registered for language '{0}'")]
	UnknownLanguage(String),

	#[error("unknown {language} version '{version}'")]
	UnknownVersion { language: &'static str, version: String },

	#[error("parser backend failure: {0}")]
	Backend(String),
}

impl ParseError {
	/// Line and column the error points at, if it has a location.
	pub fn position(&self) -> Option<(u32, u32)> {
		match self {
			Self::Syntax { line, column, .. } | Self::Unsupported { line, column, .. } => Some((*line, *column)),
			_ => None,
		}
	}
}

/// Failure of a single post-parse pass.
#[derive(Debug, Error)]
pub enum PassError {
	#[error("classpath entry {} does not exist", .0.display())]
	MissingClasspathEntry(PathBuf),

	#[error("{pass} failed: {reason}")]
	Failed { pass: &'static str, reason: String },
}
