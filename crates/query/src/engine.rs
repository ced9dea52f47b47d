//! Query engine contract.

use std::sync::Arc;

use indexmap::IndexMap;
use quarry_tree::{NodeRef, SyntaxTree};
use thiserror::Error;

use crate::dialect::XPathVersion;

/// Bound query properties, in declaration order.
pub type Properties = IndexMap<String, String>;

/// Evaluates a query expression against a tree.
pub trait QueryEngine {
	/// Returns the matched nodes in document order.
	fn evaluate(
		&self,
		tree: &Arc<SyntaxTree>,
		version: XPathVersion,
		expression: &str,
		properties: &Properties,
	) -> Result<Vec<NodeRef>, QueryError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryErrorKind {
	/// The expression is not valid in the dialect.
	Syntax,
	/// A `$variable` has no bound property.
	UndeclaredVariable,
	UnknownFunction,
	/// Operands or results of the wrong type.
	Type,
	/// An invalid pattern passed to `matches`.
	Regex,
}

/// Evaluation failure with a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct QueryError {
	pub kind: QueryErrorKind,
	pub message: String,
}

impl QueryError {
	pub fn new(kind: QueryErrorKind, message: impl Into<String>) -> Self {
		Self {
			kind,
			message: message.into(),
		}
	}

	pub fn syntax(message: impl Into<String>) -> Self {
		Self::new(QueryErrorKind::Syntax, message)
	}

	pub fn type_error(message: impl Into<String>) -> Self {
		Self::new(QueryErrorKind::Type, message)
	}
}
