use quarry_query::{QueryError, QueryErrorKind, XPathVersion, extract_missing_property_name};
use quarry_tree::NodeRef;

use crate::sanitize::sanitize_message;

/// Outcome of the latest evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EvaluationResult {
	/// There is no tree to evaluate against.
	#[default]
	NoCompilationUnit,
	/// The query expression is blank.
	NoQuery,
	Success(Vec<NodeRef>),
	Error(EvaluationError),
}

impl EvaluationResult {
	/// Matched nodes; empty unless the evaluation succeeded.
	pub fn nodes(&self) -> &[NodeRef] {
		match self {
			Self::Success(nodes) => nodes,
			_ => &[],
		}
	}

	pub fn error(&self) -> Option<&EvaluationError> {
		match self {
			Self::Error(err) => Some(err),
			_ => None,
		}
	}

	pub fn is_success(&self) -> bool {
		matches!(self, Self::Success(_))
	}
}

/// Evaluation failure prepared for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationError {
	pub kind: QueryErrorKind,
	/// Sanitized message.
	pub message: String,
	/// Property the expression refers to without a binding.
	pub missing_property: Option<String>,
}

impl EvaluationError {
	pub fn from_query_error(err: &QueryError, version: XPathVersion) -> Self {
		let message = sanitize_message(&err.message);
		let missing_property = extract_missing_property_name(&message, version);
		Self {
			kind: err.kind,
			message,
			missing_property,
		}
	}
}
