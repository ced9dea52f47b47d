//! Live test cases: small sources with the lines a rule is expected to flag.

use std::rc::Rc;
use std::sync::Arc;

use quarry_query::{Properties, QueryEngine};
use quarry_reactive::AuditSink;
use quarry_tree::{LanguageVersion, ParserProvider, ResolutionContext};
use tracing::debug;

use crate::parse_model::parse_with_passes;
use crate::query::{EvaluationError, QueryState};
use crate::sanitize::sanitize_error;

/// A source snippet and the violations a query should report on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveTestCase {
	pub description: String,
	pub source: String,
	pub language_version: LanguageVersion,
	/// Begin lines of the expected matches. Order does not matter; a line
	/// flagged twice is listed twice.
	pub expected_violations: Vec<u32>,
	/// Layered over the tab's properties for this case only.
	pub property_overrides: Properties,
}

impl LiveTestCase {
	pub fn new(description: impl Into<String>, source: impl Into<String>, language_version: LanguageVersion) -> Self {
		Self {
			description: description.into(),
			source: source.into(),
			language_version,
			expected_violations: Vec::new(),
			property_overrides: Properties::new(),
		}
	}

	pub fn expecting(mut self, lines: impl IntoIterator<Item = u32>) -> Self {
		self.expected_violations.extend(lines);
		self
	}

	pub fn with_override(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.property_overrides.insert(name.into(), value.into());
		self
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestStatus {
	Pass,
	/// Line lists are sorted.
	Fail { expected: Vec<u32>, actual: Vec<u32> },
	/// The case could not be evaluated. The message is sanitized.
	Error(String),
}

impl TestStatus {
	pub fn is_pass(&self) -> bool {
		matches!(self, Self::Pass)
	}
}

/// Runs test cases against a query, independently of the edited source.
pub struct TestCaseRunner {
	parsers: Rc<dyn ParserProvider>,
	engine: Rc<dyn QueryEngine>,
	audit: Arc<dyn AuditSink>,
	context: ResolutionContext,
}

impl TestCaseRunner {
	pub fn new(parsers: Rc<dyn ParserProvider>, engine: Rc<dyn QueryEngine>, audit: Arc<dyn AuditSink>) -> Self {
		Self {
			parsers,
			engine,
			audit,
			context: ResolutionContext::default(),
		}
	}

	pub fn with_context(mut self, context: ResolutionContext) -> Self {
		self.context = context;
		self
	}

	pub fn run(&self, case: &LiveTestCase, query: &QueryState) -> TestStatus {
		if query.is_blank() {
			return TestStatus::Error("No query".to_string());
		}
		let tree = match parse_with_passes(
			&*self.parsers,
			&*self.audit,
			&case.source,
			case.language_version,
			&self.context,
		) {
			Ok(tree) => Arc::new(tree),
			Err(err) => return TestStatus::Error(sanitize_error(&err)),
		};

		let mut properties = query.properties.clone();
		properties.extend(case.property_overrides.iter().map(|(k, v)| (k.clone(), v.clone())));

		let nodes = match self
			.engine
			.evaluate(&tree, query.version, &query.expression, &properties)
		{
			Ok(nodes) => nodes,
			Err(err) => return TestStatus::Error(EvaluationError::from_query_error(&err, query.version).message),
		};

		let mut actual: Vec<u32> = nodes.iter().map(|n| n.span().begin_line).collect();
		let mut expected = case.expected_violations.clone();
		actual.sort_unstable();
		expected.sort_unstable();

		let status = if actual == expected {
			TestStatus::Pass
		} else {
			TestStatus::Fail { expected, actual }
		};
		debug!(case = %case.description, passed = status.is_pass(), "test_case.ran");
		status
	}
}
