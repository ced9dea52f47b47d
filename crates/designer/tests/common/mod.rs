//! Shared fixtures for the designer integration tests.

#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use quarry_designer::{DesignerConfig, DesignerRoot, Timings};
use quarry_language::LanguageRegistry;
use quarry_query::{Properties, QueryEngine, QueryError, XPathEngine, XPathVersion};
use quarry_reactive::ManualClock;
use quarry_tree::{NodeRef, SyntaxTree};

pub const DEBOUNCE: Duration = Duration::from_millis(100);

/// Query engine that counts its calls.
#[derive(Default)]
pub struct CountingEngine {
	engine: XPathEngine,
	calls: Cell<usize>,
	last_expression: std::cell::RefCell<Option<String>>,
}

impl CountingEngine {
	pub fn calls(&self) -> usize {
		self.calls.get()
	}

	pub fn last_expression(&self) -> Option<String> {
		self.last_expression.borrow().clone()
	}
}

impl QueryEngine for CountingEngine {
	fn evaluate(
		&self,
		tree: &Arc<SyntaxTree>,
		version: XPathVersion,
		expression: &str,
		properties: &Properties,
	) -> Result<Vec<NodeRef>, QueryError> {
		self.calls.set(self.calls.get() + 1);
		*self.last_expression.borrow_mut() = Some(expression.to_string());
		self.engine.evaluate(tree, version, expression, properties)
	}
}

pub struct Harness {
	pub clock: ManualClock,
	pub engine: Rc<CountingEngine>,
	pub root: DesignerRoot,
}

impl Harness {
	pub fn new() -> Self {
		Self::with_timings(Timings::default())
	}

	pub fn with_timings(timings: Timings) -> Self {
		let clock = ManualClock::new();
		let engine = Rc::new(CountingEngine::default());
		let config = DesignerConfig {
			timings,
			..DesignerConfig::default()
		};
		let root = DesignerRoot::with_collaborators(
			config,
			Rc::new(clock.clone()),
			Rc::new(LanguageRegistry::with_defaults()),
			engine.clone(),
		)
		.expect("java is registered");
		Self { clock, engine, root }
	}

	/// Lets every debounce window elapse and pumps until idle.
	pub fn settle(&self) {
		for _ in 0..3 {
			self.clock.advance(DEBOUNCE);
			self.root.pump();
		}
	}

	pub fn set_expression(&self, expression: &str) {
		let query = self.root.query();
		let mut state = query.get();
		state.expression = expression.to_string();
		query.set(state);
	}

	/// First node of `kind` in the current compilation unit.
	pub fn node(&self, kind: &str) -> NodeRef {
		let tree = self.root.parse_model().compilation_unit().get().expect("tree");
		let idx = tree
			.descendants(tree.root())
			.find(|&i| tree.kind(i) == kind)
			.unwrap_or_else(|| panic!("no {kind} in tree"));
		NodeRef::new(tree, idx)
	}
}
