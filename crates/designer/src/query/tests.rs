use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use quarry_language::LanguageRegistry;
use quarry_query::{Properties, QueryEngine, QueryError, QueryErrorKind, XPathEngine, XPathVersion};
use quarry_reactive::{Clock, ManualClock, NullAuditSink, Var};
use quarry_tree::{NodeRef, SyntaxTree};

use super::*;
use crate::parse_model::ParseModel;

const DEBOUNCE: Duration = Duration::from_millis(100);

/// Engine that records every expression it is asked to evaluate.
#[derive(Default)]
struct RecordingEngine {
	engine: XPathEngine,
	calls: RefCell<Vec<String>>,
}

impl QueryEngine for RecordingEngine {
	fn evaluate(
		&self,
		tree: &Arc<SyntaxTree>,
		version: XPathVersion,
		expression: &str,
		properties: &Properties,
	) -> Result<Vec<NodeRef>, QueryError> {
		self.calls.borrow_mut().push(expression.to_string());
		self.engine.evaluate(tree, version, expression, properties)
	}
}

struct Fixture {
	clock: ManualClock,
	model: ParseModel,
	query: Var<QueryState>,
	engine: Rc<RecordingEngine>,
	subscriber: QueryUpdateSubscriber,
}

fn fixture(source: &str) -> Fixture {
	let clock = ManualClock::new();
	let registry = Rc::new(LanguageRegistry::with_defaults());
	let model = ParseModel::new(registry.clone(), Arc::new(NullAuditSink), Rc::new(clock.clone()), Duration::ZERO);
	model.set_language_version(registry.default_version("java").ok());
	model.set_source_text(source);

	let query = Var::new(QueryState::default());
	let engine = Rc::new(RecordingEngine::default());
	let subscriber = QueryUpdateSubscriber::new(
		engine.clone(),
		Arc::new(NullAuditSink),
		Rc::new(clock.clone()),
		model.compilation_unit(),
		query.clone(),
		DEBOUNCE,
	);
	Fixture {
		clock,
		model,
		query,
		engine,
		subscriber,
	}
}

impl Fixture {
	fn settle(&self) -> bool {
		self.clock.advance(DEBOUNCE);
		self.subscriber.poll(self.clock.now())
	}

	fn set_expression(&self, expression: &str) {
		let mut state = self.query.get();
		state.expression = expression.to_string();
		self.query.set(state);
	}
}

#[test]
fn finds_the_field_declaration() {
	let f = fixture("class Foo { int i = 0; }");
	f.set_expression("//FieldDeclaration");
	assert!(f.settle());

	let result = f.subscriber.result().get();
	assert!(result.is_success());
	let texts: Vec<_> = result.nodes().iter().map(|n| n.text().to_string()).collect();
	assert_eq!(texts, ["int i = 0;"]);
}

#[test]
fn blank_source_yields_no_compilation_unit() {
	let f = fixture("");
	f.set_expression("//FieldDeclaration");
	f.settle();
	assert_eq!(f.subscriber.result().get(), EvaluationResult::NoCompilationUnit);
	assert_eq!(f.subscriber.evaluation_count(), 0);
}

#[test]
fn blank_query_never_calls_the_engine() {
	let f = fixture("class Foo {}");
	assert!(f.settle());
	assert_eq!(f.subscriber.result().get(), EvaluationResult::NoQuery);
	f.set_expression("   ");
	f.settle();
	assert_eq!(f.subscriber.result().get(), EvaluationResult::NoQuery);
	assert!(f.engine.calls.borrow().is_empty());
}

#[test]
fn a_burst_of_edits_evaluates_once_with_the_last_expression() {
	let f = fixture("class Foo { int i = 0; }");
	f.settle();
	for partial in ["/", "//", "//Field", "//FieldDecl", "//FieldDeclaration"] {
		f.set_expression(partial);
		f.clock.advance(Duration::from_millis(30));
		assert!(!f.subscriber.poll(f.clock.now()));
	}
	assert_eq!(f.subscriber.next_deadline(), Some(f.clock.now() + Duration::from_millis(70)));
	assert!(f.settle());
	assert_eq!(*f.engine.calls.borrow(), ["//FieldDeclaration"]);
}

#[test]
fn a_reverted_edit_is_not_reevaluated() {
	let f = fixture("class Foo { int i = 0; }");
	f.set_expression("//FieldDeclaration");
	f.settle();
	f.set_expression("//FieldDeclaration[1]");
	f.set_expression("//FieldDeclaration");
	assert!(!f.settle());
	assert_eq!(f.subscriber.evaluation_count(), 1);
}

#[test]
fn errors_are_sanitized_and_name_the_missing_property() {
	let f = fixture("class Foo { int i = 0; }");
	f.set_expression("//VariableDeclarator[@Name = $foo]");
	f.settle();

	let result = f.subscriber.result().get();
	let error = result.error().expect("error result");
	assert_eq!(error.kind, QueryErrorKind::UndeclaredVariable);
	assert_eq!(error.message, "Undeclared variable in XPath expression: $foo");
	assert_eq!(error.missing_property.as_deref(), Some("foo"));

	f.query.set(f.query.get().with_property("foo", "i"));
	// The error stays up until the next result replaces it.
	assert_eq!(f.subscriber.result().get(), result);
	f.settle();
	assert_eq!(f.subscriber.result().get().nodes().len(), 1);
}

#[test]
fn dialect_is_part_of_the_tuple() {
	let f = fixture("class Foo { int i = 0; }");
	f.set_expression("//VariableDeclarator[@Name = $foo]");
	f.settle();
	f.query.set(f.query.get().with_version(XPathVersion::V1));
	f.settle();
	let result = f.subscriber.result().get();
	assert_eq!(result.error().map(|e| e.message.as_str()), Some("Variable foo"));
	assert_eq!(f.subscriber.evaluation_count(), 2);
}

#[test]
fn tree_changes_trigger_reevaluation() {
	let f = fixture("class Foo { int i = 0; }");
	f.set_expression("//FieldDeclaration");
	f.settle();
	f.model.set_source_text("class Foo { int i = 0; int j = 1; }");
	assert!(f.subscriber.next_deadline().is_some());
	f.settle();
	assert_eq!(f.subscriber.result().get().nodes().len(), 2);

	f.model.set_source_text("");
	f.settle();
	assert_eq!(f.subscriber.result().get(), EvaluationResult::NoCompilationUnit);
}

#[test]
fn retargeting_reads_the_new_query() {
	let f = fixture("class Foo { int i = 0; void m() {} }");
	f.set_expression("//FieldDeclaration");
	f.settle();

	let other = Var::new(QueryState::new("//MethodDeclaration"));
	f.subscriber.retarget(other.clone());
	f.settle();
	assert_eq!(f.subscriber.result().get().nodes()[0].kind(), "MethodDeclaration");

	// The old query no longer drives evaluation.
	f.set_expression("//ClassDeclaration");
	assert_eq!(f.subscriber.next_deadline(), None);
	assert_eq!(f.subscriber.query().get(), other.get());
}
