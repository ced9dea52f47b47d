use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::sync::Arc;
use std::time::{Duration, Instant};

use quarry_query::QueryEngine;
use quarry_reactive::{AuditEntry, AuditSink, Category, Clock, Debouncer, Subscription, Var};
use quarry_tree::{SyntaxTree, TreeId};
use tracing::{debug, trace};

use super::evaluation::{EvaluationError, EvaluationResult};
use super::state::QueryState;
use crate::parse_model::Tree;

/// Tuple an evaluation is keyed on.
type EvaluationKey = (Option<TreeId>, QueryState);

struct Inner {
	engine: Rc<dyn QueryEngine>,
	audit: Arc<dyn AuditSink>,
	clock: Rc<dyn Clock>,

	compilation_unit: Var<Tree>,
	query: RefCell<Var<QueryState>>,
	result: Var<EvaluationResult>,

	tree_changes: RefCell<Debouncer<()>>,
	query_changes: RefCell<Debouncer<()>>,

	last_key: RefCell<Option<EvaluationKey>>,
	evaluations: Cell<u64>,
	tree_subscription: RefCell<Option<Subscription>>,
	query_subscription: RefCell<Option<Subscription>>,
}

/// Keeps [`EvaluationResult`] consistent with the current tree and query.
///
/// Tree and query changes are debounced separately; whichever fires reads
/// both inputs as they are at that moment. A tuple that was already
/// evaluated is not evaluated again, so a burst of edits costs one engine
/// call. The previous result stays published until a new one replaces it.
///
/// Clones are handles to the same subscriber.
#[derive(Clone)]
pub struct QueryUpdateSubscriber {
	inner: Rc<Inner>,
}

impl QueryUpdateSubscriber {
	pub fn new(
		engine: Rc<dyn QueryEngine>,
		audit: Arc<dyn AuditSink>,
		clock: Rc<dyn Clock>,
		compilation_unit: Var<Tree>,
		query: Var<QueryState>,
		debounce: Duration,
	) -> Self {
		let subscriber = Self {
			inner: Rc::new(Inner {
				engine,
				audit,
				clock,
				compilation_unit,
				query: RefCell::new(query),
				result: Var::default(),
				tree_changes: RefCell::new(Debouncer::new(debounce)),
				query_changes: RefCell::new(Debouncer::new(debounce)),
				last_key: RefCell::new(None),
				evaluations: Cell::new(0),
				tree_subscription: RefCell::new(None),
				query_subscription: RefCell::new(None),
			}),
		};

		let weak = Rc::downgrade(&subscriber.inner);
		let tree_subscription = subscriber.inner.compilation_unit.subscribe(move |_: &Tree| {
			if let Some(inner) = weak.upgrade() {
				let now = inner.clock.now();
				inner.tree_changes.borrow_mut().trigger((), now);
			}
		});
		*subscriber.inner.tree_subscription.borrow_mut() = Some(tree_subscription);
		subscriber.watch_query();

		// The inputs' current values count as the first change.
		let now = subscriber.inner.clock.now();
		subscriber.inner.tree_changes.borrow_mut().trigger((), now);
		subscriber
	}

	/// Current evaluation result.
	pub fn result(&self) -> Var<EvaluationResult> {
		self.inner.result.clone()
	}

	/// Query currently feeding evaluations.
	pub fn query(&self) -> Var<QueryState> {
		self.inner.query.borrow().clone()
	}

	/// Switches to another query source, e.g. when the active tab changes.
	///
	/// Counts as a query change.
	pub fn retarget(&self, query: Var<QueryState>) {
		*self.inner.query.borrow_mut() = query;
		self.watch_query();
		let now = self.inner.clock.now();
		self.inner.query_changes.borrow_mut().trigger((), now);
	}

	/// Evaluates if a debounce window elapsed.
	///
	/// Returns true if a new result was published.
	pub fn poll(&self, now: Instant) -> bool {
		let tree_fired = self.inner.tree_changes.borrow_mut().poll(now).is_some();
		let query_fired = self.inner.query_changes.borrow_mut().poll(now).is_some();
		if tree_fired || query_fired {
			self.refresh()
		} else {
			false
		}
	}

	pub fn next_deadline(&self) -> Option<Instant> {
		let tree = self.inner.tree_changes.borrow().deadline();
		let query = self.inner.query_changes.borrow().deadline();
		tree.into_iter().chain(query).min()
	}

	/// Evaluates now, unless the current tuple was already evaluated.
	///
	/// Returns true if a new result was published.
	pub fn refresh(&self) -> bool {
		let tree = self.inner.compilation_unit.get();
		let query = self.query().get();
		let key = (tree.as_ref().map(|t| t.id()), query.clone());
		if self.inner.last_key.borrow().as_ref() == Some(&key) {
			trace!("query.unchanged");
			return false;
		}
		*self.inner.last_key.borrow_mut() = Some(key);

		let result = match tree {
			None => EvaluationResult::NoCompilationUnit,
			Some(_) if query.is_blank() => EvaluationResult::NoQuery,
			Some(tree) => self.evaluate(&tree, &query),
		};
		self.inner.result.set(result)
	}

	/// Number of engine calls made so far.
	pub fn evaluation_count(&self) -> u64 {
		self.inner.evaluations.get()
	}

	fn evaluate(&self, tree: &Arc<SyntaxTree>, query: &QueryState) -> EvaluationResult {
		self.inner.evaluations.set(self.inner.evaluations.get() + 1);
		match self
			.inner
			.engine
			.evaluate(tree, query.version, &query.expression, &query.properties)
		{
			Ok(nodes) => {
				debug!(matches = nodes.len(), version = %query.version, "query.evaluated");
				self.inner.audit.record(AuditEntry::new(
					Category::QueryOk,
					format!("{} matches for {}", nodes.len(), query.expression),
				));
				EvaluationResult::Success(nodes)
			}
			Err(err) => {
				debug!(error = %err, version = %query.version, "query.failed");
				let error = EvaluationError::from_query_error(&err, query.version);
				self.inner.audit.record(
					AuditEntry::new(Category::QueryEvaluation, error.message.clone())
						.with_detail(format!("{:?} in {}: {}", err.kind, query.expression, err.message)),
				);
				EvaluationResult::Error(error)
			}
		}
	}

	fn watch_query(&self) {
		let weak: Weak<Inner> = Rc::downgrade(&self.inner);
		let subscription = self.inner.query.borrow().subscribe(move |_: &QueryState| {
			if let Some(inner) = weak.upgrade() {
				let now = inner.clock.now();
				inner.query_changes.borrow_mut().trigger((), now);
			}
		});
		// Dropping the previous subscription detaches from the old query.
		*self.inner.query_subscription.borrow_mut() = Some(subscription);
	}
}
