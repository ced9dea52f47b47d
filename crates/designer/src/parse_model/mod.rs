//! The single authoritative parse of the edited source.
//!
//! Three inputs (source text, language version, resolution context) feed a
//! recompute that either publishes a tree or a parse error, never both.
//! Consumers that should not flicker while the user is mid-keystroke read
//! [`ParseModel::compilation_unit`], which holds back a transition to "no
//! tree" for the null-veto window.

use std::cell::{Cell, RefCell};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::{Rc, Weak};
use std::sync::Arc;
use std::time::{Duration, Instant};

use quarry_reactive::{AuditEntry, AuditSink, Category, Clock, NullVeto, Subscription, Var, VetoDecision};
use quarry_tree::{LanguageVersion, ParseError, ParserProvider, ResolutionContext, SyntaxTree};
use tracing::{debug, trace};

use crate::sanitize::{error_chain, sanitize_message};

/// Shared tree handle published by the model.
pub type Tree = Option<Arc<SyntaxTree>>;

/// Input tuple a recompute is keyed on.
#[derive(Debug, Clone, PartialEq, Eq)]
struct InputKey {
	source: String,
	language: Option<LanguageVersion>,
	context: ResolutionContext,
}

struct Inner {
	parsers: Rc<dyn ParserProvider>,
	audit: Arc<dyn AuditSink>,
	clock: Rc<dyn Clock>,

	source: Var<String>,
	language: Var<Option<LanguageVersion>>,
	context: Var<ResolutionContext>,

	tree: Var<Tree>,
	error: Var<Option<ParseError>>,
	compilation_unit: Var<Tree>,
	veto: RefCell<NullVeto>,

	last_input: RefCell<Option<InputKey>>,
	recomputes: Cell<u64>,
	subscriptions: RefCell<Vec<Subscription>>,
}

/// Parse state of the edited source.
///
/// Clones are handles to the same model.
#[derive(Clone)]
pub struct ParseModel {
	inner: Rc<Inner>,
}

impl ParseModel {
	pub fn new(parsers: Rc<dyn ParserProvider>, audit: Arc<dyn AuditSink>, clock: Rc<dyn Clock>, null_veto: Duration) -> Self {
		let model = Self {
			inner: Rc::new(Inner {
				parsers,
				audit,
				clock,
				source: Var::default(),
				language: Var::default(),
				context: Var::default(),
				tree: Var::default(),
				error: Var::default(),
				compilation_unit: Var::default(),
				veto: RefCell::new(NullVeto::new(null_veto)),
				last_input: RefCell::new(None),
				recomputes: Cell::new(0),
				subscriptions: RefCell::new(Vec::new()),
			}),
		};
		model.wire();
		model
	}

	fn wire(&self) {
		let inner = &self.inner;
		let subs = vec![
			inner.source.subscribe(recompute_on_change(&self.inner)),
			inner.language.subscribe(recompute_on_change(&self.inner)),
			inner.context.subscribe(recompute_on_change(&self.inner)),
			inner.tree.subscribe({
				let weak = Rc::downgrade(&self.inner);
				move |tree: &Tree| {
					if let Some(inner) = weak.upgrade() {
						Self { inner }.offer(tree.clone());
					}
				}
			}),
		];
		inner.subscriptions.borrow_mut().extend(subs);
	}

	pub fn set_source_text(&self, text: impl Into<String>) {
		self.inner.source.set(text.into());
	}

	/// Selects the language. `None` leaves the model without a tree.
	pub fn set_language_version(&self, version: Option<LanguageVersion>) {
		self.inner.language.set(version);
	}

	pub fn set_resolution_context(&self, context: ResolutionContext) {
		self.inner.context.set(context);
	}

	pub fn source_text(&self) -> String {
		self.inner.source.get()
	}

	pub fn language_version(&self) -> Option<LanguageVersion> {
		self.inner.language.get()
	}

	pub fn resolution_context(&self) -> ResolutionContext {
		self.inner.context.get()
	}

	/// Latest tree, without veto. `None` while the source is blank, the
	/// language is unset or the last parse failed.
	pub fn tree(&self) -> Var<Tree> {
		self.inner.tree.clone()
	}

	/// Error of the last parse. Never set together with [`Self::tree`].
	pub fn parse_error(&self) -> Var<Option<ParseError>> {
		self.inner.error.clone()
	}

	/// Tree for consumers that tolerate a short-lived stale tree better
	/// than flicker.
	pub fn compilation_unit(&self) -> Var<Tree> {
		self.inner.compilation_unit.clone()
	}

	/// Publishes a held-back `None` once the veto window elapsed.
	///
	/// Returns true if the compilation unit changed.
	pub fn poll(&self, now: Instant) -> bool {
		if !self.inner.veto.borrow_mut().poll(now) {
			return false;
		}
		trace!("parse.null_published");
		self.inner.compilation_unit.set(None)
	}

	pub fn next_deadline(&self) -> Option<Instant> {
		self.inner.veto.borrow().deadline()
	}

	/// Number of recomputes run so far, skipped ones excluded.
	pub fn recompute_count(&self) -> u64 {
		self.inner.recomputes.get()
	}

	fn offer(&self, tree: Tree) {
		let now = self.inner.clock.now();
		let decision = self.inner.veto.borrow_mut().offer(tree.as_ref(), now);
		match decision {
			VetoDecision::Publish => {
				self.inner.compilation_unit.set(tree);
			}
			VetoDecision::Hold => trace!("parse.null_held"),
		}
	}

	fn recompute(&self) {
		let key = InputKey {
			source: self.inner.source.get(),
			language: self.inner.language.get(),
			context: self.inner.context.get(),
		};
		if self.inner.last_input.borrow().as_ref() == Some(&key) {
			return;
		}
		*self.inner.last_input.borrow_mut() = Some(key.clone());
		self.inner.recomputes.set(self.inner.recomputes.get() + 1);

		let Some(version) = key.language.filter(|_| !key.source.trim().is_empty()) else {
			self.inner.error.set(None);
			self.inner.tree.set(None);
			return;
		};

		match self.parse(&key.source, version, &key.context) {
			Ok(tree) => {
				self.inner.error.set(None);
				self.inner.tree.set(Some(Arc::new(tree)));
				debug!(%version, "parse.succeeded");
				self.inner.audit.record(AuditEntry::new(Category::ParseOk, format!("parsed as {version}")));
			}
			Err(err) => {
				self.inner.tree.set(None);
				debug!(%version, error = %err, "parse.failed");
				self.inner.audit.record(
					AuditEntry::new(Category::ParseException, sanitize_message(&err.to_string())).with_detail(error_chain(&err)),
				);
				self.inner.error.set(Some(err));
			}
		}
	}

	fn parse(&self, source: &str, version: LanguageVersion, context: &ResolutionContext) -> Result<SyntaxTree, ParseError> {
		parse_with_passes(&*self.inner.parsers, &*self.inner.audit, source, version, context)
	}
}

/// Parses `source` and runs the parser's post-parse passes over the result.
///
/// A failing or panicking pass is reported to `audit` and skipped; the tree
/// is still returned.
pub(crate) fn parse_with_passes(
	parsers: &dyn ParserProvider,
	audit: &dyn AuditSink,
	source: &str,
	version: LanguageVersion,
	context: &ResolutionContext,
) -> Result<SyntaxTree, ParseError> {
	let parser = parsers
		.parser(version.language)
		.ok_or_else(|| ParseError::UnknownLanguage(version.language.to_string()))?;
	let mut tree = parser.parse(source, version)?;

	for pass in parser.passes() {
		let outcome = catch_unwind(AssertUnwindSafe(|| pass.run(&mut tree, context)));
		let failure = match outcome {
			Ok(Ok(())) => continue,
			Ok(Err(err)) => err.to_string(),
			Err(_) => format!("{} panicked", pass.name()),
		};
		debug!(pass = pass.name(), reason = %failure, "parse.pass_failed");
		audit.record(AuditEntry::new(Category::PostParsePass, format!("{}: {failure}", pass.name())));
	}
	Ok(tree)
}

fn recompute_on_change<T: 'static>(inner: &Rc<Inner>) -> impl Fn(&T) + 'static {
	let weak: Weak<Inner> = Rc::downgrade(inner);
	move |_: &T| {
		if let Some(inner) = weak.upgrade() {
			ParseModel { inner }.recompute();
		}
	}
}
