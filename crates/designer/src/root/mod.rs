//! Composition root.
//!
//! [`DesignerRoot`] owns one instance of every component and wires them
//! together: the code area feeds the parse model, the active tab and the
//! compilation unit feed the query subscriber, and every panel is attached
//! to one selection channel.

use std::cell::{Ref, RefCell};
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use quarry_language::LanguageRegistry;
use quarry_query::{QueryEngine, XPathEngine};
use quarry_reactive::{Category, Clock, MessageChannel, Subscription, Var};
use quarry_tree::{LanguageVersion, ParseError, ResolutionContext};
use tracing::{debug, info};

use crate::config::DesignerConfig;
use crate::event_log::EventLog;
use crate::panels::{AttributePanel, CodeAreaPanel, ResultListPanel, ScopePanel, TreeViewPanel};
use crate::parse_model::{ParseModel, Tree};
use crate::query::{EvaluationResult, QueryState, QueryUpdateSubscriber};
use crate::runtime::pump::{PumpReport, run_pump_cycle};
use crate::selection::{NodeSelectionEvent, SelectionSynchronizer};
use crate::settings::{self, PersistentSettings, RecentFiles, Settings, SettingsError};
use crate::tabs::{QueryTab, QueryTabs, TabError};
use crate::test_case::{LiveTestCase, TestCaseRunner, TestStatus};

pub struct DesignerRoot {
	config: DesignerConfig,
	clock: Rc<dyn Clock>,
	registry: Rc<LanguageRegistry>,
	engine: Rc<dyn QueryEngine>,

	event_log: Arc<EventLog>,
	developer_mode: Var<bool>,
	developer_flag: Arc<AtomicBool>,

	parse_model: ParseModel,
	tabs: RefCell<QueryTabs>,
	subscriber: QueryUpdateSubscriber,
	synchronizer: SelectionSynchronizer,

	code_area: Rc<CodeAreaPanel>,
	tree_view: Rc<TreeViewPanel>,
	attributes: Rc<AttributePanel>,
	scopes: Rc<ScopePanel>,
	results: Rc<ResultListPanel>,

	recent_files: RefCell<RecentFiles>,
	_subscriptions: Vec<Subscription>,
}

impl DesignerRoot {
	pub const LANGUAGE_KEY: &'static str = "language_version";
	pub const DEVELOPER_MODE_KEY: &'static str = "developer_mode";

	/// A designer with the built-in languages and query engine.
	pub fn new(config: DesignerConfig, clock: Rc<dyn Clock>) -> Result<Self, ParseError> {
		Self::with_collaborators(
			config,
			clock,
			Rc::new(LanguageRegistry::with_defaults()),
			Rc::new(XPathEngine::new()),
		)
	}

	/// Fails if `config.default_language` has no registered parser.
	pub fn with_collaborators(
		config: DesignerConfig,
		clock: Rc<dyn Clock>,
		registry: Rc<LanguageRegistry>,
		engine: Rc<dyn QueryEngine>,
	) -> Result<Self, ParseError> {
		let language = registry.parse_version(&config.default_language)?;
		let timings = config.timings;

		let event_log = Arc::new(EventLog::new());
		let developer_mode = Var::new(config.developer_mode);
		let developer_flag = Arc::new(AtomicBool::new(config.developer_mode));

		let parse_model = ParseModel::new(registry.clone(), event_log.clone(), clock.clone(), timings.null_veto);
		parse_model.set_language_version(Some(language));

		let tabs = QueryTabs::new();
		let subscriber = QueryUpdateSubscriber::new(
			engine.clone(),
			event_log.clone(),
			clock.clone(),
			parse_model.compilation_unit(),
			tabs.active().state(),
			timings.query_debounce,
		);

		let channel = MessageChannel::new(Category::SelectionEvent, clock.clone())
			.with_audit(event_log.clone(), developer_mode.clone());
		channel.set_dedup_window(timings.dedup_window);
		let synchronizer = SelectionSynchronizer::new(channel.clone(), parse_model.compilation_unit());

		let code_area = Rc::new(CodeAreaPanel::new(channel.clone(), parse_model.clone(), timings.source_debounce));
		let tree_view = Rc::new(TreeViewPanel::new(channel.clone()));
		let attributes = Rc::new(AttributePanel::new(channel.clone()));
		let scopes = Rc::new(ScopePanel::new(channel.clone()));
		let results = Rc::new(ResultListPanel::new(channel));

		tree_view.set_tree(parse_model.compilation_unit().get());
		results.show(&subscriber.result().get());
		synchronizer.attach(&code_area);
		synchronizer.attach(&tree_view);
		synchronizer.attach(&attributes);
		synchronizer.attach(&scopes);
		synchronizer.attach(&results);

		let subscriptions = vec![
			parse_model.compilation_unit().subscribe({
				let tree_view = Rc::downgrade(&tree_view);
				move |tree: &Tree| {
					if let Some(tree_view) = tree_view.upgrade() {
						tree_view.set_tree(tree.clone());
					}
				}
			}),
			subscriber.result().subscribe({
				let results = Rc::downgrade(&results);
				move |result: &EvaluationResult| {
					if let Some(results) = results.upgrade() {
						results.show(result);
					}
				}
			}),
			developer_mode.subscribe({
				let flag = developer_flag.clone();
				move |on: &bool| flag.store(*on, Ordering::Relaxed)
			}),
		];

		info!(%language, developer_mode = config.developer_mode, "designer.started");
		Ok(Self {
			recent_files: RefCell::new(RecentFiles::new(config.recent_files_limit)),
			config,
			clock,
			registry,
			engine,
			event_log,
			developer_mode,
			developer_flag,
			parse_model,
			tabs: RefCell::new(tabs),
			subscriber,
			synchronizer,
			code_area,
			tree_view,
			attributes,
			scopes,
			results,
			_subscriptions: subscriptions,
		})
	}

	pub fn config(&self) -> &DesignerConfig {
		&self.config
	}

	pub fn clock(&self) -> &Rc<dyn Clock> {
		&self.clock
	}

	pub fn registry(&self) -> &LanguageRegistry {
		&self.registry
	}

	pub fn event_log(&self) -> &Arc<EventLog> {
		&self.event_log
	}

	/// Flag an [`EventLogLayer`](crate::EventLogLayer) reads; follows
	/// [`Self::set_developer_mode`].
	pub fn developer_flag(&self) -> Arc<AtomicBool> {
		self.developer_flag.clone()
	}

	pub fn developer_mode(&self) -> bool {
		self.developer_mode.get()
	}

	/// Turns verbose logging of selection traffic and internal events on or off.
	pub fn set_developer_mode(&self, on: bool) {
		self.developer_mode.set(on);
	}

	pub fn parse_model(&self) -> &ParseModel {
		&self.parse_model
	}

	pub fn query_subscriber(&self) -> &QueryUpdateSubscriber {
		&self.subscriber
	}

	pub fn synchronizer(&self) -> &SelectionSynchronizer {
		&self.synchronizer
	}

	pub fn selection_channel(&self) -> &MessageChannel<NodeSelectionEvent> {
		self.synchronizer.channel()
	}

	pub fn code_area(&self) -> &Rc<CodeAreaPanel> {
		&self.code_area
	}

	pub fn tree_view(&self) -> &Rc<TreeViewPanel> {
		&self.tree_view
	}

	pub fn attributes(&self) -> &Rc<AttributePanel> {
		&self.attributes
	}

	pub fn scopes(&self) -> &Rc<ScopePanel> {
		&self.scopes
	}

	pub fn results(&self) -> &Rc<ResultListPanel> {
		&self.results
	}

	pub fn language_version(&self) -> Option<LanguageVersion> {
		self.parse_model.language_version()
	}

	/// Switches language and version, e.g. `"java 17"`.
	pub fn set_language(&self, spec: &str) -> Result<LanguageVersion, ParseError> {
		let version = self.registry.parse_version(spec)?;
		self.parse_model.set_language_version(Some(version));
		Ok(version)
	}

	pub fn set_resolution_context(&self, context: ResolutionContext) {
		self.parse_model.set_resolution_context(context);
	}

	/// Replaces the edited source and reparses immediately.
	pub fn load_source(&self, text: impl Into<String>) {
		self.code_area.load(text);
	}

	/// Loads `path` into the code area and records it as recently opened.
	pub fn open_file(&self, path: &Path) -> std::io::Result<()> {
		let text = std::fs::read_to_string(path)?;
		debug!(path = %path.display(), len = text.len(), "designer.open_file");
		self.load_source(text);
		self.recent_files.borrow_mut().push(path);
		Ok(())
	}

	pub fn recent_files(&self) -> Ref<'_, RecentFiles> {
		self.recent_files.borrow()
	}

	pub fn tabs(&self) -> Ref<'_, QueryTabs> {
		self.tabs.borrow()
	}

	/// Query of the active tab.
	pub fn query(&self) -> Var<QueryState> {
		self.tabs.borrow().active().state()
	}

	pub fn add_tab(&self, name: Option<String>, state: QueryState) -> usize {
		self.tabs.borrow_mut().add(name, state)
	}

	/// Makes another tab feed the query pipeline.
	pub fn activate_tab(&self, index: usize) -> Result<(), TabError> {
		let changed = self.tabs.borrow_mut().activate(index)?;
		if changed {
			self.retarget();
		}
		Ok(())
	}

	pub fn close_tab(&self, index: usize) -> Result<QueryTab, TabError> {
		let was_active = self.tabs.borrow().active_index() == index;
		let closed = self.tabs.borrow_mut().close(index)?;
		if was_active {
			self.retarget();
		}
		Ok(closed)
	}

	pub fn rename_tab(&self, index: usize, name: impl Into<String>) -> Result<(), TabError> {
		self.tabs.borrow_mut().rename(index, name)
	}

	/// Runs `case` against the active tab's query.
	pub fn run_test_case(&self, case: &LiveTestCase) -> TestStatus {
		TestCaseRunner::new(self.registry.clone(), self.engine.clone(), self.event_log.clone())
			.with_context(self.parse_model.resolution_context())
			.run(case, &self.query().get())
	}

	/// Runs every phase whose time has come. See [`crate::runtime::pump`].
	pub fn pump(&self) -> PumpReport {
		run_pump_cycle(self)
	}

	/// Earliest instant at which [`Self::pump`] has work.
	pub fn next_deadline(&self) -> Option<Instant> {
		[
			self.code_area.next_deadline(),
			self.parse_model.next_deadline(),
			self.subscriber.next_deadline(),
		]
		.into_iter()
		.flatten()
		.min()
	}

	fn retarget(&self) {
		let query = self.query();
		debug!(tab = self.tabs.borrow().active().name(), "designer.tab_activated");
		self.subscriber.retarget(query);
	}
}

impl PersistentSettings for DesignerRoot {
	fn persist(&self) -> Settings {
		let mut out = Settings::new();
		if let Some(version) = self.language_version() {
			settings::write(&mut out, Self::LANGUAGE_KEY, &version.to_string());
		}
		settings::write(&mut out, Self::DEVELOPER_MODE_KEY, &self.developer_mode());
		out.extend(self.tabs.borrow().persist());
		out.extend(self.recent_files.borrow().persist());
		out
	}

	fn restore(&mut self, stored: &Settings) -> Result<(), SettingsError> {
		if let Some(spec) = settings::read::<String>(stored, Self::LANGUAGE_KEY)? {
			self.set_language(&spec)
				.map_err(|err| SettingsError::invalid(Self::LANGUAGE_KEY, err.to_string()))?;
		}
		if let Some(on) = settings::read::<bool>(stored, Self::DEVELOPER_MODE_KEY)? {
			self.set_developer_mode(on);
		}
		self.tabs.get_mut().restore(stored)?;
		self.recent_files.get_mut().restore(stored)?;
		self.retarget();
		Ok(())
	}
}

#[cfg(test)]
mod tests;
