use std::rc::Rc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use pretty_assertions::assert_eq;
use quarry_language::JavaParser;
use quarry_query::XPathVersion;
use quarry_reactive::{Clock, ManualClock};

use super::*;
use crate::selection::NodeSelectionSource;

const SOURCE: &str = "class Foo {
  int i = 0;
  void m() { int j = 1; }
}";

const DEBOUNCE: Duration = Duration::from_millis(100);

fn designer(config: DesignerConfig) -> (ManualClock, DesignerRoot) {
	let clock = ManualClock::new();
	let root = DesignerRoot::new(config, Rc::new(clock.clone())).expect("java is registered");
	(clock, root)
}

fn settle(clock: &ManualClock, root: &DesignerRoot) {
	clock.advance(DEBOUNCE);
	root.pump();
}

fn set_expression(root: &DesignerRoot, expression: &str) {
	root.query().set(QueryState::new(expression));
}

#[test]
fn starts_with_the_configured_language() {
	let (_, root) = designer(DesignerConfig {
		default_language: "java 17".to_string(),
		..DesignerConfig::default()
	});
	assert_eq!(root.language_version().map(|v| v.version), Some("17"));
	assert_eq!(root.tabs().len(), 1);
	assert_eq!(root.results().status(), "No compilation unit");
}

#[test]
fn unknown_languages_are_rejected() {
	let clock = ManualClock::new();
	let config = DesignerConfig {
		default_language: "cobol".to_string(),
		..DesignerConfig::default()
	};
	let err = DesignerRoot::new(config, Rc::new(clock)).err().expect("unknown language");
	assert_eq!(err, ParseError::UnknownLanguage("cobol".to_string()));
}

#[test]
fn source_and_query_reach_the_result_list() {
	let (clock, root) = designer(DesignerConfig::default());
	root.load_source(SOURCE);
	assert!(root.tree_view().tree().is_some());

	set_expression(&root, "//FieldDeclaration");
	root.pump();
	assert_eq!(root.results().status(), "No compilation unit");

	settle(&clock, &root);
	assert_eq!(root.results().status(), "1 match");
	assert_eq!(root.next_deadline(), None);
}

#[test]
fn typing_is_debounced_through_the_pump() {
	let (clock, root) = designer(DesignerConfig::default());
	set_expression(&root, "//LocalVariableDeclaration");
	root.code_area().edit(SOURCE, clock.now());
	assert_eq!(root.next_deadline(), Some(clock.now() + DEBOUNCE));

	settle(&clock, &root);
	assert!(root.parse_model().compilation_unit().get().is_some());
	settle(&clock, &root);
	assert_eq!(root.results().rows().len(), 1);
}

#[test]
fn switching_tabs_retargets_the_pipeline() {
	let (clock, root) = designer(DesignerConfig::default());
	root.load_source(SOURCE);
	set_expression(&root, "//FieldDeclaration");
	let methods = root.add_tab(Some("Methods".to_string()), QueryState::new("//MethodDeclaration"));
	settle(&clock, &root);
	assert_eq!(root.results().rows()[0].kind(), "FieldDeclaration");

	root.activate_tab(methods).unwrap();
	settle(&clock, &root);
	assert_eq!(root.results().rows()[0].kind(), "MethodDeclaration");

	root.close_tab(methods).unwrap();
	settle(&clock, &root);
	assert_eq!(root.results().rows()[0].kind(), "FieldDeclaration");
	assert_eq!(root.close_tab(0).unwrap_err(), TabError::LastTab);
}

#[test]
fn clicking_a_result_focuses_every_panel() {
	let (clock, root) = designer(DesignerConfig::default());
	root.load_source(SOURCE);
	set_expression(&root, "//VariableDeclarator[@Name = 'j']");
	settle(&clock, &root);

	assert!(root.results().select_row(0));
	let node = root.results().rows()[0].clone();
	assert_eq!(root.tree_view().selection().focused(), Some(node.clone()));
	assert_eq!(root.code_area().highlight(), Some(node.span()));
	assert_eq!(root.attributes().title().as_deref(), Some("VariableDeclarator"));
	assert_eq!(root.scopes().rows()[0].declarations[0].name, "j");
}

#[test]
fn whitespace_edits_keep_the_selection() {
	let (clock, root) = designer(DesignerConfig::default());
	root.load_source(SOURCE);
	set_expression(&root, "//VariableDeclarator");
	settle(&clock, &root);
	root.results().select_row(1);

	root.code_area().edit(SOURCE.replace("int j", "int  j"), clock.now());
	settle(&clock, &root);
	let recovered = root.tree_view().selection().focused().expect("recovered");
	assert_eq!(recovered.attribute("Name").map(ToString::to_string).as_deref(), Some("j"));
	assert!(recovered.belongs_to(&root.parse_model().compilation_unit().get().unwrap()));

	settle(&clock, &root);
	assert_eq!(root.results().selected_row(), Some(1));
}

#[test]
fn developer_mode_follows_the_flag() {
	let (_, root) = designer(DesignerConfig::default());
	let flag = root.developer_flag();
	assert!(!flag.load(Ordering::Relaxed));
	root.set_developer_mode(true);
	assert!(flag.load(Ordering::Relaxed));
	assert!(root.developer_mode());
}

#[test]
fn test_cases_run_against_the_active_query() {
	let (_, root) = designer(DesignerConfig::default());
	set_expression(&root, "//FieldDeclaration");
	let case = LiveTestCase::new("one field", SOURCE, JavaParser::default_version()).expecting([2]);
	assert_eq!(root.run_test_case(&case), TestStatus::Pass);
}

#[test]
fn opened_files_become_recent() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("Foo.java");
	std::fs::write(&path, SOURCE).unwrap();

	let (_, root) = designer(DesignerConfig::default());
	root.open_file(&path).unwrap();
	assert_eq!(root.parse_model().source_text(), SOURCE);
	assert_eq!(root.recent_files().latest(), Some(path.as_path()));
	assert!(root.open_file(&dir.path().join("missing.java")).is_err());
}

#[test]
fn settings_round_trip() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("Foo.java");
	std::fs::write(&path, SOURCE).unwrap();

	let (_, root) = designer(DesignerConfig::default());
	root.set_language("java 11").unwrap();
	root.set_developer_mode(true);
	root.query()
		.set(QueryState::new("//Block").with_version(XPathVersion::V1Compat));
	let second = root.add_tab(Some("Fields".to_string()), QueryState::new("//FieldDeclaration"));
	root.activate_tab(second).unwrap();
	root.open_file(&path).unwrap();
	let saved = root.persist();

	let (clock, mut restored) = designer(DesignerConfig::default());
	restored.restore(&saved).unwrap();
	assert_eq!(restored.language_version().map(|v| v.version), Some("11"));
	assert!(restored.developer_mode());
	assert_eq!(restored.tabs().active().name(), "Fields");
	assert_eq!(restored.tabs().get(0).unwrap().state().get().version, XPathVersion::V1Compat);
	assert_eq!(restored.recent_files().latest(), Some(path.as_path()));

	restored.load_source(SOURCE);
	settle(&clock, &restored);
	assert_eq!(restored.results().rows()[0].kind(), "FieldDeclaration");
	assert_eq!(restored.persist(), saved);
}

#[test]
fn unknown_stored_language_is_reported() {
	let (_, mut root) = designer(DesignerConfig::default());
	let stored = serde_json::json!({ "language_version": "java 99" });
	let err = root.restore(stored.as_object().unwrap()).unwrap_err();
	assert!(matches!(err, SettingsError::Invalid { ref key, .. } if key == DesignerRoot::LANGUAGE_KEY));
}
