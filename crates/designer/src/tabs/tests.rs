use pretty_assertions::assert_eq;
use quarry_query::XPathVersion;
use serde_json::json;

use super::*;

fn names(tabs: &QueryTabs) -> Vec<&str> {
	tabs.iter().map(QueryTab::name).collect()
}

#[test]
fn starts_with_one_generated_tab() {
	let tabs = QueryTabs::new();
	assert_eq!(names(&tabs), ["Rule 1"]);
	assert_eq!(tabs.active_index(), 0);
	assert!(tabs.active().state().get().is_blank());
}

#[test]
fn added_tabs_do_not_steal_focus() {
	let mut tabs = QueryTabs::new();
	let index = tabs.add(None, QueryState::new("//Block"));
	tabs.add(Some("Fields".to_string()), QueryState::new("//FieldDeclaration"));
	assert_eq!(index, 1);
	assert_eq!(names(&tabs), ["Rule 1", "Rule 2", "Fields"]);
	assert_eq!(tabs.active_index(), 0);
}

#[test]
fn the_last_tab_cannot_be_closed() {
	let mut tabs = QueryTabs::new();
	assert_eq!(tabs.close(0).unwrap_err(), TabError::LastTab);
	assert_eq!(tabs.close(4).unwrap_err(), TabError::OutOfRange { index: 4, len: 1 });
}

#[test]
fn closing_keeps_the_active_tab_when_possible() {
	let mut tabs = QueryTabs::new();
	tabs.add(None, QueryState::default());
	tabs.add(None, QueryState::default());
	assert!(tabs.activate(2).unwrap());
	assert!(!tabs.activate(2).unwrap());

	tabs.close(0).unwrap();
	assert_eq!(tabs.active().name(), "Rule 3");

	tabs.close(1).unwrap();
	assert_eq!(tabs.active().name(), "Rule 2");
	assert_eq!(tabs.active_index(), 0);
}

#[test]
fn closing_the_first_active_tab_activates_the_next() {
	let mut tabs = QueryTabs::new();
	tabs.add(Some("second".to_string()), QueryState::default());
	let closed = tabs.close(0).unwrap();
	assert_eq!(closed.name(), "Rule 1");
	assert_eq!(tabs.active().name(), "second");
}

#[test]
fn tabs_have_independent_states() {
	let mut tabs = QueryTabs::new();
	tabs.add(None, QueryState::default());
	tabs.get(0).unwrap().state().set(QueryState::new("//A"));
	assert!(tabs.get(1).unwrap().state().get().is_blank());

	tabs.rename(1, "Renamed").unwrap();
	assert_eq!(names(&tabs), ["Rule 1", "Renamed"]);
	assert!(tabs.rename(2, "x").is_err());
}

#[test]
fn tabs_round_trip_through_settings() {
	let mut tabs = QueryTabs::new();
	tabs.active()
		.state()
		.set(QueryState::new("//VariableDeclarator[@Name = $n]").with_property("n", "i"));
	tabs.add(
		Some("Old dialect".to_string()),
		QueryState::new("//Block").with_version(XPathVersion::V1),
	);
	tabs.activate(1).unwrap();

	let saved = tabs.persist();
	let mut restored = QueryTabs::new();
	restored.restore(&saved).unwrap();

	assert_eq!(names(&restored), ["Rule 1", "Old dialect"]);
	assert_eq!(restored.active_index(), 1);
	assert_eq!(restored.active().state().get(), tabs.active().state().get());
	assert_eq!(restored.get(0).unwrap().state().get(), tabs.get(0).unwrap().state().get());
	assert_eq!(restored.add(None, QueryState::default()), 2);
	assert_eq!(restored.get(2).map(QueryTab::name), Some("Rule 3"));
}

#[test]
fn restoring_rejects_bad_tab_lists() {
	let mut tabs = QueryTabs::new();
	let empty = json!({ "tabs": [] });
	assert!(matches!(
		tabs.restore(empty.as_object().unwrap()),
		Err(SettingsError::Invalid { .. })
	));

	let dangling = json!({ "tabs": [{ "name": "only" }], "active_tab": 3 });
	let err = tabs.restore(dangling.as_object().unwrap()).unwrap_err();
	assert!(err.to_string().contains("active_tab"), "{err}");
}
