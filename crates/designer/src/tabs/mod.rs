//! Rule-editor tabs.
//!
//! Each tab owns an independent [`QueryState`]. Exactly one tab is active;
//! its state is the one the query pipeline evaluates. There is always at
//! least one tab.

use quarry_reactive::Var;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::query::QueryState;
use crate::settings::{self, PersistentSettings, Settings, SettingsError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TabError {
	#[error("the last tab cannot be closed")]
	LastTab,

	#[error("no tab at index {index} ({len} open)")]
	OutOfRange { index: usize, len: usize },
}

/// A named query.
#[derive(Clone)]
pub struct QueryTab {
	name: String,
	state: Var<QueryState>,
}

impl QueryTab {
	pub fn new(name: impl Into<String>, state: QueryState) -> Self {
		Self {
			name: name.into(),
			state: Var::new(state),
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	/// The tab's query. Edits made through it reach the pipeline while the
	/// tab is active.
	pub fn state(&self) -> Var<QueryState> {
		self.state.clone()
	}
}

impl std::fmt::Debug for QueryTab {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("QueryTab")
			.field("name", &self.name)
			.field("state", &self.state.get())
			.finish()
	}
}

/// Stored form of a tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct TabSnapshot {
	name: String,
	#[serde(flatten)]
	state: QueryState,
}

pub struct QueryTabs {
	tabs: Vec<QueryTab>,
	active: usize,
	/// Suffix for the next generated name.
	next_number: usize,
}

impl Default for QueryTabs {
	fn default() -> Self {
		Self::new()
	}
}

impl QueryTabs {
	pub const TABS_KEY: &'static str = "tabs";
	pub const ACTIVE_KEY: &'static str = "active_tab";

	/// One empty tab.
	pub fn new() -> Self {
		let mut tabs = Self {
			tabs: Vec::new(),
			active: 0,
			next_number: 1,
		};
		tabs.push_generated(QueryState::default());
		tabs
	}

	/// Opens a tab after the last one and returns its index. The active tab
	/// does not change.
	pub fn add(&mut self, name: Option<String>, state: QueryState) -> usize {
		match name {
			Some(name) => self.tabs.push(QueryTab::new(name, state)),
			None => self.push_generated(state),
		}
		self.tabs.len() - 1
	}

	/// Closes the tab at `index`.
	///
	/// Closing the active tab activates its left neighbour, or the new first
	/// tab when it was the first.
	pub fn close(&mut self, index: usize) -> Result<QueryTab, TabError> {
		self.check(index)?;
		if self.tabs.len() == 1 {
			return Err(TabError::LastTab);
		}
		let tab = self.tabs.remove(index);
		if index < self.active || (index == self.active && index > 0) {
			self.active -= 1;
		}
		Ok(tab)
	}

	/// Makes the tab at `index` active. Returns true if that changed the
	/// active tab.
	pub fn activate(&mut self, index: usize) -> Result<bool, TabError> {
		self.check(index)?;
		let changed = self.active != index;
		self.active = index;
		Ok(changed)
	}

	pub fn rename(&mut self, index: usize, name: impl Into<String>) -> Result<(), TabError> {
		self.check(index)?;
		self.tabs[index].name = name.into();
		Ok(())
	}

	pub fn active(&self) -> &QueryTab {
		&self.tabs[self.active]
	}

	pub fn active_index(&self) -> usize {
		self.active
	}

	pub fn get(&self, index: usize) -> Option<&QueryTab> {
		self.tabs.get(index)
	}

	pub fn iter(&self) -> impl Iterator<Item = &QueryTab> {
		self.tabs.iter()
	}

	pub fn len(&self) -> usize {
		self.tabs.len()
	}

	/// Always false; kept for symmetry with `len`.
	pub fn is_empty(&self) -> bool {
		self.tabs.is_empty()
	}

	fn check(&self, index: usize) -> Result<(), TabError> {
		if index < self.tabs.len() {
			Ok(())
		} else {
			Err(TabError::OutOfRange {
				index,
				len: self.tabs.len(),
			})
		}
	}

	fn push_generated(&mut self, state: QueryState) {
		let name = format!("Rule {}", self.next_number);
		self.next_number += 1;
		self.tabs.push(QueryTab::new(name, state));
	}
}

impl PersistentSettings for QueryTabs {
	fn persist(&self) -> Settings {
		let snapshots: Vec<TabSnapshot> = self
			.tabs
			.iter()
			.map(|tab| TabSnapshot {
				name: tab.name.clone(),
				state: tab.state.get(),
			})
			.collect();
		let mut out = Settings::new();
		settings::write(&mut out, Self::TABS_KEY, &snapshots);
		settings::write(&mut out, Self::ACTIVE_KEY, &self.active);
		out
	}

	/// Replaces the tabs with the stored ones. The stored states land in new
	/// [`Var`]s, so callers holding the old active state must retarget.
	fn restore(&mut self, stored: &Settings) -> Result<(), SettingsError> {
		let snapshots = settings::read::<Vec<TabSnapshot>>(stored, Self::TABS_KEY)?;
		let active = settings::read::<usize>(stored, Self::ACTIVE_KEY)?;

		if let Some(snapshots) = snapshots {
			if snapshots.is_empty() {
				return Err(SettingsError::invalid(Self::TABS_KEY, "no tabs"));
			}
			self.tabs = snapshots
				.into_iter()
				.map(|s| QueryTab::new(s.name, s.state))
				.collect();
			self.next_number = self.tabs.len() + 1;
			self.active = 0;
		}
		if let Some(active) = active {
			self.activate(active)
				.map_err(|err| SettingsError::invalid(Self::ACTIVE_KEY, err.to_string()))?;
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests;
