//! Named persistent properties.
//!
//! Components that survive a restart enumerate their state as a JSON object
//! and restore it from one. Where the object is stored is the caller's
//! concern; a missing key leaves the component's current value in place.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
	#[error("setting '{key}' is malformed: {error}")]
	Malformed { key: String, error: serde_json::Error },

	#[error("setting '{key}' is invalid: {reason}")]
	Invalid { key: String, reason: String },
}

impl SettingsError {
	pub fn invalid(key: &str, reason: impl Into<String>) -> Self {
		Self::Invalid {
			key: key.to_string(),
			reason: reason.into(),
		}
	}
}

pub type Result<T> = std::result::Result<T, SettingsError>;

pub type Settings = Map<String, Value>;

/// State that is saved between sessions.
pub trait PersistentSettings {
	fn persist(&self) -> Settings;

	/// Applies `settings`. Keys that are absent keep their current value.
	fn restore(&mut self, settings: &Settings) -> Result<()>;
}

/// Reads and decodes `key`, or `None` if it is absent.
pub fn read<T: DeserializeOwned>(settings: &Settings, key: &str) -> Result<Option<T>> {
	settings
		.get(key)
		.map(|value| {
			serde_json::from_value(value.clone()).map_err(|error| SettingsError::Malformed {
				key: key.to_string(),
				error,
			})
		})
		.transpose()
}

/// Encodes `value` under `key`.
pub fn write<T: Serialize + ?Sized>(settings: &mut Settings, key: &str, value: &T) {
	// Plain data with string keys always encodes.
	if let Ok(value) = serde_json::to_value(value) {
		settings.insert(key.to_string(), value);
	}
}

/// Recently opened files, most recent first, without duplicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentFiles {
	files: VecDeque<PathBuf>,
	limit: usize,
}

impl RecentFiles {
	pub const KEY: &'static str = "recent_files";

	pub fn new(limit: usize) -> Self {
		Self {
			files: VecDeque::with_capacity(limit),
			limit,
		}
	}

	/// Moves `path` to the front, dropping the oldest entry past the limit.
	pub fn push(&mut self, path: impl Into<PathBuf>) {
		let path = path.into();
		self.files.retain(|p| *p != path);
		self.files.push_front(path);
		self.files.truncate(self.limit);
	}

	pub fn remove(&mut self, path: &Path) -> bool {
		let before = self.files.len();
		self.files.retain(|p| p != path);
		self.files.len() != before
	}

	pub fn latest(&self) -> Option<&Path> {
		self.files.front().map(PathBuf::as_path)
	}

	pub fn iter(&self) -> impl Iterator<Item = &Path> {
		self.files.iter().map(PathBuf::as_path)
	}

	pub fn len(&self) -> usize {
		self.files.len()
	}

	pub fn is_empty(&self) -> bool {
		self.files.is_empty()
	}

	pub fn limit(&self) -> usize {
		self.limit
	}
}

impl PersistentSettings for RecentFiles {
	fn persist(&self) -> Settings {
		let mut settings = Settings::new();
		write(&mut settings, Self::KEY, &self.files);
		settings
	}

	fn restore(&mut self, settings: &Settings) -> Result<()> {
		let Some(files) = read::<Vec<PathBuf>>(settings, Self::KEY)? else {
			return Ok(());
		};
		self.files.clear();
		// Oldest first so the stored order survives deduplication.
		for path in files.into_iter().rev() {
			self.push(path);
		}
		Ok(())
	}
}
