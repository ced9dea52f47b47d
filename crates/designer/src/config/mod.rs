//! Designer configuration.
//!
//! Configuration is a small TOML file. Every key is optional:
//!
//! ```toml
//! developer_mode = false
//! default_language = "java"
//! recent_files_limit = 10
//!
//! [timings]
//! source_debounce_ms = 100
//! query_debounce_ms = 100
//! null_veto_ms = 500
//! dedup_window_ms = 100
//! ```
//!
//! # Lookup
//!
//! 1. an explicit path (the CLI's `--config`)
//! 2. `$QUARRY_CONFIG`
//! 3. `<config dir>/quarry/config.toml` (`~/.config/quarry/config.toml` on Linux)
//! 4. built-in defaults
//!
//! An explicitly named file must exist; the per-user file is optional.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "QUARRY_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("I/O error reading {path}: {error}")]
	Io { path: PathBuf, error: std::io::Error },

	#[error("invalid config {path}: {error}")]
	Toml { path: PathBuf, error: toml::de::Error },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Coalescing windows. None of these has a derivation; they are UI
/// responsiveness knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timings {
	/// Quiet period after the last source edit before reparsing.
	#[serde(rename = "source_debounce_ms", with = "millis")]
	pub source_debounce: Duration,
	/// Quiet period after the last query or tree change before evaluating.
	#[serde(rename = "query_debounce_ms", with = "millis")]
	pub query_debounce: Duration,
	/// How long a transition to "no tree" is held back.
	#[serde(rename = "null_veto_ms", with = "millis")]
	pub null_veto: Duration,
	/// Window in which a repeated selection message is dropped.
	#[serde(rename = "dedup_window_ms", with = "millis")]
	pub dedup_window: Duration,
}

impl Default for Timings {
	fn default() -> Self {
		Self {
			source_debounce: Duration::from_millis(100),
			query_debounce: Duration::from_millis(100),
			null_veto: Duration::from_millis(500),
			dedup_window: Duration::from_millis(100),
		}
	}
}

impl Timings {
	/// All windows zero: every trigger fires on the next poll.
	pub fn immediate() -> Self {
		Self {
			source_debounce: Duration::ZERO,
			query_debounce: Duration::ZERO,
			null_veto: Duration::ZERO,
			dedup_window: Duration::ZERO,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignerConfig {
	pub timings: Timings,
	/// Records channel traffic and debug events in the event log.
	pub developer_mode: bool,
	/// Language selected at startup, e.g. `java` or `java 17`.
	pub default_language: String,
	pub recent_files_limit: usize,
}

impl Default for DesignerConfig {
	fn default() -> Self {
		Self {
			timings: Timings::default(),
			developer_mode: false,
			default_language: "java".to_string(),
			recent_files_limit: 10,
		}
	}
}

impl DesignerConfig {
	pub fn parse(input: &str) -> std::result::Result<Self, toml::de::Error> {
		toml::from_str(input)
	}

	pub fn load(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let content = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		Self::parse(&content).map_err(|error| ConfigError::Toml {
			path: path.to_path_buf(),
			error,
		})
	}

	/// Loads the configuration following the lookup order.
	pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
		resolve_with(explicit, std::env::var_os(CONFIG_ENV), dirs::config_dir())
	}
}

fn resolve_with(explicit: Option<&Path>, env: Option<OsString>, config_dir: Option<PathBuf>) -> Result<DesignerConfig> {
	if let Some(path) = explicit.map(Path::to_path_buf).or_else(|| env.map(PathBuf::from)) {
		debug!(path = %path.display(), "config.load");
		return DesignerConfig::load(path);
	}
	match config_dir.map(|dir| dir.join("quarry").join("config.toml")) {
		Some(path) if path.is_file() => {
			debug!(path = %path.display(), "config.load");
			DesignerConfig::load(path)
		}
		_ => Ok(DesignerConfig::default()),
	}
}

/// Durations as integer milliseconds.
mod millis {
	use std::time::Duration;

	use serde::{Deserialize, Deserializer, Serializer};

	pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
	}

	pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
		u64::deserialize(deserializer).map(Duration::from_millis)
	}
}
