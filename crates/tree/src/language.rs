//! Language identity and resolution inputs.

use std::fmt;
use std::path::{Path, PathBuf};

/// A language together with one of its versions, e.g. `java 21`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LanguageVersion {
	pub language: &'static str,
	pub version: &'static str,
}

impl LanguageVersion {
	pub const fn new(language: &'static str, version: &'static str) -> Self {
		Self { language, version }
	}
}

impl fmt::Display for LanguageVersion {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} {}", self.language, self.version)
	}
}

/// Auxiliary input for semantic passes (the classpath, for Java).
///
/// Changing it alone re-triggers parsing, since type resolution depends on it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ResolutionContext {
	classpath: Vec<PathBuf>,
}

impl ResolutionContext {
	pub fn new(classpath: impl IntoIterator<Item = PathBuf>) -> Self {
		Self {
			classpath: classpath.into_iter().collect(),
		}
	}

	pub fn classpath(&self) -> impl Iterator<Item = &Path> {
		self.classpath.iter().map(PathBuf::as_path)
	}

	pub fn is_empty(&self) -> bool {
		self.classpath.is_empty()
	}
}
