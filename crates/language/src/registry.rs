//! Language lookup by name.

use std::rc::Rc;

use quarry_tree::{LanguageVersion, ParseError, Parser, ParserProvider};
use rustc_hash::FxHashMap;

use crate::java::{self, JavaParser};

/// A registered language: its parser and the versions it accepts.
pub struct LanguageModule {
	pub name: &'static str,
	pub versions: &'static [&'static str],
	pub default_version: &'static str,
	pub parser: Rc<dyn Parser>,
}

/// Parsers and versions keyed by language name.
#[derive(Default)]
pub struct LanguageRegistry {
	modules: FxHashMap<&'static str, LanguageModule>,
}

impl LanguageRegistry {
	/// Registry with every built-in language.
	pub fn with_defaults() -> Self {
		let mut registry = Self::default();
		registry.register(LanguageModule {
			name: java::LANGUAGE,
			versions: java::VERSIONS,
			default_version: java::DEFAULT_VERSION,
			parser: Rc::new(JavaParser::new()),
		});
		registry
	}

	/// Adds or replaces a language.
	pub fn register(&mut self, module: LanguageModule) {
		self.modules.insert(module.name, module);
	}

	pub fn module(&self, language: &str) -> Option<&LanguageModule> {
		self.modules.get(language)
	}

	/// Names of all registered languages, sorted.
	pub fn languages(&self) -> Vec<&'static str> {
		let mut names: Vec<_> = self.modules.keys().copied().collect();
		names.sort_unstable();
		names
	}

	pub fn default_version(&self, language: &str) -> Result<LanguageVersion, ParseError> {
		let module = self.require(language)?;
		Ok(LanguageVersion::new(module.name, module.default_version))
	}

	/// Resolves a version string for `language`.
	pub fn version(&self, language: &str, version: &str) -> Result<LanguageVersion, ParseError> {
		let module = self.require(language)?;
		module
			.versions
			.iter()
			.find(|v| **v == version)
			.map(|v| LanguageVersion::new(module.name, *v))
			.ok_or_else(|| ParseError::UnknownVersion {
				language: module.name,
				version: version.to_string(),
			})
	}

	/// Parses `"java 17"` or a bare `"java"` (default version).
	pub fn parse_version(&self, spec: &str) -> Result<LanguageVersion, ParseError> {
		let mut parts = spec.split_whitespace();
		let language = parts.next().unwrap_or_default();
		match parts.next() {
			Some(version) => self.version(language, version),
			None => self.default_version(language),
		}
	}

	fn require(&self, language: &str) -> Result<&LanguageModule, ParseError> {
		self.modules
			.get(language)
			.ok_or_else(|| ParseError::UnknownLanguage(language.to_string()))
	}
}

impl ParserProvider for LanguageRegistry {
	fn parser(&self, language: &str) -> Option<Rc<dyn Parser>> {
		self.modules.get(language).map(|m| Rc::clone(&m.parser))
	}
}
