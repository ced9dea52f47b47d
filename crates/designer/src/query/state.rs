use quarry_query::{Properties, XPathVersion};
use serde::{Deserialize, Serialize};

/// Everything an evaluation depends on besides the tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryState {
	pub expression: String,
	pub version: XPathVersion,
	/// Values bound to `$variables`, in declaration order.
	pub properties: Properties,
}

impl QueryState {
	pub fn new(expression: impl Into<String>) -> Self {
		Self {
			expression: expression.into(),
			..Self::default()
		}
	}

	pub fn with_version(mut self, version: XPathVersion) -> Self {
		self.version = version;
		self
	}

	pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.properties.insert(name.into(), value.into());
		self
	}

	pub fn is_blank(&self) -> bool {
		self.expression.trim().is_empty()
	}
}
