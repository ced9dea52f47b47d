//! Query language dialects.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// XPath dialect a query is written in.
#[derive(
	Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
pub enum XPathVersion {
	/// XPath 1.0.
	#[strum(serialize = "1.0")]
	#[serde(rename = "1.0")]
	V1,
	/// XPath 2.0 evaluation with XPath 1.0 comparison rules.
	#[strum(serialize = "1.0 compatibility")]
	#[serde(rename = "1.0 compatibility")]
	V1Compat,
	/// XPath 2.0.
	#[default]
	#[strum(serialize = "2.0")]
	#[serde(rename = "2.0")]
	V2,
}

impl XPathVersion {
	/// Returns true if the dialect uses the XPath 2.0 function library.
	pub fn has_v2_functions(self) -> bool {
		!matches!(self, Self::V1)
	}

	/// Returns true if mismatched comparisons are coerced rather than rejected.
	pub fn coerces_comparisons(self) -> bool {
		!matches!(self, Self::V2)
	}

	fn missing_variable_pattern(self) -> &'static Regex {
		match self {
			Self::V1 => &*V1_MISSING_VARIABLE,
			Self::V1Compat | Self::V2 => &*V2_MISSING_VARIABLE,
		}
	}
}

static V1_MISSING_VARIABLE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"Variable (\w+)").expect("valid missing-variable pattern"));

static V2_MISSING_VARIABLE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"Undeclared variable in XPath expression: \$(\w+)").expect("valid missing-variable pattern")
});

/// Name of the undeclared property an evaluation error complains about.
pub fn extract_missing_property_name(message: &str, version: XPathVersion) -> Option<String> {
	version
		.missing_variable_pattern()
		.captures(message)
		.and_then(|c| c.get(1))
		.map(|m| m.as_str().to_string())
}
