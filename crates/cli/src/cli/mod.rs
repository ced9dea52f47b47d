use std::path::PathBuf;
use std::rc::Rc;
use std::str::FromStr;

use anyhow::Context;
use clap::Parser;
use quarry_designer::{DesignerConfig, DesignerRoot};
use quarry_query::XPathVersion;
use quarry_reactive::Clock;
use tracing::info;

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "quarry")]
#[command(about = "Evaluate a structural query against a source file")]
#[command(version)]
pub struct Cli {
	/// Source file to parse
	pub source: PathBuf,

	/// XPath expression to evaluate (prints the syntax tree if omitted)
	#[arg(short, long)]
	pub query: Option<String>,

	/// Language and version, e.g. `java` or `java 17`
	#[arg(short, long)]
	pub language: Option<String>,

	/// XPath dialect: `1.0`, `1.0 compatibility` or `2.0`
	#[arg(short = 'x', long, value_parser = parse_xpath_version, default_value = "2.0")]
	pub xpath_version: XPathVersion,

	/// Property binding for `$name` references, as `name=value`
	#[arg(short, long = "property", value_name = "NAME=VALUE", value_parser = parse_property)]
	pub properties: Vec<(String, String)>,

	/// Expected violation lines; turns the run into a test case
	#[arg(short, long, value_delimiter = ',')]
	pub expect: Option<Vec<u32>>,

	/// Config file (defaults to $QUARRY_CONFIG, then the user config)
	#[arg(short, long, value_name = "PATH")]
	pub config: Option<PathBuf>,

	/// Verbose logging
	#[arg(short, long)]
	pub verbose: bool,
}

impl Cli {
	/// Builds the designer these arguments describe, before any file is
	/// loaded. `--verbose` turns on developer mode.
	pub fn open_designer(&self, clock: Rc<dyn Clock>) -> anyhow::Result<DesignerRoot> {
		let config = DesignerConfig::resolve(self.config.as_deref()).context("loading configuration")?;
		let root = DesignerRoot::new(config, clock)?;
		if self.verbose {
			root.set_developer_mode(true);
		}
		if let Some(language) = &self.language {
			let version = root.set_language(language)?;
			info!(%version, "cli.language");
		}
		Ok(root)
	}
}

fn parse_xpath_version(value: &str) -> Result<XPathVersion, String> {
	XPathVersion::from_str(value).map_err(|_| format!("unknown XPath version '{value}'"))
}

fn parse_property(value: &str) -> Result<(String, String), String> {
	match value.split_once('=') {
		Some((name, value)) if !name.trim().is_empty() => Ok((name.trim().to_string(), value.to_string())),
		_ => Err(format!("expected NAME=VALUE, got '{value}'")),
	}
}
