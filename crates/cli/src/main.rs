//! Quarry command line driver.
//!
//! Loads a source file into a [`DesignerRoot`], evaluates a query against it
//! once every debounced stage has settled, and prints the matches. With
//! `--expect` the run is checked as a live test case instead.

mod cli;

use std::rc::Rc;

use anyhow::{Context, bail};
use clap::Parser;
use quarry_designer::{DesignerRoot, EvaluationResult, EventLogLayer, LiveTestCase, QueryState, TestStatus};
use quarry_reactive::SystemClock;
use tokio::time::Instant;
use tracing::debug;

use crate::cli::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
	let args = Cli::parse();

	let attach_event_log = setup_tracing(args.verbose);
	let root = args.open_designer(Rc::new(SystemClock))?;
	attach_event_log(EventLogLayer::new(root.event_log().clone(), root.developer_flag()))?;

	root.open_file(&args.source)
		.with_context(|| format!("reading {}", args.source.display()))?;

	let Some(expression) = args.query.clone() else {
		print_outline(&root);
		return Ok(());
	};
	let mut state = QueryState::new(expression).with_version(args.xpath_version);
	for (name, value) in &args.properties {
		state = state.with_property(name, value);
	}
	root.query().set(state);

	if let Some(lines) = args.expect {
		return check(&root, &args.source.display().to_string(), lines);
	}

	settle(&root).await;
	report(&root)
}

/// Pumps until no debounced work is left.
async fn settle(root: &DesignerRoot) {
	loop {
		let report = root.pump();
		debug!(rounds = report.rounds_executed, progress = report.made_progress(), "cli.pump");
		match root.next_deadline() {
			Some(deadline) => tokio::time::sleep_until(Instant::from_std(deadline)).await,
			None => break,
		}
	}
}

fn report(root: &DesignerRoot) -> anyhow::Result<()> {
	if let Some(err) = root.parse_model().parse_error().get() {
		bail!("{err}");
	}
	match root.query_subscriber().result().get() {
		EvaluationResult::Success(nodes) => {
			for node in &nodes {
				let span = node.span();
				let first_line = node.text().lines().next().unwrap_or_default();
				println!("{}:{}\t{}\t{}", span.begin_line, span.begin_column, node.kind(), first_line);
			}
			eprintln!("{}", root.results().status());
			Ok(())
		}
		EvaluationResult::Error(err) => match err.missing_property {
			Some(name) => bail!("{} (bind it with --property {name}=VALUE)", err.message),
			None => bail!("{}", err.message),
		},
		EvaluationResult::NoCompilationUnit | EvaluationResult::NoQuery => bail!("{}", root.results().status()),
	}
}

fn check(root: &DesignerRoot, description: &str, lines: Vec<u32>) -> anyhow::Result<()> {
	let Some(version) = root.language_version() else {
		bail!("no language selected");
	};
	let source = root.parse_model().source_text();
	let case = LiveTestCase::new(description, source, version).expecting(lines);
	match root.run_test_case(&case) {
		TestStatus::Pass => {
			println!("pass");
			Ok(())
		}
		TestStatus::Fail { expected, actual } => bail!("expected violations on {expected:?}, found {actual:?}"),
		TestStatus::Error(message) => bail!("{message}"),
	}
}

/// Prints the syntax tree, one node per line.
fn print_outline(root: &DesignerRoot) {
	let Some(tree) = root.parse_model().compilation_unit().get() else {
		if let Some(err) = root.parse_model().parse_error().get() {
			eprintln!("{err}");
		}
		return;
	};
	for idx in tree.descendants(tree.root()) {
		let depth = tree.ancestors(idx).count();
		let span = tree.node(idx).span();
		println!("{:indent$}{} [{}:{}]", "", tree.kind(idx), span.begin_line, span.begin_column, indent = depth * 2);
	}
}

/// Installs the stderr subscriber.
///
/// The designer's event log does not exist yet at this point, so its layer
/// starts out empty; the returned closure plugs it in once the designer is
/// built.
fn setup_tracing(verbose: bool) -> impl FnOnce(EventLogLayer) -> anyhow::Result<()> {
	use tracing_subscriber::prelude::*;
	use tracing_subscriber::{EnvFilter, reload};

	let filter = EnvFilter::try_from_env("QUARRY_LOG").unwrap_or_else(|_| {
		if verbose {
			EnvFilter::new("quarry=trace,debug")
		} else {
			EnvFilter::new("quarry=info,warn")
		}
	});

	let stderr_layer = tracing_subscriber::fmt::layer()
		.with_writer(std::io::stderr)
		.with_target(true)
		.with_filter(filter);
	let (event_log_layer, handle) = reload::Layer::new(None::<EventLogLayer>);

	tracing_subscriber::registry()
		.with(stderr_layer)
		.with(event_log_layer)
		.init();

	move |layer| {
		handle.modify(|slot| *slot = Some(layer))?;
		Ok(())
	}
}
