/// Maximum rounds executed by a single `pump()` call.
pub const MAX_PUMP_ROUNDS: usize = 3;

/// Ordered phases executed inside each pump round.
///
/// Each phase feeds the next: committed source text is parsed, a published
/// tree is evaluated against, and the selection is repaired last so it sees
/// the tree the results were computed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpPhase {
	/// Commit debounced source edits to the parse model.
	SourceDebounce,
	/// Publish a held-back "no tree" whose veto window ran out.
	TreeVeto,
	/// Evaluate once the query or tree debounce elapsed.
	QueryDebounce,
	/// Re-locate the selection after a tree change.
	Recovery,
}

impl PumpPhase {
	pub const ALL: [Self; 4] = [Self::SourceDebounce, Self::TreeVeto, Self::QueryDebounce, Self::Recovery];

	pub fn label(self) -> &'static str {
		match self {
			Self::SourceDebounce => "source_debounce",
			Self::TreeVeto => "tree_veto",
			Self::QueryDebounce => "query_debounce",
			Self::Recovery => "recovery",
		}
	}
}

/// Per-round progress flags used by bounded-convergence control flow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoundWorkFlags {
	pub source_committed: bool,
	pub null_published: bool,
	pub result_published: bool,
	pub selection_recovered: bool,
}

impl RoundWorkFlags {
	pub fn made_progress(self) -> bool {
		self.source_committed || self.null_published || self.result_published || self.selection_recovered
	}
}

/// Report for one round.
#[derive(Debug, Clone, Default)]
pub struct RoundReport {
	pub phases: Vec<PumpPhase>,
	pub work: RoundWorkFlags,
}

/// Aggregate report for one pump call.
#[derive(Debug, Clone, Default)]
pub struct PumpReport {
	pub rounds_executed: usize,
	pub reached_round_cap: bool,
	pub rounds: Vec<RoundReport>,
}

impl PumpReport {
	/// Whether any round did work.
	pub fn made_progress(&self) -> bool {
		self.rounds.iter().any(|r| r.work.made_progress())
	}
}
