//! Bounded-convergence pump.
//!
//! One call runs up to [`MAX_PUMP_ROUNDS`] rounds of [`PumpPhase::ALL`].
//! A round that did no work ends the call early. Work left when the cap is
//! reached waits for the next call; [`DesignerRoot::next_deadline`] tells
//! the driver when that is due.

mod report;

pub use report::{MAX_PUMP_ROUNDS, PumpPhase, PumpReport, RoundReport, RoundWorkFlags};

use crate::DesignerRoot;

/// Runs one pump cycle with a report.
pub fn run_pump_cycle(root: &DesignerRoot) -> PumpReport {
	let mut report = PumpReport::default();

	for round_idx in 0..MAX_PUMP_ROUNDS {
		let _round_span = tracing::trace_span!("pump.round", pump.round_idx = round_idx).entered();
		let now = root.clock().now();
		let mut round = RoundReport::default();
		report.rounds_executed += 1;

		for phase in PumpPhase::ALL {
			round.phases.push(phase);
			let did_work = match phase {
				PumpPhase::SourceDebounce => {
					round.work.source_committed = root.code_area().poll(now);
					round.work.source_committed
				}
				PumpPhase::TreeVeto => {
					round.work.null_published = root.parse_model().poll(now);
					round.work.null_published
				}
				PumpPhase::QueryDebounce => {
					round.work.result_published = root.query_subscriber().poll(now);
					round.work.result_published
				}
				PumpPhase::Recovery => {
					round.work.selection_recovered = root.synchronizer().recover().is_some();
					round.work.selection_recovered
				}
			};
			tracing::trace!(pump.round_idx = round_idx, pump.phase = phase.label(), did_work, "pump.phase");
		}

		let made_progress = round.work.made_progress();
		report.rounds.push(round);

		let last_round = round_idx + 1 == MAX_PUMP_ROUNDS;
		if made_progress && last_round {
			report.reached_round_cap = true;
			tracing::debug!(rounds = report.rounds_executed, "pump.round_cap");
		}
		if !made_progress || last_round {
			break;
		}
	}

	report
}
