//! Drives an audit's checkpoints against a hosting runtime.

use crate::audit::{CheckpointOutcome, ConservationAudit};
use crate::checkpoint::AuditPhase;
use crate::error::{HarnessError, HarnessResult};
use crate::report::ComparisonReport;
use fa_network::StateView;
use tracing::debug;

/// The hosting runtime that owns simulated time.
///
/// `advance_to` runs the simulation up to the requested instant and returns
/// a read-only view of system state there. The host guarantees requests
/// arrive in non-decreasing time order (the audit's registration rules
/// ensure the driver asks in that order). Host errors propagate unmodified;
/// the audit cannot restore simulated-time consistency and does not try.
pub trait SimHost {
    type View: StateView;

    fn advance_to(&mut self, time_s: f64) -> HarnessResult<Self::View>;
}

/// Result of driving one audit to completion.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub audit: String,
    /// Checkpoint names in firing order.
    pub fired: Vec<String>,
    /// One report per comparison checkpoint.
    pub reports: Vec<ComparisonReport>,
    /// Phase the audit ended in. `Done` only if a comparison ran and every
    /// checkpoint fired.
    pub phase: AuditPhase,
}

impl RunSummary {
    pub fn all_passed(&self) -> bool {
        self.reports.iter().all(ComparisonReport::all_passed)
    }

    /// Fold tolerance violations into an error, keeping the reports on
    /// success.
    pub fn into_result(self) -> HarnessResult<Vec<ComparisonReport>> {
        let violations: Vec<_> = self
            .reports
            .iter()
            .flat_map(|r| r.violations().cloned().collect::<Vec<_>>())
            .collect();
        if violations.is_empty() {
            Ok(self.reports)
        } else {
            Err(HarnessError::ConservationFailed { violations })
        }
    }
}

/// Walk every registered checkpoint in order: advance the host to the
/// checkpoint's timestamp, take its view, fire the checkpoint.
///
/// Strictly sequential; each checkpoint runs to completion before the host
/// advances further. Nothing is retried: a deterministic run either
/// conserves or it does not.
pub fn run_audit<H: SimHost>(
    audit: &mut ConservationAudit,
    host: &mut H,
) -> HarnessResult<RunSummary> {
    let mut fired = Vec::new();
    let mut reports = Vec::new();

    while let Some(checkpoint) = audit.next_checkpoint() {
        let name = checkpoint.name.clone();
        let time_s = checkpoint.time_s;
        let view = host.advance_to(time_s)?;
        debug!(audit = %audit.name(), checkpoint = %name, time_s, "checkpoint due");
        match audit.fire_next(&view)? {
            CheckpointOutcome::BaselineCaptured { .. } => {}
            CheckpointOutcome::Compared(report) => reports.push(report),
        }
        fired.push(name);
    }

    Ok(RunSummary {
        audit: audit.name().to_string(),
        fired,
        reports,
        phase: audit.phase(),
    })
}
