//! Event-scheduled conservation comparator.

use crate::aggregator::Aggregator;
use crate::checkpoint::{AuditPhase, Checkpoint, CheckpointAction};
use crate::error::{HarnessError, HarnessResult};
use crate::quantity::QuantityTotals;
use crate::report::{AssertionRecord, ComparisonReport};
use fa_core::numeric::ToleranceBand;
use fa_network::StateView;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// A named linear combination of tracked quantities checked as one value.
///
/// Used when two tracked totals represent the same physical substance in
/// different phases: the combined drift `Σ cᵢ·(final(Qᵢ) − baseline(Qᵢ))`
/// is held to a band computed from the combined baseline `Σ cᵢ·baseline(Qᵢ)`.
#[derive(Debug, Clone, PartialEq)]
pub struct CombinedCheck {
    pub name: String,
    /// (quantity name, coefficient) terms.
    pub terms: Vec<(String, f64)>,
}

impl CombinedCheck {
    /// Unit-coefficient sum of the given quantities.
    pub fn sum(name: impl Into<String>, quantities: &[&str]) -> Self {
        Self {
            name: name.into(),
            terms: quantities.iter().map(|q| (q.to_string(), 1.0)).collect(),
        }
    }

    fn evaluate(&self, totals: &QuantityTotals) -> f64 {
        self.terms
            .iter()
            .map(|(q, c)| c * totals.get(q).copied().unwrap_or(0.0))
            .sum()
    }
}

/// What one checkpoint firing produced.
#[derive(Debug, Clone)]
pub enum CheckpointOutcome {
    BaselineCaptured { checkpoint: String },
    Compared(ComparisonReport),
}

/// One configured conservation test instance.
///
/// Checkpoints are registered during setup, then fired one at a time (in
/// registration order, which registration constrains to simulated-time
/// order) by the hosting runtime. The baseline record is captured exactly
/// once and owned exclusively by this instance.
#[derive(Debug)]
pub struct ConservationAudit {
    name: String,
    aggregator: Aggregator,
    default_band: ToleranceBand,
    band_overrides: BTreeMap<String, ToleranceBand>,
    combined_checks: Vec<CombinedCheck>,
    checkpoints: Vec<Checkpoint>,
    cursor: usize,
    phase: AuditPhase,
    baseline: Option<QuantityTotals>,
}

impl ConservationAudit {
    pub fn new(
        name: impl Into<String>,
        aggregator: Aggregator,
        default_band: ToleranceBand,
    ) -> Self {
        Self {
            name: name.into(),
            aggregator,
            default_band,
            band_overrides: BTreeMap::new(),
            combined_checks: Vec::new(),
            checkpoints: Vec::new(),
            cursor: 0,
            phase: AuditPhase::Registered,
            baseline: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phase(&self) -> AuditPhase {
        self.phase
    }

    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    pub fn checkpoints(&self) -> &[Checkpoint] {
        &self.checkpoints
    }

    pub fn baseline(&self) -> Option<&QuantityTotals> {
        self.baseline.as_ref()
    }

    /// Override the tolerance band for one quantity or combined check.
    pub fn set_band(&mut self, quantity: &str, band: ToleranceBand) -> HarnessResult<()> {
        let known = self.aggregator.has_quantity(quantity)
            || self.combined_checks.iter().any(|c| c.name == quantity);
        if !known {
            return Err(HarnessError::Config {
                what: format!("tolerance override for unknown quantity: {quantity}"),
            });
        }
        self.band_overrides.insert(quantity.to_string(), band);
        Ok(())
    }

    /// Add a linear-combination check over tracked quantities.
    pub fn add_combined_check(&mut self, check: CombinedCheck) -> HarnessResult<()> {
        if check.terms.is_empty() {
            return Err(HarnessError::Config {
                what: format!("combined check '{}' has no terms", check.name),
            });
        }
        if self.aggregator.has_quantity(&check.name)
            || self.combined_checks.iter().any(|c| c.name == check.name)
        {
            return Err(HarnessError::Config {
                what: format!("combined check name already in use: {}", check.name),
            });
        }
        for (quantity, coeff) in &check.terms {
            if !self.aggregator.has_quantity(quantity) {
                return Err(HarnessError::Config {
                    what: format!(
                        "combined check '{}' references untracked quantity: {quantity}",
                        check.name
                    ),
                });
            }
            if !coeff.is_finite() {
                return Err(HarnessError::Config {
                    what: format!("combined check '{}' has non-finite coefficient", check.name),
                });
            }
        }
        self.combined_checks.push(check);
        Ok(())
    }

    /// Register a checkpoint. Only valid during setup, and timestamps must
    /// be non-decreasing in registration order; the audit never reorders.
    pub fn register_checkpoint(
        &mut self,
        name: impl Into<String>,
        time_s: f64,
        action: CheckpointAction,
    ) -> HarnessResult<()> {
        let name = name.into();
        if self.cursor > 0 {
            return Err(HarnessError::Config {
                what: format!("checkpoint '{name}' registered after the run started"),
            });
        }
        if !time_s.is_finite() || time_s < 0.0 {
            return Err(HarnessError::Config {
                what: format!("checkpoint '{name}' time must be finite and non-negative"),
            });
        }
        if let Some(last) = self.checkpoints.last() {
            if time_s < last.time_s {
                return Err(HarnessError::Config {
                    what: format!(
                        "checkpoint '{name}' at t={time_s} precedes '{}' at t={}",
                        last.name, last.time_s
                    ),
                });
            }
        }
        if self.checkpoints.iter().any(|c| c.name == name) {
            return Err(HarnessError::Config {
                what: format!("duplicate checkpoint name: {name}"),
            });
        }
        if action == CheckpointAction::CaptureBaseline
            && self
                .checkpoints
                .iter()
                .any(|c| c.action == CheckpointAction::CaptureBaseline)
        {
            // Re-capturing would silently replace the record every later
            // comparison is judged against.
            return Err(HarnessError::Config {
                what: format!("checkpoint '{name}': baseline is already scheduled for capture"),
            });
        }
        self.checkpoints.push(Checkpoint::new(name, time_s, action));
        Ok(())
    }

    /// The next checkpoint to fire, if any remain.
    pub fn next_checkpoint(&self) -> Option<&Checkpoint> {
        self.checkpoints.get(self.cursor)
    }

    /// Fire the next registered checkpoint against the current view.
    ///
    /// Called by the hosting runtime when simulated time reaches the
    /// checkpoint's timestamp. Synchronous; exactly once per checkpoint.
    pub fn fire_next(&mut self, view: &dyn StateView) -> HarnessResult<CheckpointOutcome> {
        let Some(checkpoint) = self.checkpoints.get(self.cursor).cloned() else {
            return Err(HarnessError::Config {
                what: "no checkpoint left to fire".into(),
            });
        };
        debug!(
            audit = %self.name,
            checkpoint = %checkpoint.name,
            action = %checkpoint.action,
            time_s = view.time_s(),
            "firing checkpoint"
        );

        let outcome = match checkpoint.action {
            CheckpointAction::CaptureBaseline => {
                if self.baseline.is_some() {
                    return Err(HarnessError::Config {
                        what: format!(
                            "checkpoint '{}': baseline was already captured",
                            checkpoint.name
                        ),
                    });
                }
                self.baseline = Some(self.aggregator.aggregate(view));
                self.phase = AuditPhase::BaselineCaptured;
                CheckpointOutcome::BaselineCaptured {
                    checkpoint: checkpoint.name.clone(),
                }
            }
            CheckpointAction::Compare => {
                let report = self.compare(&checkpoint, view)?;
                self.phase = AuditPhase::Compared;
                CheckpointOutcome::Compared(report)
            }
        };

        self.cursor += 1;
        if self.cursor == self.checkpoints.len() && self.phase == AuditPhase::Compared {
            self.phase = AuditPhase::Done;
        }
        Ok(outcome)
    }

    fn band_for(&self, quantity: &str) -> ToleranceBand {
        self.band_overrides
            .get(quantity)
            .copied()
            .unwrap_or(self.default_band)
    }

    fn compare(
        &self,
        checkpoint: &Checkpoint,
        view: &dyn StateView,
    ) -> HarnessResult<ComparisonReport> {
        let Some(baseline) = self.baseline.as_ref() else {
            return Err(HarnessError::Config {
                what: format!(
                    "comparison checkpoint '{}' reached before any baseline checkpoint",
                    checkpoint.name
                ),
            });
        };
        let final_totals = self.aggregator.aggregate(view);
        verify_matching_quantity_sets(baseline, &final_totals)?;

        let mut records = Vec::with_capacity(baseline.len() + self.combined_checks.len());
        for (quantity, base) in baseline {
            let final_value = final_totals[quantity];
            records.push(self.assert_drift(quantity, *base, final_value));
        }
        for check in &self.combined_checks {
            let base = check.evaluate(baseline);
            let final_value = check.evaluate(&final_totals);
            records.push(self.assert_drift(&check.name, base, final_value));
        }

        Ok(ComparisonReport {
            audit: self.name.clone(),
            checkpoint: checkpoint.name.clone(),
            time_s: view.time_s(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            records,
        })
    }

    fn assert_drift(&self, quantity: &str, baseline: f64, final_value: f64) -> AssertionRecord {
        let band = self.band_for(quantity);
        let drift = final_value - baseline;
        let bound = band.bound(baseline);
        let passed = band.accepts(drift, baseline);
        if passed {
            debug!(audit = %self.name, quantity, drift, bound, "conservation holds");
        } else {
            warn!(audit = %self.name, quantity, baseline, final_value, drift, bound, "conservation violated");
        }
        AssertionRecord {
            quantity: quantity.to_string(),
            baseline,
            final_value,
            drift,
            bound,
            passed,
        }
    }
}

/// Reject comparison over records that do not track the same quantities.
///
/// A name present on one side only is a harness-configuration defect, which
/// must surface as such rather than as a tolerance failure.
pub fn verify_matching_quantity_sets(
    baseline: &QuantityTotals,
    final_totals: &QuantityTotals,
) -> HarnessResult<()> {
    let missing: Vec<&str> = baseline
        .keys()
        .filter(|q| !final_totals.contains_key(*q))
        .map(String::as_str)
        .collect();
    let unexpected: Vec<&str> = final_totals
        .keys()
        .filter(|q| !baseline.contains_key(*q))
        .map(String::as_str)
        .collect();
    if missing.is_empty() && unexpected.is_empty() {
        return Ok(());
    }
    let mut what = String::from("quantity sets differ between baseline and comparison:");
    if !missing.is_empty() {
        what.push_str(&format!(" missing [{}]", missing.join(", ")));
    }
    if !unexpected.is_empty() {
        what.push_str(&format!(" unexpected [{}]", unexpected.join(", ")));
    }
    Err(HarnessError::Config { what })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quantity::{Contribution, TrackedQuantity};
    use fa_network::{Composition, FluidContent, FluidNode, NetworkSnapshot, Species};

    fn snapshot(time_s: f64, mass_split: (f64, f64)) -> NetworkSnapshot {
        let mut snap = NetworkSnapshot::new(time_s).unwrap();
        let comp = Composition::new_mass_fractions(vec![
            (Species::N2, 0.8),
            (Species::H2O, 0.1),
            (Species::Water, 0.1),
        ])
        .unwrap();
        snap.add_node(FluidNode::new(
            "a",
            FluidContent::new(mass_split.0, 2.0e5, comp.clone()).unwrap(),
        ));
        snap.add_node(FluidNode::new(
            "b",
            FluidContent::new(mass_split.1, 2.0e5, comp).unwrap(),
        ));
        snap
    }

    fn audit() -> ConservationAudit {
        let agg =
            Aggregator::conservation_set(&[Species::N2, Species::H2O, Species::Water]).unwrap();
        let mut audit = ConservationAudit::new("overflow", agg, ToleranceBand::default());
        audit
            .register_checkpoint("initial", 0.0125, CheckpointAction::CaptureBaseline)
            .unwrap();
        audit
            .register_checkpoint("final", 12.0, CheckpointAction::Compare)
            .unwrap();
        audit
    }

    #[test]
    fn conserving_run_passes() {
        let mut audit = audit();
        assert_eq!(audit.phase(), AuditPhase::Registered);

        audit.fire_next(&snapshot(0.0125, (60.0, 40.0))).unwrap();
        assert_eq!(audit.phase(), AuditPhase::BaselineCaptured);

        // Same totals, different distribution between nodes.
        let outcome = audit.fire_next(&snapshot(12.0, (25.0, 75.0))).unwrap();
        assert_eq!(audit.phase(), AuditPhase::Done);
        let CheckpointOutcome::Compared(report) = outcome else {
            panic!("expected comparison outcome");
        };
        assert!(report.all_passed(), "{report}");
        assert_eq!(report.checkpoint, "final");
        assert_eq!(report.time_s, 12.0);
    }

    #[test]
    fn leak_is_reported_with_diagnostics() {
        let mut audit = audit();
        audit.fire_next(&snapshot(0.0125, (60.0, 40.0))).unwrap();
        // Half a kilogram went missing.
        let outcome = audit.fire_next(&snapshot(12.0, (60.0, 39.5))).unwrap();
        let CheckpointOutcome::Compared(report) = outcome else {
            panic!("expected comparison outcome");
        };
        assert!(!report.all_passed());

        let mass = report
            .records
            .iter()
            .find(|r| r.quantity == "total_mass")
            .unwrap();
        assert!(!mass.passed);
        assert_eq!(mass.baseline, 100.0);
        assert_eq!(mass.final_value, 99.5);
        assert!((mass.drift + 0.5).abs() < 1e-12);
        assert!((mass.bound - (1e-16 + 1e-6 * 100.0)).abs() < 1e-12);
    }

    #[test]
    fn all_violations_collected_not_just_first() {
        let mut audit = audit();
        audit.fire_next(&snapshot(0.0125, (60.0, 40.0))).unwrap();
        let CheckpointOutcome::Compared(report) =
            audit.fire_next(&snapshot(12.0, (30.0, 40.0))).unwrap()
        else {
            panic!("expected comparison outcome");
        };
        // Mass, enthalpy, and every species total all drifted.
        assert!(report.violations().count() >= 4);
    }

    #[test]
    fn compare_before_baseline_is_config_error() {
        let agg = Aggregator::conservation_set(&[Species::N2]).unwrap();
        let mut audit = ConservationAudit::new("bad", agg, ToleranceBand::default());
        audit
            .register_checkpoint("final", 1.0, CheckpointAction::Compare)
            .unwrap();
        let err = audit.fire_next(&snapshot(1.0, (1.0, 1.0))).unwrap_err();
        assert!(matches!(err, HarnessError::Config { .. }));
        assert!(err.to_string().contains("before any baseline"));
    }

    #[test]
    fn second_baseline_rejected_at_registration() {
        let agg = Aggregator::conservation_set(&[Species::N2]).unwrap();
        let mut audit = ConservationAudit::new("bad", agg, ToleranceBand::default());
        audit
            .register_checkpoint("first", 0.0, CheckpointAction::CaptureBaseline)
            .unwrap();
        let err = audit
            .register_checkpoint("again", 1.0, CheckpointAction::CaptureBaseline)
            .unwrap_err();
        assert!(matches!(err, HarnessError::Config { .. }));
    }

    #[test]
    fn decreasing_times_rejected() {
        let agg = Aggregator::conservation_set(&[Species::N2]).unwrap();
        let mut audit = ConservationAudit::new("bad", agg, ToleranceBand::default());
        audit
            .register_checkpoint("late", 5.0, CheckpointAction::CaptureBaseline)
            .unwrap();
        let err = audit
            .register_checkpoint("early", 1.0, CheckpointAction::Compare)
            .unwrap_err();
        assert!(err.to_string().contains("precedes"));
    }

    #[test]
    fn registration_after_run_start_rejected() {
        let mut audit = audit();
        audit.fire_next(&snapshot(0.0125, (1.0, 1.0))).unwrap();
        let err = audit
            .register_checkpoint("late", 20.0, CheckpointAction::Compare)
            .unwrap_err();
        assert!(err.to_string().contains("after the run started"));
    }

    #[test]
    fn equal_times_allowed_fire_in_registration_order() {
        let agg = Aggregator::conservation_set(&[Species::N2]).unwrap();
        let mut audit = ConservationAudit::new("tied", agg, ToleranceBand::default());
        audit
            .register_checkpoint("baseline", 1.0, CheckpointAction::CaptureBaseline)
            .unwrap();
        audit
            .register_checkpoint("compare", 1.0, CheckpointAction::Compare)
            .unwrap();

        let view = snapshot(1.0, (2.0, 3.0));
        assert_eq!(audit.next_checkpoint().unwrap().name, "baseline");
        audit.fire_next(&view).unwrap();
        assert_eq!(audit.next_checkpoint().unwrap().name, "compare");
        audit.fire_next(&view).unwrap();
        assert_eq!(audit.phase(), AuditPhase::Done);
    }

    #[test]
    fn mismatched_quantity_sets_reported_distinctly() {
        let mut baseline = QuantityTotals::new();
        baseline.insert("total_mass".into(), 100.0);
        baseline.insert("total_enthalpy".into(), 5000.0);
        let mut final_totals = QuantityTotals::new();
        final_totals.insert("total_mass".into(), 100.0);
        final_totals.insert("total_mass_N2".into(), 70.0);

        let err = verify_matching_quantity_sets(&baseline, &final_totals).unwrap_err();
        let what = err.to_string();
        assert!(what.contains("missing [total_enthalpy]"), "{what}");
        assert!(what.contains("unexpected [total_mass_N2]"), "{what}");
    }

    #[test]
    fn band_override_applies_per_quantity() {
        let agg = Aggregator::conservation_set(&[Species::N2]).unwrap();
        let mut audit = ConservationAudit::new("bands", agg, ToleranceBand::default());
        // Loose band for enthalpy only.
        audit
            .set_band("total_enthalpy", ToleranceBand::new(1e-16, 1e-2).unwrap())
            .unwrap();
        audit
            .register_checkpoint("baseline", 0.0, CheckpointAction::CaptureBaseline)
            .unwrap();
        audit
            .register_checkpoint("final", 1.0, CheckpointAction::Compare)
            .unwrap();

        let mut before = NetworkSnapshot::new(0.0).unwrap();
        before.add_node(FluidNode::new(
            "n",
            FluidContent::new(10.0, 1.000e5, Composition::pure(Species::N2)).unwrap(),
        ));
        let mut after = NetworkSnapshot::new(1.0).unwrap();
        after.add_node(FluidNode::new(
            "n",
            FluidContent::new(10.0, 1.001e5, Composition::pure(Species::N2)).unwrap(),
        ));

        audit.fire_next(&before).unwrap();
        let CheckpointOutcome::Compared(report) = audit.fire_next(&after).unwrap() else {
            panic!("expected comparison outcome");
        };
        let enthalpy = report
            .records
            .iter()
            .find(|r| r.quantity == "total_enthalpy")
            .unwrap();
        // 0.1% drift passes the 1% band but would fail the default 1e-6 band.
        assert!(enthalpy.passed, "{enthalpy}");
    }

    #[test]
    fn set_band_unknown_quantity_rejected() {
        let agg = Aggregator::conservation_set(&[Species::N2]).unwrap();
        let mut audit = ConservationAudit::new("bands", agg, ToleranceBand::default());
        assert!(audit.set_band("bogus", ToleranceBand::default()).is_err());
    }

    #[test]
    fn combined_check_validation() {
        let agg = Aggregator::conservation_set(&[Species::H2O, Species::Water]).unwrap();
        let mut audit = ConservationAudit::new("water", agg, ToleranceBand::default());

        let err = audit
            .add_combined_check(CombinedCheck::sum("water_all_phases", &["total_mass_XX"]))
            .unwrap_err();
        assert!(err.to_string().contains("untracked quantity"));

        audit
            .add_combined_check(CombinedCheck::sum(
                "water_all_phases",
                &["total_mass_H2O", "total_mass_WATER"],
            ))
            .unwrap();

        let err = audit
            .add_combined_check(CombinedCheck::sum("water_all_phases", &["total_mass_H2O"]))
            .unwrap_err();
        assert!(err.to_string().contains("already in use"));
    }

    #[test]
    fn combined_check_matches_manual_summation() {
        // Vapor condenses into the liquid phase: each species total drifts,
        // their sum does not.
        let agg = Aggregator::new(vec![
            TrackedQuantity::of(Contribution::SpeciesMass(Species::H2O)),
            TrackedQuantity::of(Contribution::SpeciesMass(Species::Water)),
        ])
        .unwrap();
        let band = ToleranceBand::new(1e-16, 1e-6).unwrap();
        let mut audit = ConservationAudit::new("condense", agg, band);
        audit
            .add_combined_check(CombinedCheck::sum(
                "water_all_phases",
                &["total_mass_H2O", "total_mass_WATER"],
            ))
            .unwrap();
        audit
            .register_checkpoint("baseline", 0.0, CheckpointAction::CaptureBaseline)
            .unwrap();
        audit
            .register_checkpoint("final", 10.0, CheckpointAction::Compare)
            .unwrap();

        let make = |time_s: f64, vapor: f64, liquid: f64| {
            let total = vapor + liquid;
            let comp = Composition::new_mass_fractions(vec![
                (Species::H2O, vapor / total),
                (Species::Water, liquid / total),
            ])
            .unwrap();
            let mut snap = NetworkSnapshot::new(time_s).unwrap();
            snap.add_node(FluidNode::new(
                "tank",
                FluidContent::new(total, 2.0e5, comp).unwrap(),
            ));
            snap
        };

        audit.fire_next(&make(0.0, 8.0, 2.0)).unwrap();
        let CheckpointOutcome::Compared(report) =
            audit.fire_next(&make(10.0, 5.0, 5.0)).unwrap()
        else {
            panic!("expected comparison outcome");
        };

        // Per-phase totals each moved by 3 kg and fail.
        assert!(!report.records.iter().find(|r| r.quantity == "total_mass_H2O").unwrap().passed);
        assert!(!report.records.iter().find(|r| r.quantity == "total_mass_WATER").unwrap().passed);

        // The combined check reproduces the manual computation exactly.
        let combined = report
            .records
            .iter()
            .find(|r| r.quantity == "water_all_phases")
            .unwrap();
        let manual_baseline = 8.0 + 2.0;
        let manual_drift = (5.0 + 5.0) - manual_baseline;
        assert_eq!(combined.baseline, manual_baseline);
        assert_eq!(combined.drift, manual_drift);
        assert_eq!(combined.bound, band.bound(manual_baseline));
        assert_eq!(combined.passed, band.accepts(manual_drift, manual_baseline));
        assert!(combined.passed);
    }
}
