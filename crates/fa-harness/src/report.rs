//! Assertion records and comparison reports.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of one tolerance assertion.
///
/// Carries everything a result channel needs to render the check: the
/// quantity, both values, the drift, and the bound it was held to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssertionRecord {
    pub quantity: String,
    pub baseline: f64,
    #[serde(rename = "final")]
    pub final_value: f64,
    pub drift: f64,
    pub bound: f64,
    pub passed: bool,
}

impl fmt::Display for AssertionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: baseline={:.6e} final={:.6e} drift={:.3e} bound={:.3e}",
            if self.passed { "PASS" } else { "FAIL" },
            self.quantity,
            self.baseline,
            self.final_value,
            self.drift,
            self.bound,
        )
    }
}

/// All assertions produced by one comparison checkpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    /// Audit name.
    pub audit: String,
    /// Name of the comparison checkpoint that produced this report.
    pub checkpoint: String,
    /// Simulated time of the comparison, in seconds.
    pub time_s: f64,
    /// Wall-clock timestamp the report was generated at (RFC 3339).
    pub generated_at: String,
    pub records: Vec<AssertionRecord>,
}

impl ComparisonReport {
    pub fn all_passed(&self) -> bool {
        self.records.iter().all(|r| r.passed)
    }

    pub fn violations(&self) -> impl Iterator<Item = &AssertionRecord> {
        self.records.iter().filter(|r| !r.passed)
    }
}

impl fmt::Display for ComparisonReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "audit '{}' checkpoint '{}' at t={:.4}s:",
            self.audit, self.checkpoint, self.time_s
        )?;
        for record in &self.records {
            writeln!(f, "  {record}")?;
        }
        let failed = self.records.iter().filter(|r| !r.passed).count();
        write!(
            f,
            "  {} checked, {} passed, {} failed",
            self.records.len(),
            self.records.len() - failed,
            failed
        )
    }
}
