//! Checkpoints bound to simulated timestamps.

use std::fmt;

/// What the audit does when a checkpoint's timestamp is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckpointAction {
    /// Aggregate totals and store them as the baseline record.
    CaptureBaseline,
    /// Aggregate totals and compare them against the stored baseline.
    Compare,
}

impl fmt::Display for CheckpointAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckpointAction::CaptureBaseline => write!(f, "capture-baseline"),
            CheckpointAction::Compare => write!(f, "compare"),
        }
    }
}

/// A named point in simulated time at which the audit acts.
///
/// Checkpoints fire exactly once, synchronously, in simulated-time order;
/// equal timestamps fire in registration order.
#[derive(Debug, Clone, PartialEq)]
pub struct Checkpoint {
    pub name: String,
    pub time_s: f64,
    pub action: CheckpointAction,
}

impl Checkpoint {
    pub fn new(name: impl Into<String>, time_s: f64, action: CheckpointAction) -> Self {
        Self {
            name: name.into(),
            time_s,
            action,
        }
    }
}

/// Lifecycle of one audit instance.
///
/// Driven only by checkpoints firing in simulated time, never by wall-clock
/// time. An audit without both a baseline and a compare checkpoint never
/// leaves `Registered`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuditPhase {
    /// Checkpoints may still be registered; nothing has fired.
    #[default]
    Registered,
    /// The baseline record has been captured.
    BaselineCaptured,
    /// At least one comparison has run; checkpoints remain.
    Compared,
    /// Every registered checkpoint has fired.
    Done,
}
