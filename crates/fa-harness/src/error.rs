//! Error types for audit operations.

use crate::report::AssertionRecord;
use thiserror::Error;

/// Errors encountered while configuring or running an audit.
#[derive(Error, Debug)]
pub enum HarnessError {
    /// Harness misconfiguration: bad checkpoint ordering, mismatched
    /// quantity sets, unknown quantity names. Fatal to the audit instance.
    #[error("Configuration error: {what}")]
    Config { what: String },

    /// One or more tracked quantities drifted outside their tolerance band.
    #[error("{} conservation violation(s)", violations.len())]
    ConservationFailed { violations: Vec<AssertionRecord> },

    /// Error from the hosting runtime (snapshot unavailable, state
    /// construction failed). Propagated unmodified, never recovered here.
    #[error("Host error: {message}")]
    Host { message: String },
}

pub type HarnessResult<T> = Result<T, HarnessError>;

impl From<fa_core::CoreError> for HarnessError {
    fn from(e: fa_core::CoreError) -> Self {
        HarnessError::Config {
            what: e.to_string(),
        }
    }
}

impl From<fa_network::NetworkError> for HarnessError {
    fn from(e: fa_network::NetworkError) -> Self {
        HarnessError::Host {
            message: e.to_string(),
        }
    }
}
