//! fa-scenario: scenario file format for conservation audits.
//!
//! A scenario file declares, in YAML, everything one audit run needs: the
//! constituents to track, tolerance bands, checkpoints, and the recorded
//! network state at each checkpoint time. Loading validates the file, and
//! `compile` turns it into a configured audit plus a replay host that hands
//! the recorded states back at the requested times.

pub mod compile;
pub mod schema;
pub mod validate;

pub use compile::{CompiledScenario, ScenarioHost, compile_scenario};
pub use schema::*;
pub use validate::{ValidationError, validate_scenario};

pub type ScenarioResult<T> = Result<T, ScenarioError>;

#[derive(thiserror::Error, Debug)]
pub enum ScenarioError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Harness configuration: {0}")]
    Harness(String),

    #[error("State construction: {0}")]
    State(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl From<fa_harness::HarnessError> for ScenarioError {
    fn from(err: fa_harness::HarnessError) -> Self {
        ScenarioError::Harness(err.to_string())
    }
}

impl From<fa_network::NetworkError> for ScenarioError {
    fn from(err: fa_network::NetworkError) -> Self {
        ScenarioError::State(err.to_string())
    }
}

/// Parse and validate a scenario from YAML text.
pub fn from_yaml_str(content: &str) -> ScenarioResult<Scenario> {
    let scenario: Scenario = serde_yaml::from_str(content)?;
    validate_scenario(&scenario)?;
    Ok(scenario)
}

/// Load and validate a scenario file.
pub fn load_yaml(path: &std::path::Path) -> ScenarioResult<Scenario> {
    let content = std::fs::read_to_string(path)?;
    from_yaml_str(&content)
}
