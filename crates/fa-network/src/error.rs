//! Network state errors.

use thiserror::Error;

/// Result type for network state operations.
pub type NetworkResult<T> = Result<T, NetworkError>;

/// Errors that can occur while building network state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NetworkError {
    /// Non-physical values (negative mass, non-finite enthalpy, etc.).
    #[error("Non-physical value for {what}")]
    NonPhysical { what: &'static str },

    /// Invalid argument.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// Unknown constituent key.
    #[error("Unknown species: {key}")]
    UnknownSpecies { key: String },
}
