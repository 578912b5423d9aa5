//! Error types for raidcalc
//!
//! This module defines the common error type used by the model and search
//! crates.

use thiserror::Error;

/// Common result type for raidcalc operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for raidcalc
#[derive(Debug, Error)]
pub enum Error {
    // Model construction errors
    #[error("invalid parameter {field}: {value}")]
    InvalidParameter { field: &'static str, value: f64 },

    #[error("mirror member {index} differs from the first member")]
    HeterogeneousMirror { index: usize },

    #[error("{layout} must have at least one member")]
    EmptyArray { layout: &'static str },

    // Search errors
    #[error("search limit exceeded: more than {limit} {what}")]
    SearchLimitExceeded { what: &'static str, limit: usize },

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("deserialization error: {0}")]
    Deserialization(String),
}

impl Error {
    /// Create an invalid parameter error
    #[must_use]
    pub const fn invalid_parameter(field: &'static str, value: f64) -> Self {
        Self::InvalidParameter { field, value }
    }

    /// Create a configuration error
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Check if this error came from a search limit
    #[must_use]
    pub const fn is_search_limit(&self) -> bool {
        matches!(self, Self::SearchLimitExceeded { .. })
    }

    /// Check if this error was caused by caller-supplied values
    #[must_use]
    pub const fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::InvalidParameter { .. }
                | Self::HeterogeneousMirror { .. }
                | Self::EmptyArray { .. }
                | Self::Configuration(_)
                | Self::Deserialization(_)
        )
    }
}

impl From<config::ConfigError> for Error {
    fn from(e: config::ConfigError) -> Self {
        Self::Configuration(e.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Self::Deserialization(e.to_string())
    }
}
