//! Error types for matrix profile computation.
//!
//! Every variant is an input-validation failure raised before any row of
//! the profile is computed, so a returned error never carries partial
//! results.

use std::fmt;

use thiserror::Error;

/// Which of the two input series an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesRole {
    /// The reference series `T_A` (searched for neighbors).
    Reference,
    /// The query series `T_B` (one profile row per window).
    Query,
}

impl fmt::Display for SeriesRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeriesRole::Reference => f.write_str("T_A"),
            SeriesRole::Query => f.write_str("T_B"),
        }
    }
}

/// Core error type for matrix profile operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Subsequence length below the minimum of 2.
    #[error("Invalid input: window size m={m} must be at least 2")]
    WindowTooShort { m: usize },

    /// Subsequence length does not leave at least two windows in a series.
    #[error("Invalid input: window size m={m} must be smaller than the length of {series} ({len})")]
    WindowTooLong {
        series: SeriesRole,
        m: usize,
        len: usize,
    },

    /// A series holds a value that cannot take part in the computation.
    #[error("Invalid input: {series} contains non-finite value {value} at index {index}")]
    NonFinite {
        series: SeriesRole,
        index: usize,
        value: f64,
    },

    /// Inconsistent configuration or row range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an error for a row range that does not fit the query series.
    pub fn invalid_range(start: usize, stop: usize, n_rows: usize) -> Self {
        Self::InvalidConfig(format!(
            "row range {start}..{stop} must be non-empty and lie within 0..{n_rows}"
        ))
    }
}
