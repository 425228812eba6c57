//! Unified error types for the floodcut crates
//!
//! Every stage of the pipeline (grid loading, relevance propagation, network
//! construction, min-cut solving, decoding) reports failures through
//! [`FloodError`], so callers can handle them uniformly at API boundaries.
//!
//! # Example
//!
//! ```ignore
//! use floodcut_core::{FloodError, FloodResult};
//!
//! fn plan(path: &str) -> FloodResult<()> {
//!     let grid = load_grid(path)?;
//!     let solution = compute_min_cut_solution(&grid, &config)?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Unified error type for all floodcut operations.
#[derive(Error, Debug)]
pub enum FloodError {
    /// Malformed grid or parameters (shape mismatch, missing derived field, NaN input)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The min-cut solver could not certify an optimal cut
    #[error("Solve failed: {0}")]
    SolveFailed(String),

    /// The infinite sentinel capacity does not dominate the finite capacities
    #[error(
        "Capacity overflow risk: infinite sentinel {infinity} does not exceed total finite capacity {finite_total}"
    )]
    CapacityOverflowRisk { infinity: i64, finite_total: i64 },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors (file access)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parsing/deserialization errors
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Convenience type alias for Results using FloodError.
pub type FloodResult<T> = Result<T, FloodError>;

impl From<serde_json::Error> for FloodError {
    fn from(err: serde_json::Error) -> Self {
        FloodError::Parse(err.to_string())
    }
}

impl From<toml::de::Error> for FloodError {
    fn from(err: toml::de::Error) -> Self {
        FloodError::Parse(err.to_string())
    }
}
