//! Error types for video-eval operations.

use thiserror::Error;

/// Result type alias for video-eval operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during metric aggregation and curve comparison.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Aggregation was requested on a series with no samples.
    #[error("Cannot aggregate an empty metric series")]
    EmptySeries,

    /// BD-Rate was requested on a curve with no points.
    #[error("Rate-distortion curve has no points")]
    EmptyCurve,

    /// A rate value that cannot be log-transformed.
    #[error("Invalid rate: {rate} (must be positive and finite)")]
    InvalidRate {
        /// The rejected rate.
        rate: f64,
    },

    /// The two curves share no distortion interval.
    #[error("Distortion ranges do not overlap: [{lo}, {hi}]")]
    NonOverlappingRange {
        /// Lower bound of the would-be overlap.
        lo: f64,
        /// Upper bound of the would-be overlap.
        hi: f64,
    },

    /// Interpolation or integration produced unusable values.
    #[error("Numeric instability: {0}")]
    NumericInstability(String),

    /// Error importing CSV data.
    #[error("CSV import error at line {line}: {reason}")]
    CsvImport {
        /// Line number where the error occurred.
        line: usize,
        /// Reason for the failure.
        reason: String,
    },

    /// A required column is absent from a CSV header.
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// Configuration values out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O error wrapper.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
