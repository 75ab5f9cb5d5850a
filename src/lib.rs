//! # video-eval
//!
//! Video encoder metric aggregation and rate-distortion comparison.
//!
//! The library sits between an encode-and-score pipeline and a human: it
//! takes per-frame metric samples from external tools, reduces them to
//! robust scalars, collects one row per quality setting, and compares encoder
//! configurations by BD-Rate (the average bitrate change at equal quality).
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use video_eval::{EngineConfig, SweepImporter, compare_tables};
//!
//! let config = EngineConfig::default();
//! let importer = SweepImporter::auto_detect();
//!
//! let reference = importer.import("x265_slow.csv")?;
//! let candidate = importer.import("svtav1_p4.csv")?;
//!
//! for report in compare_tables(&reference, &[candidate], &config) {
//!     report.print_summary();
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`]: Error types for the library
//! - [`config`]: Engine configuration
//! - [`stats`]: Aggregate statistics, rate-distortion curves, BD-Rate
//! - [`interpolation`]: Monotone cubic (PCHIP) interpolation
//! - [`metrics`]: Metric catalogue and perceptual transforms
//! - [`import`]: CSV import for per-frame samples and sweep tables
//! - [`eval`]: Per-video scores, sweep tables, comparison and reporting
//! - [`encoder`]: Encoder command lines

pub mod config;
pub mod encoder;
pub mod error;
pub mod eval;
pub mod import;
pub mod interpolation;
pub mod metrics;
pub mod stats;

// Re-export commonly used types
pub use config::EngineConfig;
pub use encoder::Encoder;
pub use error::{Error, Result};
pub use eval::{
    ComparisonReport, MetricComparison, SweepRow, SweepTable, Verdict, VideoScores,
    compare_tables,
};
pub use import::{SweepImporter, SweepSchema};
pub use metrics::{Metric, MetricSeries};
pub use stats::{AggregateStats, PercentileMethod, RDPoint, RateDistortionCurve, bd_rate};
