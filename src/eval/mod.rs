//! Sweep tables, per-video scores, and encoder comparison.
//!
//! - [`scores::VideoScores`]: Aggregated metrics for one distorted video
//! - [`sweep::SweepTable`]: One encoder configuration's quality sweep
//! - [`compare::compare_tables`]: BD-Rate of candidates against a reference
//! - [`report`]: Summary printing and the BD-Rate vs encode time CSV

pub mod compare;
pub mod report;
pub mod scores;
pub mod sweep;

pub use compare::{ComparisonReport, MetricComparison, Verdict, compare_pair, compare_tables};
pub use report::{BdTimeRow, append_bd_time_csv, bd_time_rows};
pub use scores::VideoScores;
pub use sweep::{SweepRow, SweepTable};
