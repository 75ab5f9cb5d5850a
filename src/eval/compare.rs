//! BD-Rate comparison of sweep tables against a reference.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::metrics::Metric;
use crate::stats::{BdRateConfig, try_bd_rate};

use super::sweep::SweepTable;

/// Which side of a comparison wins on one metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Positive BD-Rate: the candidate needs more bits.
    ReferenceBetter,
    /// Negative BD-Rate: the candidate needs fewer bits.
    CandidateBetter,
    /// BD-Rate of exactly zero.
    NoDifference,
    /// The curves could not be compared.
    NoComparison,
}

impl Verdict {
    #[must_use]
    pub fn from_bd_rate(bd_rate: Option<f64>) -> Self {
        match bd_rate {
            None => Self::NoComparison,
            Some(bd) if bd < 0.0 => Self::CandidateBetter,
            Some(bd) if bd > 0.0 => Self::ReferenceBetter,
            Some(_) => Self::NoDifference,
        }
    }

    /// Human-readable outcome using the two table names.
    #[must_use]
    pub fn message(self, reference: &str, candidate: &str) -> String {
        match self {
            Self::ReferenceBetter => format!("{reference} is better"),
            Self::CandidateBetter => format!("{candidate} is better"),
            Self::NoDifference => "No difference".to_string(),
            Self::NoComparison => "No comparison".to_string(),
        }
    }
}

/// BD-Rate of one metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricComparison {
    pub metric: Metric,
    /// Percent rate change of the candidate, `None` when degenerate.
    pub bd_rate: Option<f64>,
    pub verdict: Verdict,
}

/// All metric comparisons of one candidate against the reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    /// Reference table name.
    pub reference: String,

    /// Candidate table name.
    pub candidate: String,

    /// Mean reference encode time in seconds.
    pub reference_encode_time: Option<f64>,

    /// Mean candidate encode time in seconds.
    pub candidate_encode_time: Option<f64>,

    /// Per-metric results in configured order.
    pub metrics: Vec<MetricComparison>,

    /// BD-Rate settings used.
    pub bd_rate_config: BdRateConfig,

    /// When this report was generated.
    #[serde(with = "chrono_serde")]
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl ComparisonReport {
    /// BD-Rate for `metric`, if it was compared and not degenerate.
    #[must_use]
    pub fn bd_rate(&self, metric: Metric) -> Option<f64> {
        self.metrics
            .iter()
            .find(|m| m.metric == metric)
            .and_then(|m| m.bd_rate)
    }

    /// Metrics on which the candidate wins.
    #[must_use]
    pub fn candidate_wins(&self) -> usize {
        self.metrics
            .iter()
            .filter(|m| m.verdict == Verdict::CandidateBetter)
            .count()
    }
}

/// Compare each candidate against `reference`.
///
/// Only configured metrics present in both tables are compared. Metrics of
/// one pair run on the rayon pool.
#[must_use]
pub fn compare_tables(
    reference: &SweepTable,
    candidates: &[SweepTable],
    config: &EngineConfig,
) -> Vec<ComparisonReport> {
    candidates
        .iter()
        .map(|candidate| compare_pair(reference, candidate, config))
        .collect()
}

/// Compare one candidate against `reference`.
#[must_use]
pub fn compare_pair(
    reference: &SweepTable,
    candidate: &SweepTable,
    config: &EngineConfig,
) -> ComparisonReport {
    let metrics: Vec<MetricComparison> = config
        .metrics
        .par_iter()
        .filter(|m| reference.has_metric(**m) && candidate.has_metric(**m))
        .map(|&metric| {
            let bd_rate = metric_bd_rate(reference, candidate, metric, &config.bd_rate);
            MetricComparison {
                metric,
                bd_rate,
                verdict: Verdict::from_bd_rate(bd_rate),
            }
        })
        .collect();

    ComparisonReport {
        reference: reference.name.clone(),
        candidate: candidate.name.clone(),
        reference_encode_time: reference.average_encode_time(),
        candidate_encode_time: candidate.average_encode_time(),
        metrics,
        bd_rate_config: config.bd_rate,
        timestamp: chrono::Utc::now(),
    }
}

fn metric_bd_rate(
    reference: &SweepTable,
    candidate: &SweepTable,
    metric: Metric,
    config: &BdRateConfig,
) -> Option<f64> {
    let result = reference
        .curve(metric)
        .and_then(|r| candidate.curve(metric).map(|c| (r, c)))
        .and_then(|(r, c)| try_bd_rate(&r, &c, config));

    match result {
        Ok(bd) => Some(bd),
        Err(e) => {
            tracing::debug!(
                reference = %reference.name,
                candidate = %candidate.name,
                metric = %metric,
                "no BD-Rate: {e}"
            );
            None
        }
    }
}

mod chrono_serde {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        dt.to_rfc3339().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
