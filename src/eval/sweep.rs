//! Quality sweeps: one row per quality setting of one encoder configuration.
//!
//! A [`SweepTable`] is what the encode-and-score pipeline produces for a
//! source video (or the average over several sources). Each metric column
//! becomes one rate-distortion curve with `output_filesize` as the rate.

use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::metrics::Metric;
use crate::stats::{RateDistortionCurve, mean};

/// Fixed leading columns of the sweep CSV schema.
pub const Q_COLUMN: &str = "q";
pub const ENCODE_TIME_COLUMN: &str = "encode_time";
pub const FILESIZE_COLUMN: &str = "output_filesize";

/// Scores for one quality setting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepRow {
    /// Quality setting as passed to the encoder (e.g. CRF `28`).
    pub q: String,

    /// Wall-clock encode time in seconds.
    pub encode_time: Option<f64>,

    /// Encoded file size in bytes.
    pub output_filesize: u64,

    /// Aggregated metric values present for this row.
    #[serde(default)]
    pub metrics: BTreeMap<Metric, f64>,
}

impl SweepRow {
    #[must_use]
    pub fn new(q: impl Into<String>, output_filesize: u64) -> Self {
        Self {
            q: q.into(),
            encode_time: None,
            output_filesize,
            metrics: BTreeMap::new(),
        }
    }

    /// Set the encode time in seconds.
    #[must_use]
    pub fn with_encode_time(mut self, seconds: f64) -> Self {
        self.encode_time = Some(seconds);
        self
    }

    /// Set one metric value.
    #[must_use]
    pub fn with_metric(mut self, metric: Metric, value: f64) -> Self {
        self.metrics.insert(metric, value);
        self
    }

    #[must_use]
    pub fn metric(&self, metric: Metric) -> Option<f64> {
        self.metrics.get(&metric).copied()
    }

    /// Append this row to a sweep CSV file.
    ///
    /// A missing or empty file gets the full header (every metric column)
    /// first. An existing file keeps its own header and the row is laid out
    /// to match it; metrics without a column there are dropped with a
    /// warning.
    pub fn append_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let is_new = std::fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);

        let header: Vec<String> = if is_new {
            full_header().into_iter().map(String::from).collect()
        } else {
            csv::Reader::from_path(path)?
                .headers()?
                .iter()
                .map(String::from)
                .collect()
        };

        for metric in self.metrics.keys() {
            if !header.iter().any(|h| Metric::from_column(h) == Some(*metric)) {
                tracing::warn!(
                    path = %path.display(),
                    metric = %metric,
                    "sweep file has no column for metric, value dropped"
                );
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        if is_new {
            wtr.write_record(&header)?;
        }
        wtr.write_record(header.iter().map(|column| self.cell(column)))?;
        wtr.flush()?;

        tracing::debug!(path = %path.display(), q = %self.q, "appended sweep row");
        Ok(())
    }

    /// Formatted value for one sweep CSV column; empty when absent.
    fn cell(&self, column: &str) -> String {
        match column.trim() {
            Q_COLUMN => self.q.clone(),
            ENCODE_TIME_COLUMN => self.encode_time.map(format_value).unwrap_or_default(),
            FILESIZE_COLUMN => self.output_filesize.to_string(),
            other => Metric::from_column(other)
                .and_then(|m| self.metric(m))
                .map(format_value)
                .unwrap_or_default(),
        }
    }
}

fn format_value(value: f64) -> String {
    format!("{value:.5}")
}

/// Fixed columns followed by every metric column.
fn full_header() -> Vec<&'static str> {
    let mut header = vec![Q_COLUMN, ENCODE_TIME_COLUMN, FILESIZE_COLUMN];
    header.extend(Metric::ALL.iter().map(|m| m.column()));
    header
}

/// Rows of one encoder configuration, in sweep order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SweepTable {
    /// Display name, usually the CSV file name.
    pub name: String,

    pub rows: Vec<SweepRow>,
}

impl SweepTable {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: SweepRow) {
        self.rows.push(row);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Metrics present in at least one row, in column order.
    #[must_use]
    pub fn metrics(&self) -> Vec<Metric> {
        Metric::ALL
            .into_iter()
            .filter(|m| self.has_metric(*m))
            .collect()
    }

    #[must_use]
    pub fn has_metric(&self, metric: Metric) -> bool {
        self.rows.iter().any(|r| r.metrics.contains_key(&metric))
    }

    /// `(output_filesize, metric)` curve over the rows that carry `metric`.
    ///
    /// Fails with [`crate::Error::InvalidRate`] when a row has a zero size.
    pub fn curve(&self, metric: Metric) -> Result<RateDistortionCurve> {
        RateDistortionCurve::from_labeled(self.rows.iter().filter_map(|row| {
            row.metric(metric)
                .map(|value| (row.output_filesize as f64, value, row.q.as_str()))
        }))
    }

    /// Mean encode time over the rows that recorded one.
    #[must_use]
    pub fn average_encode_time(&self) -> Option<f64> {
        let times: Vec<f64> = self.rows.iter().filter_map(|r| r.encode_time).collect();
        (!times.is_empty()).then(|| mean(&times))
    }

    /// Average several sources' sweeps quality level by quality level.
    ///
    /// Quality levels keep their first-seen order. Every value is the mean
    /// over the tables that have it; the file size is truncated to whole
    /// bytes.
    #[must_use]
    pub fn average(name: impl Into<String>, tables: &[SweepTable]) -> SweepTable {
        let mut order: Vec<&str> = Vec::new();
        let mut groups: BTreeMap<&str, Vec<&SweepRow>> = BTreeMap::new();
        for row in tables.iter().flat_map(|t| &t.rows) {
            let group = groups.entry(row.q.as_str()).or_default();
            if group.is_empty() {
                order.push(row.q.as_str());
            }
            group.push(row);
        }

        let mut averaged = SweepTable::new(name);
        for q in order {
            let group = &groups[q];

            let sizes: u128 = group.iter().map(|r| u128::from(r.output_filesize)).sum();
            let size = (sizes / group.len() as u128) as u64;

            let times: Vec<f64> = group.iter().filter_map(|r| r.encode_time).collect();
            let mut row = SweepRow::new(q, size);
            if !times.is_empty() {
                row.encode_time = Some(mean(&times));
            }

            for metric in Metric::ALL {
                let values: Vec<f64> = group.iter().filter_map(|r| r.metric(metric)).collect();
                if !values.is_empty() {
                    row.metrics.insert(metric, mean(&values));
                }
            }
            averaged.push(row);
        }
        averaged
    }

    /// Write the table in the sweep CSV schema.
    ///
    /// Only metric columns present in some row are emitted. Floats carry
    /// five decimals; missing cells are left empty.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<()> {
        let metrics = self.metrics();
        let mut wtr = csv::Writer::from_writer(writer);

        let mut header = vec![Q_COLUMN, ENCODE_TIME_COLUMN, FILESIZE_COLUMN];
        header.extend(metrics.iter().map(|m| m.column()));
        wtr.write_record(&header)?;

        for row in &self.rows {
            wtr.write_record(header.iter().map(|column| row.cell(column)))?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Write the table to a CSV file, replacing any existing file.
    ///
    /// Use [`SweepRow::append_csv`] to grow a sweep file one quality setting
    /// at a time.
    pub fn save_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path.as_ref())?;
        self.write_csv(io::BufWriter::new(file))
    }
}
