//! CSV import for per-frame samples and quality-sweep tables.
//!
//! Metric tools and earlier benchmark runs write their numbers in slightly
//! different shapes, so both readers are lenient about layout and strict
//! about numbers.
//!
//! ## Per-frame samples
//!
//! [`parse_samples`] / [`read_samples`] take one number per line; blank lines
//! and `#` comments are skipped. [`read_sample_column`] takes one named
//! column of a CSV file with a header row.
//!
//! ## Sweep tables
//!
//! [`SweepImporter`] reads the `q, encode_time, output_filesize, <metrics>`
//! schema. Header names are matched case-insensitively, common aliases are
//! recognised, and any subset of metric columns may be present.
//!
//! ## Example
//!
//! ```rust,ignore
//! use video_eval::import::{SweepImporter, SweepSchema};
//!
//! let schema = SweepSchema::builder()
//!     .quality_column("crf")
//!     .size_column("bytes")
//!     .build();
//!
//! let table = SweepImporter::new(schema).import("svtav1_preset4.csv")?;
//! ```

use std::collections::BTreeMap;
use std::io;
use std::path::Path;

use crate::error::{Error, Result};
use crate::eval::sweep::{ENCODE_TIME_COLUMN, FILESIZE_COLUMN, Q_COLUMN, SweepRow, SweepTable};
use crate::metrics::{Metric, MetricSeries};

//=============================================================================
// Per-frame samples
//=============================================================================

/// Parse one sample per line.
///
/// Line numbers in errors are 1-based.
///
/// # Example
///
/// ```
/// use video_eval::import::parse_samples;
///
/// let series = parse_samples("# ssimulacra2\n81.5\n\n79.25\n").unwrap();
/// assert_eq!(series.samples(), &[81.5, 79.25]);
/// ```
pub fn parse_samples(text: &str) -> Result<MetricSeries> {
    let mut samples = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        samples.push(parse_number(line, idx + 1)?);
    }
    MetricSeries::new(samples)
}

/// Read a file of one sample per line.
pub fn read_samples(path: impl AsRef<Path>) -> Result<MetricSeries> {
    let text = std::fs::read_to_string(path.as_ref())?;
    parse_samples(&text)
}

/// Read one named column of a CSV file with a header row.
pub fn read_sample_column(path: impl AsRef<Path>, column: &str) -> Result<MetricSeries> {
    let file = std::fs::File::open(path.as_ref())?;
    read_sample_column_from(file, column)
}

/// [`read_sample_column`] over any reader.
pub fn read_sample_column_from<R: io::Read>(reader: R, column: &str) -> Result<MetricSeries> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();
    let header_refs: Vec<&str> = headers.iter().map(String::as_str).collect();
    let idx = find_header_index(&header_refs, column)
        .ok_or_else(|| Error::MissingColumn(column.to_string()))?;

    let mut samples = Vec::new();
    for (line_num, record) in reader.records().enumerate() {
        // +2 for 1-based and header
        let line = line_num + 2;
        let record = record.map_err(|e| Error::CsvImport {
            line,
            reason: e.to_string(),
        })?;
        let cell = record.get(idx).unwrap_or("");
        samples.push(parse_number(cell, line)?);
    }
    MetricSeries::new(samples)
}

fn parse_number(cell: &str, line: usize) -> Result<f64> {
    cell.trim().parse().map_err(|_| Error::CsvImport {
        line,
        reason: format!("'{cell}' is not a number"),
    })
}

//=============================================================================
// Sweep tables
//=============================================================================

/// Column overrides for sweep-table import.
///
/// Unset columns are found by their canonical name or an alias.
#[derive(Debug, Clone, Default)]
pub struct SweepSchema {
    /// Column name for the quality setting.
    pub quality_column: Option<String>,
    /// Column name for the encoded size in bytes.
    pub size_column: Option<String>,
    /// Column name for encode time in seconds.
    pub encode_time_column: Option<String>,
    /// Explicit column names for individual metrics.
    pub metric_columns: BTreeMap<Metric, String>,
}

impl SweepSchema {
    /// Create a schema builder.
    #[must_use]
    pub fn builder() -> SweepSchemaBuilder {
        SweepSchemaBuilder::default()
    }

    /// Create a schema that auto-detects every column.
    #[must_use]
    pub fn auto_detect() -> Self {
        Self::default()
    }

    /// Try to find a column index by name (case-insensitive, with aliases).
    fn find_column(headers: &[&str], primary: Option<&str>, aliases: &[&str]) -> Option<usize> {
        primary
            .and_then(|name| find_header_index(headers, name))
            .or_else(|| aliases.iter().find_map(|alias| find_header_index(headers, alias)))
    }

    fn metric_column(&self, headers: &[&str], metric: Metric) -> Option<usize> {
        if let Some(name) = self.metric_columns.get(&metric) {
            return find_header_index(headers, name);
        }
        headers.iter().position(|h| Metric::from_column(h) == Some(metric))
    }
}

/// Builder for [`SweepSchema`].
#[derive(Debug, Default)]
pub struct SweepSchemaBuilder {
    schema: SweepSchema,
}

impl SweepSchemaBuilder {
    /// Set the quality column name.
    #[must_use]
    pub fn quality_column(mut self, name: impl Into<String>) -> Self {
        self.schema.quality_column = Some(name.into());
        self
    }

    /// Set the file size column name.
    #[must_use]
    pub fn size_column(mut self, name: impl Into<String>) -> Self {
        self.schema.size_column = Some(name.into());
        self
    }

    /// Set the encode time column name.
    #[must_use]
    pub fn encode_time_column(mut self, name: impl Into<String>) -> Self {
        self.schema.encode_time_column = Some(name.into());
        self
    }

    /// Read `metric` from a column with a non-standard name.
    #[must_use]
    pub fn metric_column(mut self, metric: Metric, name: impl Into<String>) -> Self {
        self.schema.metric_columns.insert(metric, name.into());
        self
    }

    /// Build the schema.
    #[must_use]
    pub fn build(self) -> SweepSchema {
        self.schema
    }
}

/// Reader for quality-sweep CSV files.
#[derive(Debug, Clone, Default)]
pub struct SweepImporter {
    schema: SweepSchema,
}

impl SweepImporter {
    /// Create a new importer with the given schema.
    #[must_use]
    pub fn new(schema: SweepSchema) -> Self {
        Self { schema }
    }

    /// Create an importer that auto-detects columns.
    #[must_use]
    pub fn auto_detect() -> Self {
        Self::new(SweepSchema::auto_detect())
    }

    /// Import a sweep table; the table is named after the file.
    pub fn import(&self, path: impl AsRef<Path>) -> Result<SweepTable> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let file = std::fs::File::open(path)?;
        self.import_reader(name, file)
    }

    /// Import a sweep table from any reader.
    ///
    /// Rows without a usable quality label or file size are skipped with a
    /// warning. Empty metric and encode time cells are treated as absent;
    /// unparsable ones are dropped with a warning.
    pub fn import_reader<R: io::Read>(
        &self,
        name: impl Into<String>,
        reader: R,
    ) -> Result<SweepTable> {
        let name = name.into();
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();
        let header_refs: Vec<&str> = headers.iter().map(String::as_str).collect();

        let quality_idx = SweepSchema::find_column(
            &header_refs,
            self.schema.quality_column.as_deref(),
            &[Q_COLUMN, "quality", "crf", "qp"],
        )
        .ok_or_else(|| Error::MissingColumn(Q_COLUMN.to_string()))?;

        let size_idx = SweepSchema::find_column(
            &header_refs,
            self.schema.size_column.as_deref(),
            &[FILESIZE_COLUMN, "size", "file_size", "filesize", "bytes"],
        )
        .ok_or_else(|| Error::MissingColumn(FILESIZE_COLUMN.to_string()))?;

        let time_idx = SweepSchema::find_column(
            &header_refs,
            self.schema.encode_time_column.as_deref(),
            &[ENCODE_TIME_COLUMN, "time", "encode_seconds", "encoding_time"],
        );

        let metric_idx: Vec<(Metric, usize)> = Metric::ALL
            .into_iter()
            .filter_map(|m| self.schema.metric_column(&header_refs, m).map(|i| (m, i)))
            .collect();

        let mut table = SweepTable::new(name);

        for (line_num, record) in reader.records().enumerate() {
            let line = line_num + 2;
            let record = record.map_err(|e| Error::CsvImport {
                line,
                reason: e.to_string(),
            })?;

            let q = record.get(quality_idx).unwrap_or("");
            if q.is_empty() {
                tracing::warn!(table = %table.name, line, "skipping row without a quality label");
                continue;
            }

            let Some(size) = record.get(size_idx).and_then(parse_size) else {
                tracing::warn!(
                    table = %table.name,
                    line,
                    "skipping row without a usable file size"
                );
                continue;
            };

            let mut row = SweepRow::new(q, size);
            let time_cell = time_idx.and_then(|i| record.get(i)).unwrap_or("");
            if !time_cell.is_empty() {
                match time_cell.parse::<f64>() {
                    Ok(seconds) => row.encode_time = Some(seconds),
                    Err(_) => {
                        tracing::warn!(
                            table = %table.name,
                            line,
                            "ignoring non-numeric encode time '{time_cell}'"
                        );
                    }
                }
            }

            for &(metric, idx) in &metric_idx {
                let cell = record.get(idx).unwrap_or("");
                if cell.is_empty() {
                    continue;
                }
                match cell.parse::<f64>() {
                    Ok(value) => {
                        row.metrics.insert(metric, value);
                    }
                    Err(_) => {
                        tracing::warn!(
                            table = %table.name,
                            line,
                            metric = %metric,
                            "ignoring non-numeric value '{cell}'"
                        );
                    }
                }
            }

            table.push(row);
        }

        Ok(table)
    }
}

/// Byte counts may be written as floats by other tools; truncate them.
fn parse_size(cell: &str) -> Option<u64> {
    if let Ok(size) = cell.parse::<u64>() {
        return Some(size);
    }
    let value: f64 = cell.parse().ok()?;
    (value.is_finite() && value >= 0.0).then(|| value as u64)
}

/// Find a header index by name (case-insensitive).
fn find_header_index(headers: &[&str], name: &str) -> Option<usize> {
    let name_lower = name.trim().to_lowercase();
    headers.iter().position(|h| h.trim().to_lowercase() == name_lower)
}
