//! Printing and persisting comparison results.
//!
//! The BD-Rate vs encode time CSV accumulates across runs: rows are appended
//! and the header is written only when the file is created.

use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::metrics::Metric;

use super::compare::ComparisonReport;
use super::sweep::SweepTable;

impl ComparisonReport {
    /// Print the per-metric BD-Rates and encode times to stdout.
    pub fn print_summary(&self) {
        println!("BD-Rate: '{}' vs '{}'", self.reference, self.candidate);
        println!("{:-<72}", "");
        println!("{:<28} {:>10}  Verdict", "Metric", "BD-Rate");
        println!("{:-<72}", "");

        for m in &self.metrics {
            let bd = m
                .bd_rate
                .map(|v| format!("{v:.2}%"))
                .unwrap_or_else(|| "n/a".to_string());
            println!(
                "{:<28} {:>10}  {}",
                m.metric.label(),
                bd,
                m.verdict.message(&self.reference, &self.candidate)
            );
        }

        println!();
        for (name, time) in [
            (&self.reference, self.reference_encode_time),
            (&self.candidate, self.candidate_encode_time),
        ] {
            match time {
                Some(t) => println!("Average encode time for {name}: {t:.5} seconds"),
                None => println!("Average encode time for {name}: n/a"),
            }
        }
    }
}

/// One row of the BD-Rate vs encode time CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BdTimeRow {
    pub name: String,
    /// Mean encode time in seconds, 0 when unknown.
    pub avg_encode_time: f64,
    /// Missing metrics are written as 0.
    pub bd_rates: BTreeMap<Metric, f64>,
}

impl BdTimeRow {
    /// Row for a reference (or lone) table: every BD-Rate is 0.
    #[must_use]
    pub fn reference(table: &SweepTable) -> Self {
        Self {
            name: table.name.clone(),
            avg_encode_time: table.average_encode_time().unwrap_or(0.0),
            bd_rates: BTreeMap::new(),
        }
    }

    /// Row for the candidate side of a comparison.
    #[must_use]
    pub fn candidate(report: &ComparisonReport) -> Self {
        Self {
            name: report.candidate.clone(),
            avg_encode_time: report.candidate_encode_time.unwrap_or(0.0),
            bd_rates: report
                .metrics
                .iter()
                .filter_map(|m| m.bd_rate.map(|bd| (m.metric, bd)))
                .collect(),
        }
    }

    fn record(&self) -> Vec<String> {
        let mut record = vec![self.name.clone(), format!("{:.5}", self.avg_encode_time)];
        record.extend(
            Metric::ALL
                .iter()
                .map(|m| format!("{:.5}", self.bd_rates.get(m).copied().unwrap_or(0.0))),
        );
        record
    }
}

/// Header of the BD-Rate vs encode time CSV.
#[must_use]
pub fn bd_time_header() -> Vec<String> {
    let mut header = vec!["name".to_string(), "avg_encode_time".to_string()];
    header.extend(Metric::ALL.iter().map(|m| m.bd_column()));
    header
}

/// Rows for one comparison run: the reference first, then each candidate.
#[must_use]
pub fn bd_time_rows(reference: &SweepTable, reports: &[ComparisonReport]) -> Vec<BdTimeRow> {
    std::iter::once(BdTimeRow::reference(reference))
        .chain(reports.iter().map(BdTimeRow::candidate))
        .collect()
}

/// Append rows to the BD-Rate vs encode time CSV at `path`.
pub fn append_bd_time_csv(path: impl AsRef<Path>, rows: &[BdTimeRow]) -> Result<()> {
    let path = path.as_ref();
    let is_new = std::fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(file);

    if is_new {
        wtr.write_record(bd_time_header())?;
    }
    for row in rows {
        wtr.write_record(row.record())?;
    }
    wtr.flush()?;

    tracing::debug!(path = %path.display(), rows = rows.len(), "appended BD-Rate vs time rows");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::eval::compare::compare_pair;
    use crate::eval::sweep::SweepRow;

    fn sweep(name: &str, scale: f64) -> SweepTable {
        let mut table = SweepTable::new(name);
        for (i, vmaf) in [80.0, 88.0, 94.0].into_iter().enumerate() {
            let size = (scale * 1000.0 * 2f64.powi(i as i32)) as u64;
            table.push(
                SweepRow::new(i.to_string(), size)
                    .with_encode_time(2.0)
                    .with_metric(Metric::Vmaf, vmaf),
            );
        }
        table
    }

    #[test]
    fn test_header() {
        assert_eq!(
            bd_time_header().join(","),
            "name,avg_encode_time,ssimu2_mean_bd,butter_distance_bd,\
             wxpsnr_bd,vmaf_neg_bd,vmaf_bd,ssim_bd,psnr_bd"
        );
    }

    #[test]
    fn test_append_writes_header_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bd_vs_time.csv");

        let reference = sweep("ref.csv", 1.0);
        let report = compare_pair(&reference, &sweep("new.csv", 0.5), &EngineConfig::default());
        let rows = bd_time_rows(&reference, std::slice::from_ref(&report));

        append_bd_time_csv(&path, &rows).unwrap();
        append_bd_time_csv(&path, &rows[1..]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("name,avg_encode_time,"));
        assert_eq!(
            lines[1],
            "ref.csv,2.00000,0.00000,0.00000,0.00000,0.00000,0.00000,0.00000,0.00000"
        );
        assert_eq!(
            lines[2],
            "new.csv,2.00000,0.00000,0.00000,0.00000,0.00000,-50.00000,0.00000,0.00000"
        );
        assert_eq!(lines[3], lines[2]);
    }

    #[test]
    fn test_candidate_row_degenerate_is_zero() {
        let reference = sweep("ref.csv", 1.0);
        let mut lone = SweepTable::new("lone.csv");
        lone.push(SweepRow::new("1", 100).with_metric(Metric::Vmaf, 10.0));

        let report = compare_pair(&reference, &lone, &EngineConfig::default());
        let row = BdTimeRow::candidate(&report);
        assert!(row.bd_rates.is_empty());
        assert_eq!(row.avg_encode_time, 0.0);
        assert!(row.record()[2..].iter().all(|v| v == "0.00000"));
    }
}
