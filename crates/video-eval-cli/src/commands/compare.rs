//! BD-Rate comparison command.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use rayon::prelude::*;
use video_eval::eval::report::{BdTimeRow, append_bd_time_csv, bd_time_rows};
use video_eval::{EngineConfig, SweepImporter, compare_tables};

pub fn run(
    inputs: Vec<PathBuf>,
    bd_time_csv: Option<PathBuf>,
    output: Option<PathBuf>,
    config: &EngineConfig,
) -> Result<()> {
    let importer = SweepImporter::auto_detect();
    let tables = inputs
        .par_iter()
        .map(|path| {
            importer
                .import(path)
                .with_context(|| format!("Failed to import sweep from {}", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut tables = tables.into_iter();
    let Some(reference) = tables.next() else {
        bail!("no sweep tables given");
    };
    let candidates: Vec<_> = tables.collect();

    if candidates.is_empty() {
        println!("Need at least two CSV files to compute BD-Rate values.");
        match reference.average_encode_time() {
            Some(t) => println!("Average encode time for {}: {:.5} seconds", reference.name, t),
            None => println!("Average encode time for {}: n/a", reference.name),
        }
        if let Some(path) = &bd_time_csv {
            append_bd_time_csv(path, &[BdTimeRow::reference(&reference)])
                .with_context(|| format!("Failed to write to {}", path.display()))?;
        }
        return Ok(());
    }

    let reports = compare_tables(&reference, &candidates, config);
    for (i, report) in reports.iter().enumerate() {
        if i > 0 {
            println!();
        }
        report.print_summary();
    }

    if let Some(path) = &bd_time_csv {
        append_bd_time_csv(path, &bd_time_rows(&reference, &reports))
            .with_context(|| format!("Failed to write to {}", path.display()))?;
        println!();
        println!("BD-Rate vs encode time appended to: {}", path.display());
    }

    if let Some(output_path) = output {
        let json = serde_json::to_string_pretty(&reports)?;
        std::fs::write(&output_path, json)
            .with_context(|| format!("Failed to write to {}", output_path.display()))?;
        println!("Saved to: {}", output_path.display());
    }

    Ok(())
}
