//! Multi-source averaging command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use rayon::prelude::*;
use video_eval::{SweepImporter, SweepTable};

pub fn run(inputs: Vec<PathBuf>, output: PathBuf) -> Result<()> {
    let importer = SweepImporter::auto_detect();
    let tables = inputs
        .par_iter()
        .map(|path| {
            importer
                .import(path)
                .with_context(|| format!("Failed to import sweep from {}", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    for table in &tables {
        tracing::debug!(table = %table.name, rows = table.len(), "loaded sweep");
    }

    let name = output
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let averaged = SweepTable::average(name, &tables);

    println!("{:<10} {:>12} {:>14}", "q", "Encode (s)", "Size (bytes)");
    println!("{:-<40}", "");
    for row in &averaged.rows {
        let time = row
            .encode_time
            .map(|t| format!("{t:.2}"))
            .unwrap_or_else(|| "-".to_string());
        println!("{:<10} {:>12} {:>14}", row.q, time, row.output_filesize);
    }

    averaged
        .save_csv(&output)
        .with_context(|| format!("Failed to write to {}", output.display()))?;
    println!("Averaged {} sources into {}", tables.len(), output.display());

    Ok(())
}
