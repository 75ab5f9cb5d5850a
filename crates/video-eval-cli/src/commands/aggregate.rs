//! Per-frame aggregation command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;
use video_eval::EngineConfig;
use video_eval::import::{read_sample_column, read_samples};
use video_eval::metrics::ButteraugliSummary;
use video_eval::stats::AggregateStats;

#[derive(Serialize)]
#[serde(untagged)]
enum Output {
    Scores(AggregateStats),
    Butteraugli(ButteraugliSummary),
}

pub fn run(
    input: PathBuf,
    column: Option<String>,
    butteraugli: bool,
    output: Option<PathBuf>,
    config: &EngineConfig,
) -> Result<()> {
    tracing::debug!(input = %input.display(), ?column, "loading samples");

    let series = match &column {
        Some(col) => read_sample_column(&input, col),
        None => read_samples(&input),
    }
    .with_context(|| format!("Failed to read samples from {}", input.display()))?;

    let method = config.percentile_method;
    let result = if butteraugli {
        let summary = ButteraugliSummary::from_distances(&series, method);
        println!("Butteraugli ({} frames):", series.len());
        println!("{:-<40}", "");
        println!("{:<15} {:>12.5}", "Distance:", summary.distance);
        println!("{:<15} {:>12.5}", "Max Distance:", summary.max_distance);
        println!();
        println!("Video Butteraugli:");
        print_stats(&summary.perceptual);
        Output::Butteraugli(summary)
    } else {
        let stats = series.aggregate(method);
        println!("{} ({} frames):", input.display(), stats.count);
        println!("{:-<40}", "");
        print_stats(&stats);
        Output::Scores(stats)
    };

    if let Some(output_path) = output {
        let json = serde_json::to_string_pretty(&result)?;
        std::fs::write(&output_path, json)
            .with_context(|| format!("Failed to write to {}", output_path.display()))?;
        println!("Saved to: {}", output_path.display());
    }

    Ok(())
}

fn print_stats(stats: &AggregateStats) {
    println!("{:<15} {:>12.5}", "Average:", stats.average);
    println!("{:<15} {:>12.5}", "Harmonic Mean:", stats.harmonic_mean);
    println!("{:<15} {:>12.5}", "Std Deviation:", stats.std_dev);
    println!("{:<15} {:>12.5}", "10th Pctile:", stats.p10);
    println!("{:<15} {:>12.5}", "Min:", stats.min);
    println!("{:<15} {:>12.5}", "Max:", stats.max);
    println!("({} percentile)", stats.percentile_method);
}
