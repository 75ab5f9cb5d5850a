//! Score one encode and append it to a sweep CSV.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;
use video_eval::import::read_samples;
use video_eval::metrics::XpsnrPlanes;
use video_eval::{EngineConfig, VideoScores};

#[derive(Args, Debug)]
pub struct RowArgs {
    /// Sweep CSV to append to (header written when the file is new)
    #[arg(short, long)]
    pub output: PathBuf,

    /// Quality setting of this encode (e.g. CRF)
    #[arg(short, long)]
    pub quality: String,

    /// Encoded file size in bytes
    #[arg(long, required_unless_present = "encoded")]
    pub size: Option<u64>,

    /// Encoded file; its size is used instead of --size
    #[arg(long, conflicts_with = "size")]
    pub encoded: Option<PathBuf>,

    /// Wall-clock encode time in seconds
    #[arg(long)]
    pub encode_time: Option<f64>,

    /// Per-frame SSIMULACRA2 scores, one per line
    #[arg(long)]
    pub ssimulacra2: Option<PathBuf>,

    /// Per-frame Butteraugli distances, one per line
    #[arg(long)]
    pub butteraugli: Option<PathBuf>,

    /// Per-plane XPSNR in dB
    #[arg(long, num_args = 3, value_names = ["Y", "U", "V"])]
    pub xpsnr: Option<Vec<f64>>,

    /// VMAF NEG harmonic mean
    #[arg(long)]
    pub vmaf_neg: Option<f64>,

    #[arg(long)]
    pub vmaf: Option<f64>,

    #[arg(long)]
    pub ssim: Option<f64>,

    #[arg(long)]
    pub psnr: Option<f64>,

    /// Name shown in the printed breakdown
    #[arg(long)]
    pub name: Option<String>,
}

pub fn run(args: RowArgs, config: &EngineConfig) -> Result<()> {
    let scores = build_scores(&args, config)?;
    let size = output_size(&args)?;

    let name = args
        .name
        .clone()
        .unwrap_or_else(|| format!("q{}", args.quality));
    scores.print_summary(&name, config.xpsnr_peak);

    let row = scores.to_row(&args.quality, args.encode_time, size, config.xpsnr_peak);
    if row.metrics.is_empty() {
        tracing::warn!(q = %row.q, "no metrics given, appending size and time only");
    }
    row.append_csv(&args.output)
        .with_context(|| format!("Failed to append to {}", args.output.display()))?;

    println!();
    println!("Appended q={} to: {}", row.q, args.output.display());
    Ok(())
}

/// Collect every metric passed on the command line.
fn build_scores(args: &RowArgs, config: &EngineConfig) -> Result<VideoScores> {
    let method = config.percentile_method;
    let mut scores = VideoScores::new();

    if let Some(path) = &args.ssimulacra2 {
        let series = read_samples(path)
            .with_context(|| format!("Failed to read samples from {}", path.display()))?;
        scores = scores.with_ssimulacra2(&series, method);
    }
    if let Some(path) = &args.butteraugli {
        let series = read_samples(path)
            .with_context(|| format!("Failed to read samples from {}", path.display()))?;
        scores = scores.with_butteraugli(&series, method);
    }
    match args.xpsnr.as_deref() {
        Some(&[y, u, v]) => scores = scores.with_xpsnr(XpsnrPlanes::new(y, u, v)),
        Some(other) => bail!("--xpsnr takes three values (Y U V), got {}", other.len()),
        None => {}
    }

    scores.vmaf_neg = args.vmaf_neg;
    scores.vmaf = args.vmaf;
    scores.ssim = args.ssim;
    scores.psnr = args.psnr;
    Ok(scores)
}

fn output_size(args: &RowArgs) -> Result<u64> {
    if let Some(path) = &args.encoded {
        let meta = std::fs::metadata(path)
            .with_context(|| format!("Failed to stat {}", path.display()))?;
        return Ok(meta.len());
    }
    args.size.context("either --size or --encoded is required")
}

#[cfg(test)]
mod tests {
    use super::*;
    use video_eval::{Metric, SweepImporter};

    fn args(output: PathBuf, quality: &str) -> RowArgs {
        RowArgs {
            output,
            quality: quality.to_string(),
            size: Some(1000),
            encoded: None,
            encode_time: None,
            ssimulacra2: None,
            butteraugli: None,
            xpsnr: None,
            vmaf_neg: None,
            vmaf: None,
            ssim: None,
            psnr: None,
            name: None,
        }
    }

    #[test]
    fn test_build_scores_from_sample_files() {
        let dir = tempfile::tempdir().unwrap();
        let ssimu2 = dir.path().join("ssimu2.txt");
        std::fs::write(&ssimu2, "80.0\n82.0\n84.0\n").unwrap();

        let mut a = args(dir.path().join("sweep.csv"), "28");
        a.ssimulacra2 = Some(ssimu2);
        a.xpsnr = Some(vec![40.0, 40.0, 40.0]);
        a.vmaf = Some(95.0);

        let scores = build_scores(&a, &EngineConfig::default()).unwrap();
        let row = scores.to_row("28", None, 1000, EngineConfig::default().xpsnr_peak);
        assert_eq!(row.metric(Metric::Ssimulacra2), Some(82.0));
        assert!((row.metric(Metric::WeightedXpsnr).unwrap() - 40.0).abs() < 1e-9);
        assert_eq!(row.metric(Metric::Vmaf), Some(95.0));
        assert_eq!(row.metric(Metric::Psnr), None);
    }

    #[test]
    fn test_run_appends_rows() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("sweep.csv");
        let config = EngineConfig::default();

        let mut first = args(output.clone(), "20");
        first.vmaf = Some(93.0);
        first.encode_time = Some(3.0);
        run(first, &config).unwrap();

        let mut second = args(output.clone(), "30");
        second.size = Some(500);
        second.vmaf = Some(88.0);
        run(second, &config).unwrap();

        let text = std::fs::read_to_string(&output).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert_eq!(text.matches("output_filesize").count(), 1);

        let table = SweepImporter::auto_detect().import(&output).unwrap();
        assert_eq!(table.rows[0].q, "20");
        assert_eq!(table.rows[0].encode_time, Some(3.0));
        assert_eq!(table.rows[1].output_filesize, 500);
        assert_eq!(table.rows[1].metric(Metric::Vmaf), Some(88.0));
    }

    #[test]
    fn test_xpsnr_needs_three_planes() {
        let mut a = args(PathBuf::from("unused.csv"), "20");
        a.xpsnr = Some(vec![40.0, 41.0]);
        assert!(build_scores(&a, &EngineConfig::default()).is_err());
    }
}
