//! video-eval CLI - Video encoder comparison tool

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use video_eval::{EngineConfig, PercentileMethod};

mod commands;

/// Video encoder metric aggregation and BD-Rate comparison.
#[derive(Parser)]
#[command(name = "video-eval")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Engine configuration (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Percentile convention for p10 (nearest_rank, interpolated)
    #[arg(long, global = true, env = "VIDEO_EVAL_PERCENTILE")]
    percentile: Option<String>,

    /// BD-Rate integration grid size
    #[arg(long, global = true)]
    samples: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize per-frame metric samples
    Aggregate {
        /// Sample file: one value per line, or CSV with --column
        #[arg(short, long)]
        input: PathBuf,

        /// CSV column holding the samples
        #[arg(long)]
        column: Option<String>,

        /// Treat samples as Butteraugli distances
        #[arg(long)]
        butteraugli: bool,

        /// Output JSON file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Score one encode and append its row to a sweep CSV
    Row(commands::row::RowArgs),

    /// Combine per-plane XPSNR into W-XPSNR
    Xpsnr {
        /// Y plane XPSNR (dB)
        y: f64,

        /// U plane XPSNR (dB)
        u: f64,

        /// V plane XPSNR (dB)
        v: f64,

        /// Peak sample value (defaults to the configured peak)
        #[arg(long)]
        peak: Option<u32>,
    },

    /// Average quality sweeps of several sources into one table
    Average {
        /// Sweep CSV files, one per source
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output CSV file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// BD-Rate of sweep tables against the first one
    Compare {
        /// Sweep CSV files; the first is the reference
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Append BD-Rate vs encode time rows to this CSV
        #[arg(long)]
        bd_time_csv: Option<PathBuf>,

        /// Output JSON file with all comparison reports
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the ffmpeg and encoder command lines of a quality sweep
    EncodeArgs {
        /// Encoder (x264, x265, svtav1, vvenc, aomenc, vpxenc)
        encoder: String,

        /// Source video
        #[arg(short, long)]
        source: PathBuf,

        /// Quality values, space separated (e.g. "20 30 40 50")
        #[arg(short, long)]
        quality: String,

        /// Additional encoder arguments (after `--`)
        #[arg(last = true)]
        extra: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&cli)?;

    match cli.command {
        Commands::Aggregate { input, column, butteraugli, output } => {
            commands::aggregate::run(input, column, butteraugli, output, &config)
        }
        Commands::Row(args) => commands::row::run(args, &config),
        Commands::Xpsnr { y, u, v, peak } => commands::xpsnr::run(y, u, v, peak, &config),
        Commands::Average { inputs, output } => commands::average::run(inputs, output),
        Commands::Compare { inputs, bd_time_csv, output } => {
            commands::compare::run(inputs, bd_time_csv, output, &config)
        }
        Commands::EncodeArgs { encoder, source, quality, extra } => {
            commands::encode_args::run(&encoder, source, &quality, extra)
        }
    }
}

/// Config file first, then command-line overrides.
fn load_config(cli: &Cli) -> Result<EngineConfig> {
    let mut config = match &cli.config {
        Some(path) => EngineConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => EngineConfig::default(),
    };

    if let Some(method) = &cli.percentile {
        config.percentile_method = method.parse::<PercentileMethod>()?;
    }
    if let Some(samples) = cli.samples {
        config.bd_rate.samples = samples;
    }
    config.validate()?;

    tracing::debug!(?config, "engine configuration");
    Ok(config)
}
