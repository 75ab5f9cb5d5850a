//! Encoder command-line preview.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use video_eval::Encoder;
use video_eval::encoder::ffmpeg_pipe_args;

pub fn run(encoder: &str, source: PathBuf, quality: &str, extra: Vec<String>) -> Result<()> {
    let encoder: Encoder = encoder.parse()?;
    let qualities = parse_qualities(quality)?;

    println!("Source pipe: {}", ffmpeg_pipe_args(&source).join(" "));
    println!("Encoder: {encoder}");
    println!("{:-<60}", "");

    for q in qualities {
        let output = encoder.output_file_name(&source, q);
        let cmd = encoder.command_args("-", &output, q, &extra);
        println!("q{:<4} {}", q, cmd.join(" "));
    }

    Ok(())
}

fn parse_qualities(quality: &str) -> Result<Vec<u32>> {
    let qualities = quality
        .split_whitespace()
        .map(|q| {
            q.parse::<u32>()
                .with_context(|| format!("Invalid quality value '{q}'"))
        })
        .collect::<Result<Vec<_>>>()?;
    if qualities.is_empty() {
        bail!("no quality values given");
    }
    Ok(qualities)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_qualities() {
        assert_eq!(parse_qualities("20 30  40").unwrap(), vec![20, 30, 40]);
        assert!(parse_qualities("20 high").is_err());
        assert!(parse_qualities("  ").is_err());
    }
}
