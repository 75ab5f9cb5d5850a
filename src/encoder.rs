//! Encoder command lines for quality sweeps.
//!
//! Building a command never spawns anything. The sweep pipeline decodes the
//! source with ffmpeg into a 10-bit y4m stream ([`ffmpeg_pipe_args`]) and
//! feeds it to the encoder's stdin, so `input` is normally `"-"`.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Supported video encoders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoder {
    X264,
    X265,
    SvtAv1,
    VvenC,
    AomEnc,
    VpxEnc,
}

impl Encoder {
    pub const ALL: [Encoder; 6] = [
        Self::X264,
        Self::X265,
        Self::SvtAv1,
        Self::VvenC,
        Self::AomEnc,
        Self::VpxEnc,
    ];

    /// Short name used on the command line and in output file names.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::X264 => "x264",
            Self::X265 => "x265",
            Self::SvtAv1 => "svtav1",
            Self::VvenC => "vvenc",
            Self::AomEnc => "aomenc",
            Self::VpxEnc => "vpxenc",
        }
    }

    /// Executable name.
    #[must_use]
    pub fn program(self) -> &'static str {
        match self {
            Self::X264 => "x264",
            Self::X265 => "x265",
            Self::SvtAv1 => "SvtAv1EncApp",
            Self::VvenC => "vvencapp",
            Self::AomEnc => "aomenc",
            Self::VpxEnc => "vpxenc",
        }
    }

    /// Full argument vector, program first.
    ///
    /// `q` is the encoder's constant-quality knob (CRF, QP or cq-level).
    /// Empty strings in `extra` are dropped.
    #[must_use]
    pub fn command_args(self, input: &str, output: &Path, q: u32, extra: &[String]) -> Vec<String> {
        let out = output.display().to_string();
        let out = out.as_str();
        let q = q.to_string();
        let q = q.as_str();
        let cq = format!("--cq-level={q}");
        let cq = cq.as_str();

        let base = match self {
            Self::X264 => args(&["--demuxer", "y4m", "--crf", q, "-o", out, input]),
            Self::X265 => args(&["--y4m", "--input", input, "--crf", q, "-o", out]),
            Self::SvtAv1 => args(&["-i", input, "-b", out, "--crf", q]),
            Self::VvenC => args(&["--y4m", "-i", input, "--qp", q, "-o", out]),
            Self::AomEnc => args(&["--ivf", "--end-usage=q", cq, "-o", out, input]),
            Self::VpxEnc => args(&["--ivf", "--codec=vp9", "--end-usage=q", cq, "-o", out, input]),
        };

        std::iter::once(self.program().to_string())
            .chain(base)
            .chain(extra.iter().filter(|a| !a.is_empty()).cloned())
            .collect()
    }

    /// Output path for encoding `source` at `q`: `./{stem}_{encoder}_q{q}.ivf`.
    #[must_use]
    pub fn output_file_name(self, source: &Path, q: u32) -> PathBuf {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        PathBuf::from(format!("./{stem}_{}_q{q}.ivf", self.name()))
    }
}

fn args(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

impl fmt::Display for Encoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Encoder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|e| e.name() == lower || e.program().to_lowercase() == lower)
            .ok_or_else(|| {
                Error::InvalidConfig(format!(
                    "unknown encoder '{s}' \
                     (expected one of x264, x265, svtav1, vvenc, aomenc, vpxenc)"
                ))
            })
    }
}

/// ffmpeg arguments that decode `source` to 10-bit 4:2:0 y4m on stdout.
#[must_use]
pub fn ffmpeg_pipe_args(source: &Path) -> Vec<String> {
    let src = source.display().to_string();
    let mut v = args(&["ffmpeg", "-hide_banner", "-y", "-loglevel", "error", "-i"]);
    v.push(src);
    v.extend(args(&["-pix_fmt", "yuv420p10le", "-strict", "-2", "-f", "yuv4mpegpipe", "-"]));
    v
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_svtav1_command() {
        let out = Encoder::SvtAv1.output_file_name(Path::new("/clips/park_joy.y4m"), 35);
        assert_eq!(out, PathBuf::from("./park_joy_svtav1_q35.ivf"));

        let cmd = Encoder::SvtAv1.command_args(
            "-",
            &out,
            35,
            &["--preset".to_string(), "4".to_string(), String::new()],
        );
        assert_eq!(
            cmd,
            vec![
                "SvtAv1EncApp", "-i", "-", "-b", "./park_joy_svtav1_q35.ivf", "--crf", "35",
                "--preset", "4",
            ]
        );
    }

    #[test]
    fn test_every_encoder_gets_quality_and_output() {
        let out = Path::new("out.ivf");
        for encoder in Encoder::ALL {
            let cmd = encoder.command_args("-", out, 27, &[]);
            assert_eq!(cmd[0], encoder.program());
            assert!(cmd.iter().any(|a| a == "out.ivf"), "{encoder}: {cmd:?}");
            assert!(cmd.iter().any(|a| a.ends_with("27")), "{encoder}: {cmd:?}");
            assert!(cmd.iter().any(|a| a == "-"), "{encoder}: {cmd:?}");
        }
    }

    #[test]
    fn test_parse_encoder() {
        assert_eq!("x265".parse::<Encoder>().unwrap(), Encoder::X265);
        assert_eq!("SvtAv1EncApp".parse::<Encoder>().unwrap(), Encoder::SvtAv1);
        assert_eq!(" AOMENC ".parse::<Encoder>().unwrap(), Encoder::AomEnc);
        assert!("rav1e".parse::<Encoder>().is_err());
    }

    #[test]
    fn test_ffmpeg_pipe() {
        let v = ffmpeg_pipe_args(Path::new("in.mkv"));
        assert_eq!(v[0], "ffmpeg");
        assert!(v.windows(2).any(|w| w[0] == "-i" && w[1] == "in.mkv"));
        assert!(v.windows(2).any(|w| w[0] == "-pix_fmt" && w[1] == "yuv420p10le"));
        assert_eq!(v.last().map(String::as_str), Some("-"));
    }
}
