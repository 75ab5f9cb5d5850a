//! Weighted XPSNR command.

use anyhow::{Result, bail};
use video_eval::EngineConfig;
use video_eval::metrics::{XpsnrPlanes, psnr_to_mse};

pub fn run(y: f64, u: f64, v: f64, peak: Option<u32>, config: &EngineConfig) -> Result<()> {
    let peak = peak.unwrap_or(config.xpsnr_peak);
    if peak == 0 {
        bail!("peak must be positive");
    }

    let planes = XpsnrPlanes::new(y, u, v);
    if planes.is_missing() {
        tracing::warn!("all planes are zero; the XPSNR report was probably not parsed");
    }

    println!("{:<10} {:>12} {:>14}", "Plane", "XPSNR (dB)", "MSE");
    println!("{:-<40}", "");
    for (name, value) in [("Y", y), ("U", u), ("V", v)] {
        println!("{:<10} {:>12.5} {:>14.5}", name, value, psnr_to_mse(value, peak));
    }
    println!("{:-<40}", "");
    println!("{:<10} {:>12.5}", "W-XPSNR", planes.weighted(peak));

    Ok(())
}
