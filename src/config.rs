//! Engine configuration.
//!
//! Everything that changes numeric results lives here so it can be recorded
//! next to persisted output and reloaded for later runs.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::metrics::Metric;
use crate::metrics::xpsnr::DEFAULT_PEAK;
use crate::stats::{BdRateConfig, PercentileMethod};

/// Configuration for aggregation and comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Percentile convention for `p10`.
    pub percentile_method: PercentileMethod,

    /// BD-Rate grid and clamping.
    pub bd_rate: BdRateConfig,

    /// Metrics compared by BD-Rate, in report order.
    pub metrics: Vec<Metric>,

    /// Peak sample value for PSNR/MSE conversion.
    pub xpsnr_peak: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            percentile_method: PercentileMethod::default(),
            bd_rate: BdRateConfig::default(),
            metrics: Metric::ALL.to_vec(),
            xpsnr_peak: DEFAULT_PEAK,
        }
    }
}

impl EngineConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    /// Load a JSON config file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.bd_rate.samples < 3 {
            return Err(Error::InvalidConfig(format!(
                "bd_rate.samples must be at least 3, got {}",
                self.bd_rate.samples
            )));
        }
        if !self.bd_rate.inf_clamp.is_finite() {
            return Err(Error::InvalidConfig("bd_rate.inf_clamp must be finite".to_string()));
        }
        if self.metrics.is_empty() {
            return Err(Error::InvalidConfig("at least one metric is required".to_string()));
        }
        if self.xpsnr_peak == 0 {
            return Err(Error::InvalidConfig("xpsnr_peak must be positive".to_string()));
        }
        Ok(())
    }
}

/// Builder for [`EngineConfig`].
#[derive(Debug, Default)]
pub struct EngineConfigBuilder {
    percentile_method: Option<PercentileMethod>,
    bd_samples: Option<usize>,
    inf_clamp: Option<f64>,
    metrics: Option<Vec<Metric>>,
    xpsnr_peak: Option<u32>,
}

impl EngineConfigBuilder {
    /// Set the percentile convention.
    #[must_use]
    pub fn percentile_method(mut self, method: PercentileMethod) -> Self {
        self.percentile_method = Some(method);
        self
    }

    /// Set the BD-Rate grid size.
    #[must_use]
    pub fn bd_samples(mut self, samples: usize) -> Self {
        self.bd_samples = Some(samples);
        self
    }

    /// Set the value substituted for infinite distortion.
    #[must_use]
    pub fn inf_clamp(mut self, value: f64) -> Self {
        self.inf_clamp = Some(value);
        self
    }

    /// Restrict the compared metrics.
    #[must_use]
    pub fn metrics(mut self, metrics: Vec<Metric>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Set the PSNR peak value (255 for 8-bit, 1023 for 10-bit).
    #[must_use]
    pub fn xpsnr_peak(mut self, peak: u32) -> Self {
        self.xpsnr_peak = Some(peak);
        self
    }

    /// Build and validate the configuration.
    pub fn build(self) -> Result<EngineConfig> {
        let defaults = EngineConfig::default();
        let config = EngineConfig {
            percentile_method: self.percentile_method.unwrap_or(defaults.percentile_method),
            bd_rate: BdRateConfig {
                samples: self.bd_samples.unwrap_or(defaults.bd_rate.samples),
                inf_clamp: self.inf_clamp.unwrap_or(defaults.bd_rate.inf_clamp),
            },
            metrics: self.metrics.unwrap_or(defaults.metrics),
            xpsnr_peak: self.xpsnr_peak.unwrap_or(defaults.xpsnr_peak),
        };
        config.validate()?;
        Ok(config)
    }
}
