//! Configuration loading and management.

use std::path::{Path, PathBuf};

use eoos_core::{DEFAULT_DERIVATIVE_PERIODS, DetectionConfig, OutlierFilter, PeakConfig};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Engine thresholds.
    pub detection: DetectionConfig,

    /// Lag, in ticks, of both derivative orders. Default: 5.
    pub derivative_periods: usize,

    /// Bounds for events hidden from reports.
    pub outliers: OutlierFilter,

    /// Derivative peak search.
    pub peaks: PeakConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            detection: DetectionConfig::default(),
            derivative_periods: DEFAULT_DERIVATIVE_PERIODS,
            outliers: OutlierFilter::default(),
            peaks: PeakConfig::default(),
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (EOOS_*, nested keys split on "__")
        figment = figment.merge(Env::prefixed("EOOS_").split("__"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for eoos.
///
/// On Linux: `~/.config/eoos`
pub fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("eoos"))
}
