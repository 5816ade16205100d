//! Serializable scan configuration.
//!
//! Every section is optional; a missing section or key takes its default.
//!
//! ```toml
//! [scan]
//! instruments = ["EUR_USD", "USD_JPY"]
//! timeframes = ["H1", "H4", "D"]
//! candle_count = 200
//!
//! [scoring]
//! strong_mode = "relaxed"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

use kumo_core::domain::Granularity;
use kumo_core::indicators::{IchimokuParams, ParamsError};
use kumo_core::signals::{AlignmentConfig, ScorerConfig};

/// Most timeframes a single scan may align.
pub const MAX_TIMEFRAMES: usize = 3;

/// The 28 majors and crosses of the eight major currencies.
pub const DEFAULT_INSTRUMENTS: [&str; 28] = [
    "AUD_CAD", "AUD_CHF", "AUD_JPY", "AUD_NZD", "AUD_USD", "CAD_CHF", "CAD_JPY", "CHF_JPY",
    "EUR_AUD", "EUR_CAD", "EUR_CHF", "EUR_GBP", "EUR_JPY", "EUR_NZD", "EUR_USD", "GBP_AUD",
    "GBP_CAD", "GBP_CHF", "GBP_JPY", "GBP_NZD", "GBP_USD", "NZD_CAD", "NZD_CHF", "NZD_JPY",
    "NZD_USD", "USD_CAD", "USD_CHF", "USD_JPY",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("invalid ichimoku section: {0}")]
    Params(#[from] ParamsError),
}

/// Which instruments and timeframes to scan, and how much history to fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSection {
    pub instruments: Vec<String>,
    /// The first entry is the primary timeframe (its crossover sorts the report).
    pub timeframes: Vec<Granularity>,
    pub candle_count: usize,
    /// Worker threads; 0 = rayon default, 1 = sequential.
    pub threads: usize,
    /// Trim forming candles before computing indicators.
    pub drop_incomplete: bool,
    /// Keep every crossover in the report, not just the latest.
    pub history: bool,
}

impl Default for ScanSection {
    fn default() -> Self {
        Self {
            instruments: DEFAULT_INSTRUMENTS.iter().map(|s| s.to_string()).collect(),
            timeframes: vec![Granularity::H1],
            candle_count: 200,
            threads: 0,
            drop_incomplete: true,
            history: false,
        }
    }
}

/// Full scan configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub scan: ScanSection,
    pub ichimoku: IchimokuParams,
    pub scoring: ScorerConfig,
    pub alignment: AlignmentConfig,
}

impl ScanConfig {
    /// Load and validate a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse, normalize, and validate a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let mut config: ScanConfig = toml::from_str(content)?;
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Trim and uppercase instrument names (`eur_usd` becomes `EUR_USD`).
    pub fn normalize(&mut self) {
        for instrument in &mut self.scan.instruments {
            *instrument = instrument.trim().to_uppercase();
        }
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let scan = &self.scan;
        if scan.instruments.is_empty() {
            return Err(ConfigError::Invalid("at least one instrument is required".into()));
        }
        if let Some(blank) = scan.instruments.iter().position(|i| i.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "instrument at position {blank} is blank"
            )));
        }
        if scan.timeframes.is_empty() || scan.timeframes.len() > MAX_TIMEFRAMES {
            return Err(ConfigError::Invalid(format!(
                "between 1 and {MAX_TIMEFRAMES} timeframes are required, got {}",
                scan.timeframes.len()
            )));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = scan.timeframes.iter().find(|g| !seen.insert(**g)) {
            return Err(ConfigError::Invalid(format!("duplicate timeframe {dup}")));
        }
        if scan.candle_count == 0 {
            return Err(ConfigError::Invalid("candle_count must be >= 1".into()));
        }
        if self.alignment.min_agreeing == 0 {
            return Err(ConfigError::Invalid("min_agreeing must be >= 1".into()));
        }
        self.ichimoku.validate()?;

        let required = self.ichimoku.min_scoring_candles();
        if scan.candle_count < required {
            tracing::warn!(
                candle_count = scan.candle_count,
                required,
                "candle_count is below the scoring minimum; every verdict will be insufficient"
            );
        }
        Ok(())
    }

    /// Primary timeframe (the first configured one).
    pub fn primary_timeframe(&self) -> Option<Granularity> {
        self.scan.timeframes.first().copied()
    }
}
