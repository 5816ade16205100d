//! Candle provider trait and structured error types.
//!
//! The CandleProvider trait abstracts over candle sources (vendor API client,
//! CSV export, synthetic generator) so the engine never knows where a series
//! came from. Retries and rate limiting belong to implementations, not here.

use std::collections::HashMap;
use thiserror::Error;

use crate::domain::{Granularity, Series, SeriesError};

/// Structured error types for candle retrieval.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("no candles for {instrument} {granularity}")]
    NotFound {
        instrument: String,
        granularity: Granularity,
    },

    #[error("empty series for {instrument} {granularity}")]
    Empty {
        instrument: String,
        granularity: Granularity,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid series: {0}")]
    InvalidSeries(#[from] SeriesError),
}

/// Trait for candle sources.
pub trait CandleProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch up to `count` of the most recent candles.
    fn fetch_candles(
        &self,
        instrument: &str,
        granularity: Granularity,
        count: usize,
    ) -> Result<Series, FetchError>;
}

/// In-memory provider keyed by (instrument, granularity).
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    series: HashMap<(String, Granularity), Series>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, series: Series) {
        self.series.insert(
            (series.instrument().to_string(), series.granularity()),
            series,
        );
    }

    pub fn with(mut self, series: Series) -> Self {
        self.insert(series);
        self
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

impl CandleProvider for MemoryProvider {
    fn name(&self) -> &str {
        "memory"
    }

    fn fetch_candles(
        &self,
        instrument: &str,
        granularity: Granularity,
        count: usize,
    ) -> Result<Series, FetchError> {
        self.series
            .get(&(instrument.to_string(), granularity))
            .map(|s| s.tail(count))
            .ok_or_else(|| FetchError::NotFound {
                instrument: instrument.to_string(),
                granularity,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Candle;
    use chrono::{TimeZone, Utc};

    fn series(instrument: &str, granularity: Granularity, n: usize) -> Series {
        let base = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let candles = (0..n)
            .map(|i| Candle {
                time: base + granularity.duration() * i as i32,
                open: 1.0,
                high: 1.1,
                low: 0.9,
                close: 1.0,
                complete: true,
            })
            .collect();
        Series::new(instrument, granularity, candles).unwrap()
    }

    #[test]
    fn memory_provider_returns_tail() {
        let provider = MemoryProvider::new().with(series("EUR_USD", Granularity::H1, 50));
        let s = provider
            .fetch_candles("EUR_USD", Granularity::H1, 20)
            .unwrap();
        assert_eq!(s.len(), 20);
        assert_eq!(provider.name(), "memory");
    }

    #[test]
    fn memory_provider_misses_other_granularity() {
        let provider = MemoryProvider::new().with(series("EUR_USD", Granularity::H1, 50));
        let err = provider
            .fetch_candles("EUR_USD", Granularity::D, 20)
            .unwrap_err();
        assert!(matches!(err, FetchError::NotFound { .. }));
        assert_eq!(err.to_string(), "no candles for EUR_USD D");
    }
}
