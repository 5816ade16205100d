//! Series: ordered candles for one instrument at one granularity.
//!
//! A Series is validated once at construction and never mutated afterwards.
//! Derived views (`closed`, `tail`) build new values.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Candle, Granularity};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SeriesError {
    #[error("timestamps not strictly increasing at index {index}")]
    NonMonotonic { index: usize },

    #[error("invalid OHLC values at index {index}")]
    InvalidCandle { index: usize },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Series {
    instrument: String,
    granularity: Granularity,
    candles: Vec<Candle>,
}

impl Series {
    /// Build a validated series.
    ///
    /// Timestamps must be strictly increasing and every candle must pass
    /// [`Candle::is_sane`]. Spacing is not checked: market closures leave
    /// gaps, and indicator windows count bars rather than wall time.
    pub fn new(
        instrument: impl Into<String>,
        granularity: Granularity,
        candles: Vec<Candle>,
    ) -> Result<Self, SeriesError> {
        for (index, candle) in candles.iter().enumerate() {
            if !candle.is_sane() {
                return Err(SeriesError::InvalidCandle { index });
            }
            if index > 0 && candle.time <= candles[index - 1].time {
                return Err(SeriesError::NonMonotonic { index });
            }
        }
        Ok(Self {
            instrument: instrument.into(),
            granularity,
            candles,
        })
    }

    pub fn instrument(&self) -> &str {
        &self.instrument
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// A copy holding only complete candles.
    pub fn closed(&self) -> Series {
        Series {
            instrument: self.instrument.clone(),
            granularity: self.granularity,
            candles: self.candles.iter().copied().filter(|c| c.complete).collect(),
        }
    }

    /// A copy holding the last `count` candles.
    pub fn tail(&self, count: usize) -> Series {
        let start = self.candles.len().saturating_sub(count);
        Series {
            instrument: self.instrument.clone(),
            granularity: self.granularity,
            candles: self.candles[start..].to_vec(),
        }
    }

    /// Index of the most recent complete candle.
    pub fn last_closed_index(&self) -> Option<usize> {
        self.candles.iter().rposition(|c| c.complete)
    }
}
