//! Candle: one bar of price history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OHLC bar for one instrument at one granularity.
///
/// `complete` is false for the bar that is still forming at fetch time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub complete: bool,
}

impl Candle {
    /// Returns true if any OHLC field is NaN.
    pub fn is_void(&self) -> bool {
        self.open.is_nan() || self.high.is_nan() || self.low.is_nan() || self.close.is_nan()
    }

    /// OHLC sanity: positive finite prices, high/low bound open and close.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        let finite = [self.open, self.high, self.low, self.close]
            .iter()
            .all(|v| v.is_finite() && *v > 0.0);
        finite
            && self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
    }
}
