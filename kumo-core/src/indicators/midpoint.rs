//! High/low midpoint: the building block of every Ichimoku line.
//!
//! midpoint[t] = (max(high[t-period+1..=t]) + min(low[t-period+1..=t])) / 2
//!
//! The first `period - 1` values are NaN.

use super::rolling::{rolling_max, rolling_min};
use crate::domain::Candle;

/// Average of the rolling highest high and lowest low.
pub fn rolling_midpoint(candles: &[Candle], period: usize) -> Vec<f64> {
    let highs: Vec<f64> = candles.iter().map(|c| c.high).collect();
    let lows: Vec<f64> = candles.iter().map(|c| c.low).collect();
    rolling_max(&highs, period)
        .into_iter()
        .zip(rolling_min(&lows, period))
        .map(|(hi, lo)| (hi + lo) / 2.0)
        .collect()
}
