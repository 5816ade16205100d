//! Indicator engine.
//!
//! Indicators are pure functions: candle history in, numeric series out.
//! Every output has the same length as the input; positions without enough
//! history hold `f64::NAN`, which callers must read as "cannot classify".

pub mod ichimoku;
pub mod midpoint;
pub mod rolling;

pub use ichimoku::{IchimokuLine, IchimokuParams, IndicatorFrame, Line, ParamsError};
pub use midpoint::rolling_midpoint;
pub use rolling::{rolling_max, rolling_min, shift_backward, shift_forward};

use crate::domain::Candle;

/// Trait for single-series indicators.
///
/// The first `lookback()` values of `compute` are `f64::NAN` (warmup).
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "tenkan", "senkou_b").
    fn name(&self) -> &str;

    /// Number of leading bars that cannot carry a value.
    fn lookback(&self) -> usize;

    /// Compute the indicator over the entire candle slice.
    fn compute(&self, candles: &[Candle]) -> Vec<f64>;
}

/// Create synthetic candles from close prices for testing.
///
/// open = prev_close (or close for the first candle),
/// high = max(open, close) + 1.0, low = min(open, close) - 1.0, hourly spacing.
#[cfg(test)]
pub fn make_candles(closes: &[f64]) -> Vec<Candle> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            make_candle(i, open, open.max(close) + 1.0, open.min(close) - 1.0, close)
        })
        .collect()
}

/// Create candles from explicit (high, low, close) triples; open = close.
#[cfg(test)]
pub fn make_hlc_candles(data: &[(f64, f64, f64)]) -> Vec<Candle> {
    data.iter()
        .enumerate()
        .map(|(i, &(high, low, close))| make_candle(i, close, high, low, close))
        .collect()
}

#[cfg(test)]
fn make_candle(i: usize, open: f64, high: f64, low: f64, close: f64) -> Candle {
    use chrono::{TimeZone, Utc};
    let base = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    Candle {
        time: base + chrono::Duration::hours(i as i64),
        open,
        high,
        low,
        close,
        complete: true,
    }
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
