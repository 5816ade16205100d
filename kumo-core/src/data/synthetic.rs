//! Synthetic candle generator for offline runs and demos.
//!
//! Each (seed, instrument, granularity) triple hashes to its own RNG seed, so
//! a series is identical across runs and independent of fetch order. The
//! final candle is marked as still forming.

use chrono::{DateTime, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::provider::{CandleProvider, FetchError};
use crate::domain::{Candle, Granularity, Series};

/// Maximum per-candle return, as a fraction of price.
const VOLATILITY: f64 = 0.004;

#[derive(Debug, Clone)]
pub struct SyntheticProvider {
    seed: u64,
    /// Timestamp of the last (forming) candle.
    anchor: DateTime<Utc>,
}

impl SyntheticProvider {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            anchor: Utc
                .with_ymd_and_hms(2024, 6, 3, 0, 0, 0)
                .single()
                .unwrap_or_default(),
        }
    }

    fn rng_for(&self, instrument: &str, granularity: Granularity) -> StdRng {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.seed.to_le_bytes());
        hasher.update(instrument.as_bytes());
        hasher.update(granularity.code().as_bytes());
        StdRng::from_seed(*hasher.finalize().as_bytes())
    }

    /// Generate `count` candles ending at the anchor.
    pub fn generate(&self, instrument: &str, granularity: Granularity, count: usize) -> Vec<Candle> {
        let mut rng = self.rng_for(instrument, granularity);
        let mut price = if instrument.contains("JPY") {
            rng.gen_range(90.0..180.0)
        } else {
            rng.gen_range(0.5..2.0)
        };
        let step = granularity.duration();
        let first = self.anchor - step * (count.saturating_sub(1) as i32);

        // drift flips regime every few dozen candles so trends and crossovers appear
        let mut drift: f64 = 0.0;
        let mut candles = Vec::with_capacity(count);
        for i in 0..count {
            if i % 40 == 0 {
                drift = rng.gen_range(-0.5..0.5) * VOLATILITY;
            }
            let ret: f64 = drift + rng.gen_range(-1.0..1.0) * VOLATILITY;
            let open = price;
            let close = price * (1.0 + ret);
            let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.5) * VOLATILITY);
            let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.5) * VOLATILITY);
            candles.push(Candle {
                time: first + step * i as i32,
                open,
                high,
                low,
                close,
                complete: i + 1 < count,
            });
            price = close;
        }
        candles
    }
}

impl CandleProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch_candles(
        &self,
        instrument: &str,
        granularity: Granularity,
        count: usize,
    ) -> Result<Series, FetchError> {
        if count == 0 {
            return Err(FetchError::Empty {
                instrument: instrument.to_string(),
                granularity,
            });
        }
        let candles = self.generate(instrument, granularity, count);
        Ok(Series::new(instrument, granularity, candles)?)
    }
}
