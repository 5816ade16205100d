//! Kumo Core: candle domain types, Ichimoku indicators, signal detection.
//!
//! This crate contains the analysis heart of the scanner:
//! - Domain types (candles, granularities, validated series)
//! - Rolling-window primitives and the five Ichimoku lines
//! - Tenkan/Kijun crossover detection
//! - Four-part confluence scoring and verdicts
//! - Multi-timeframe alignment
//! - Candle providers (CSV files, synthetic generator, in-memory)
//!
//! Everything past the provider boundary is pure: the same series always
//! yields the same lines, events, and scores.

pub mod analysis;
pub mod data;
pub mod domain;
pub mod error;
pub mod indicators;
pub mod signals;

pub use analysis::{analyze, Analysis};
pub use error::AnalysisError;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: everything the runner moves across rayon workers
    /// is Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        // Domain types
        require_send::<domain::Candle>();
        require_sync::<domain::Candle>();
        require_send::<domain::Series>();
        require_sync::<domain::Series>();
        require_send::<domain::Granularity>();
        require_sync::<domain::Granularity>();

        // Indicator types
        require_send::<indicators::IndicatorFrame>();
        require_sync::<indicators::IndicatorFrame>();
        require_send::<indicators::IchimokuParams>();
        require_sync::<indicators::IchimokuParams>();

        // Signal types
        require_send::<signals::CrossEvent>();
        require_sync::<signals::CrossEvent>();
        require_send::<signals::ConfluenceResult>();
        require_sync::<signals::ConfluenceResult>();
        require_send::<signals::AlignmentVotes>();
        require_sync::<signals::AlignmentVotes>();
        require_send::<Analysis>();
        require_sync::<Analysis>();

        // Providers
        require_send::<data::CsvProvider>();
        require_sync::<data::CsvProvider>();
        require_send::<data::SyntheticProvider>();
        require_sync::<data::SyntheticProvider>();
        require_send::<data::MemoryProvider>();
        require_sync::<data::MemoryProvider>();
    }

    /// Architecture contract: the scorer sees only a frame, never a provider.
    #[test]
    fn scorer_takes_only_a_frame() {
        fn _check(
            frame: &indicators::IndicatorFrame,
            config: &signals::ScorerConfig,
        ) -> Result<signals::ConfluenceResult, AnalysisError> {
            signals::score(frame, config)
        }
    }

    #[test]
    fn analyze_reports_cross_even_when_scoring_is_short() {
        let mut closes: Vec<f64> = (0..=20).map(|i| 200.0 - i as f64).collect();
        closes.extend((1..20).map(|i| 180.0 + 2.0 * i as f64));
        let data: Vec<_> = closes.iter().map(|&c| (c + 0.5, c - 0.5, c)).collect();
        let candles = indicators::make_hlc_candles(&data);
        let series = domain::Series::new("EUR_USD", domain::Granularity::H1, candles).unwrap();

        let analysis = analyze(
            series,
            &indicators::IchimokuParams::default(),
            &signals::ScorerConfig::default(),
        );
        assert_eq!(analysis.candle_count, 40);
        let cross = analysis.last_cross().expect("cross");
        assert_eq!(cross.index, 29);
        assert_eq!(cross.direction, signals::Direction::Bullish);
        assert_eq!(
            analysis.confluence,
            Err(AnalysisError::InsufficientData {
                required: 79,
                available: 40
            })
        );
    }
}
