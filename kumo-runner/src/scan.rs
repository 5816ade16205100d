//! Batch scanner: fetch, analyze, and align every configured instrument.
//!
//! Instruments are independent, so the scan fans out over a rayon pool. One
//! instrument's failure only marks that instrument; the batch always
//! completes. Cancellation is cooperative: the flag is checked before each
//! instrument starts, and instruments never started are listed as skipped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use rayon::prelude::*;
use thiserror::Error;

use kumo_core::analyze;
use kumo_core::data::CandleProvider;
use kumo_core::domain::Granularity;
use kumo_core::error::AnalysisError;
use kumo_core::signals::{align_outcomes, ConfluenceResult};

use crate::config::{ConfigError, ScanConfig};
use crate::report::{InstrumentReport, ScanReport, TimeframeOutcome, TimeframeReport};

#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Run one scan over every instrument and timeframe in `config`.
///
/// The report is sorted by primary-timeframe crossover, most recent first.
pub fn run_scan(
    config: &ScanConfig,
    provider: &dyn CandleProvider,
    cancel: Option<&AtomicBool>,
) -> Result<ScanReport, ScanError> {
    config.validate()?;
    let start = Instant::now();
    let instruments = &config.scan.instruments;

    tracing::info!(
        provider = provider.name(),
        instruments = instruments.len(),
        timeframes = ?config.scan.timeframes,
        candle_count = config.scan.candle_count,
        "starting scan"
    );

    let scan_one = |instrument: &String| -> Option<InstrumentReport> {
        if cancel.is_some_and(|f| f.load(Ordering::Relaxed)) {
            return None;
        }
        Some(scan_instrument(config, provider, instrument))
    };

    let results: Vec<Option<InstrumentReport>> = if config.scan.threads == 1 {
        instruments.iter().map(scan_one).collect()
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.scan.threads)
            .build()?;
        pool.install(|| instruments.par_iter().map(scan_one).collect())
    };

    let mut reports = Vec::with_capacity(results.len());
    let mut skipped = Vec::new();
    for (instrument, result) in instruments.iter().zip(results) {
        match result {
            Some(report) => reports.push(report),
            None => skipped.push(instrument.clone()),
        }
    }

    if !skipped.is_empty() {
        tracing::info!(skipped = skipped.len(), "scan cancelled");
    }

    let mut report = ScanReport {
        generated_at: chrono::Utc::now(),
        provider: provider.name().to_string(),
        timeframes: config.scan.timeframes.clone(),
        instruments: reports,
        skipped,
    };
    report.sort_by_recent_cross();

    tracing::info!(
        scanned = report.instruments.len(),
        aligned = report.aligned_count(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "scan complete"
    );
    Ok(report)
}

/// Analyze one instrument on every configured timeframe and align the results.
pub fn scan_instrument(
    config: &ScanConfig,
    provider: &dyn CandleProvider,
    instrument: &str,
) -> InstrumentReport {
    let timeframes: Vec<TimeframeReport> = config
        .scan
        .timeframes
        .iter()
        .map(|&granularity| scan_timeframe(config, provider, instrument, granularity))
        .collect();

    // fetch failures abstain like any other unscored timeframe
    let required = config.ichimoku.min_scoring_candles();
    let outcomes: Vec<Result<ConfluenceResult, AnalysisError>> = timeframes
        .iter()
        .map(|tf| match &tf.outcome {
            TimeframeOutcome::Scored(result) => Ok(*result),
            TimeframeOutcome::Indeterminate { reason } => Err(reason.clone()),
            TimeframeOutcome::FetchFailed { .. } => Err(AnalysisError::InsufficientData {
                required,
                available: 0,
            }),
        })
        .collect();
    let votes = align_outcomes(&outcomes, &config.alignment);

    tracing::debug!(
        instrument,
        buy_votes = votes.buy_votes,
        sell_votes = votes.sell_votes,
        abstained = votes.abstained,
        aligned = ?votes.signal,
        "instrument scanned"
    );

    InstrumentReport {
        instrument: instrument.to_string(),
        timeframes,
        votes,
    }
}

fn scan_timeframe(
    config: &ScanConfig,
    provider: &dyn CandleProvider,
    instrument: &str,
    granularity: Granularity,
) -> TimeframeReport {
    let series = match provider.fetch_candles(instrument, granularity, config.scan.candle_count) {
        Ok(series) => series,
        Err(e) => {
            tracing::warn!(instrument, %granularity, error = %e, "fetch failed");
            return TimeframeReport {
                granularity,
                candles: 0,
                outcome: TimeframeOutcome::FetchFailed {
                    error: e.to_string(),
                },
                last_cross: None,
                history: Vec::new(),
            };
        }
    };
    let series = if config.scan.drop_incomplete {
        series.closed()
    } else {
        series
    };

    let analysis = analyze(series, &config.ichimoku, &config.scoring);
    let last_cross = analysis.last_cross();
    let outcome = match analysis.confluence {
        Ok(result) => TimeframeOutcome::Scored(result),
        Err(reason) => TimeframeOutcome::Indeterminate { reason },
    };

    TimeframeReport {
        granularity,
        candles: analysis.candle_count,
        outcome,
        last_cross,
        history: if config.scan.history {
            analysis.crosses
        } else {
            Vec::new()
        },
    }
}
