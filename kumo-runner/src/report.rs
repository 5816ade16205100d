//! Scan result set: one report per instrument, one row per timeframe.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use kumo_core::domain::Granularity;
use kumo_core::error::AnalysisError;
use kumo_core::signals::{AlignedSignal, AlignmentVotes, ConfluenceResult, CrossEvent, Verdict};

/// What happened when one timeframe of one instrument was analyzed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TimeframeOutcome {
    Scored(ConfluenceResult),
    /// The scorer could not classify the series (too short or undefined lines).
    Indeterminate { reason: AnalysisError },
    /// The provider returned no usable series.
    FetchFailed { error: String },
}

impl TimeframeOutcome {
    pub fn status(&self) -> &'static str {
        match self {
            TimeframeOutcome::Scored(_) => "scored",
            TimeframeOutcome::Indeterminate { .. } => "indeterminate",
            TimeframeOutcome::FetchFailed { .. } => "fetch_failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeframeReport {
    pub granularity: Granularity,
    /// Candles the indicators were computed on (after trimming).
    pub candles: usize,
    pub outcome: TimeframeOutcome,
    pub last_cross: Option<CrossEvent>,
    /// Every crossover in the window, oldest first; empty unless history was requested.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<CrossEvent>,
}

impl TimeframeReport {
    pub fn result(&self) -> Option<&ConfluenceResult> {
        match &self.outcome {
            TimeframeOutcome::Scored(result) => Some(result),
            _ => None,
        }
    }

    pub fn score(&self) -> Option<i8> {
        self.result().map(|r| r.score)
    }

    pub fn verdict(&self) -> Option<Verdict> {
        self.result().map(|r| r.verdict)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentReport {
    pub instrument: String,
    /// In configured order; the first is the primary timeframe.
    pub timeframes: Vec<TimeframeReport>,
    pub votes: AlignmentVotes,
}

impl InstrumentReport {
    pub fn primary(&self) -> Option<&TimeframeReport> {
        self.timeframes.first()
    }

    /// Most recent crossover on the primary timeframe.
    pub fn last_cross(&self) -> Option<&CrossEvent> {
        self.primary().and_then(|tf| tf.last_cross.as_ref())
    }

    pub fn aligned(&self) -> Option<AlignedSignal> {
        self.votes.signal
    }

    /// True when no timeframe produced a series.
    pub fn all_failed(&self) -> bool {
        self.timeframes
            .iter()
            .all(|tf| matches!(tf.outcome, TimeframeOutcome::FetchFailed { .. }))
    }
}

/// Everything one scan produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    pub generated_at: DateTime<Utc>,
    pub provider: String,
    pub timeframes: Vec<Granularity>,
    pub instruments: Vec<InstrumentReport>,
    /// Instruments never started because the scan was cancelled.
    pub skipped: Vec<String>,
}

impl ScanReport {
    /// Order by primary-timeframe crossover time, most recent first;
    /// instruments without a crossover go last, then by name.
    pub fn sort_by_recent_cross(&mut self) {
        self.instruments.sort_by(compare_recent_cross);
    }

    pub fn aligned_count(&self) -> usize {
        self.instruments
            .iter()
            .filter(|r| r.aligned().is_some())
            .count()
    }

    pub fn was_cancelled(&self) -> bool {
        !self.skipped.is_empty()
    }

    pub fn get(&self, instrument: &str) -> Option<&InstrumentReport> {
        self.instruments.iter().find(|r| r.instrument == instrument)
    }
}

fn compare_recent_cross(a: &InstrumentReport, b: &InstrumentReport) -> Ordering {
    match (a.last_cross(), b.last_cross()) {
        (Some(x), Some(y)) => y.time.cmp(&x.time),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.instrument.cmp(&b.instrument))
}
