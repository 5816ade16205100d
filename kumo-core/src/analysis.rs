//! One-call analysis of a single series.

use serde::{Deserialize, Serialize};

use crate::domain::{Granularity, Series};
use crate::error::AnalysisError;
use crate::indicators::{IchimokuParams, IndicatorFrame};
use crate::signals::{detect_all, score, ConfluenceResult, CrossEvent, ScorerConfig};

/// Crossover and confluence outcome for one instrument at one granularity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub instrument: String,
    pub granularity: Granularity,
    pub candle_count: usize,
    /// Every crossover in the series, oldest first.
    pub crosses: Vec<CrossEvent>,
    pub confluence: Result<ConfluenceResult, AnalysisError>,
}

impl Analysis {
    pub fn last_cross(&self) -> Option<CrossEvent> {
        self.crosses.last().copied()
    }
}

/// Build the frame and run the detector and scorer on it.
///
/// The two components have independent minimums, so a short series can
/// still report a crossover while the scorer reports insufficient data.
pub fn analyze(series: Series, params: &IchimokuParams, scorer: &ScorerConfig) -> Analysis {
    let instrument = series.instrument().to_string();
    let granularity = series.granularity();
    let candle_count = series.len();
    let frame = IndicatorFrame::compute(series, params);
    Analysis {
        instrument,
        granularity,
        candle_count,
        crosses: detect_all(&frame),
        confluence: score(&frame, scorer),
    }
}
