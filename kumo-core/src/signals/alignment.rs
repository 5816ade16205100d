//! Multi-timeframe alignment.
//!
//! Each timeframe is scored on its own frame; a strong verdict is one vote.
//! The aligned signal needs `min(min_agreeing, supplied)` votes on one side
//! and fewer on the other. A timeframe that could not be scored abstains but
//! still counts as supplied.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::confluence::{score, ConfluenceResult, ScorerConfig, Verdict};
use crate::error::AnalysisError;
use crate::indicators::IndicatorFrame;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignmentConfig {
    /// Strong votes needed on one side (capped at the number of timeframes).
    pub min_agreeing: usize,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self { min_agreeing: 2 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlignedSignal {
    StrongBuy,
    StrongSell,
}

impl fmt::Display for AlignedSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlignedSignal::StrongBuy => f.write_str("Strong Buy"),
            AlignedSignal::StrongSell => f.write_str("Strong Sell"),
        }
    }
}

/// Vote tally across the supplied timeframes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentVotes {
    pub supplied: usize,
    pub required: usize,
    pub buy_votes: usize,
    pub sell_votes: usize,
    /// Timeframes without a verdict (insufficient or undefined data).
    pub abstained: usize,
    pub signal: Option<AlignedSignal>,
}

/// Tally already-scored timeframe outcomes.
pub fn align_outcomes<'a, I>(outcomes: I, config: &AlignmentConfig) -> AlignmentVotes
where
    I: IntoIterator<Item = &'a Result<ConfluenceResult, AnalysisError>>,
{
    let mut supplied = 0;
    let mut buy_votes = 0;
    let mut sell_votes = 0;
    let mut abstained = 0;

    for outcome in outcomes {
        supplied += 1;
        match outcome {
            Ok(result) => match result.verdict {
                Verdict::StrongBuy => buy_votes += 1,
                Verdict::StrongSell => sell_votes += 1,
                _ => {}
            },
            Err(_) => abstained += 1,
        }
    }

    let required = config.min_agreeing.max(1).min(supplied);
    let signal = if supplied == 0 {
        None
    } else if buy_votes >= required && sell_votes < required {
        Some(AlignedSignal::StrongBuy)
    } else if sell_votes >= required && buy_votes < required {
        Some(AlignedSignal::StrongSell)
    } else {
        None
    };

    AlignmentVotes {
        supplied,
        required,
        buy_votes,
        sell_votes,
        abstained,
        signal,
    }
}

/// Score every frame independently, then tally.
pub fn align_frames(
    frames: &[IndicatorFrame],
    scorer: &ScorerConfig,
    config: &AlignmentConfig,
) -> (Vec<Result<ConfluenceResult, AnalysisError>>, AlignmentVotes) {
    let outcomes: Vec<_> = frames.iter().map(|f| score(f, scorer)).collect();
    let votes = align_outcomes(&outcomes, config);
    (outcomes, votes)
}
