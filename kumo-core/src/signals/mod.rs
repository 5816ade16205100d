//! Signal detection: crossovers, confluence scoring, timeframe alignment.
//!
//! Every function here is a pure read of an [`IndicatorFrame`]: no I/O, no
//! shared state, identical output for identical input.
//!
//! [`IndicatorFrame`]: crate::indicators::IndicatorFrame

pub mod alignment;
pub mod confluence;
pub mod crossover;

pub use alignment::{align_frames, align_outcomes, AlignedSignal, AlignmentConfig, AlignmentVotes};
pub use confluence::{
    score, ChikouRule, ConfluenceResult, ScorerConfig, StrongMode, SubScores, Verdict,
};
pub use crossover::{detect_all, detect_latest, CrossEvent};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a crossover event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Bullish,
    Bearish,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Bullish => f.write_str("bullish"),
            Direction::Bearish => f.write_str("bearish"),
        }
    }
}

/// Three-way sign with `sign(0) = 0`.
pub(crate) fn sign(value: f64) -> i8 {
    if value > 0.0 {
        1
    } else if value < 0.0 {
        -1
    } else {
        0
    }
}
