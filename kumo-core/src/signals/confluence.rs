//! Confluence scoring: four directional checks folded into one verdict.
//!
//! The evaluated candle is the most recent *complete* candle in the frame:
//! the last row when forming candles were trimmed upstream, the
//! second-to-last when the frame still ends in a forming candle.
//!
//! Sub-scores, each in {-1, 0, +1}:
//! 1. price vs kumo: close above / below both cloud spans
//! 2. tenkan vs kijun
//! 3. future cloud: senkou A vs senkou B, read from the displaced spans at
//!    the evaluated index. That is the cloud projected 26 bars ago, the same
//!    cloud check 1 compares price against, not the unshifted spans being
//!    projected forward from this candle.
//! 4. chikou freedom: close vs the candle exactly `displacement` bars
//!    earlier (its high/low, and optionally its cloud)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::sign;
use crate::error::AnalysisError;
use crate::indicators::{IndicatorFrame, Line};

/// How strict the Strong Buy / Strong Sell threshold is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrongMode {
    /// All four sub-scores must agree (score = ±4).
    #[default]
    Strict,
    /// Also accept ±3 when chikou is the only sub-score not agreeing.
    Relaxed,
}

/// What the chikou check compares the evaluated close against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChikouRule {
    /// Reference candle's high (bullish) or low (bearish).
    #[default]
    Price,
    /// Reference candle's high/low and both cloud spans at the reference bar.
    PriceAndCloud,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorerConfig {
    pub strong_mode: StrongMode,
    pub chikou_rule: ChikouRule,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubScores {
    pub price_vs_kumo: i8,
    pub tenkan_vs_kijun: i8,
    pub future_cloud: i8,
    pub chikou: i8,
}

impl SubScores {
    pub fn total(&self) -> i8 {
        self.price_vs_kumo + self.tenkan_vs_kijun + self.future_cloud + self.chikou
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    StrongBuy,
    Bullish,
    Neutral,
    Bearish,
    StrongSell,
}

impl Verdict {
    /// Map sub-scores to a verdict under `mode`.
    pub fn classify(sub: &SubScores, mode: StrongMode) -> Verdict {
        let total = sub.total();
        let relaxed_strong = mode == StrongMode::Relaxed && sub.chikou == 0;
        match total {
            4 => Verdict::StrongBuy,
            -4 => Verdict::StrongSell,
            3 if relaxed_strong => Verdict::StrongBuy,
            -3 if relaxed_strong => Verdict::StrongSell,
            1..=3 => Verdict::Bullish,
            -3..=-1 => Verdict::Bearish,
            _ => Verdict::Neutral,
        }
    }

    pub fn is_strong(&self) -> bool {
        matches!(self, Verdict::StrongBuy | Verdict::StrongSell)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Verdict::StrongBuy => "Strong Buy",
            Verdict::Bullish => "Bullish",
            Verdict::Neutral => "Neutral",
            Verdict::Bearish => "Bearish",
            Verdict::StrongSell => "Strong Sell",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of scoring one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfluenceResult {
    /// Index of the evaluated candle.
    pub index: usize,
    pub time: DateTime<Utc>,
    pub close: f64,
    pub sub_scores: SubScores,
    /// Sum of the sub-scores, in -4..=4.
    pub score: i8,
    pub verdict: Verdict,
}

/// Score the most recent complete candle of `frame`.
pub fn score(frame: &IndicatorFrame, config: &ScorerConfig) -> Result<ConfluenceResult, AnalysisError> {
    let params = frame.params();
    let required = params.min_scoring_candles();
    if frame.len() < required {
        return Err(AnalysisError::InsufficientData {
            required,
            available: frame.len(),
        });
    }

    let index = frame
        .series()
        .last_closed_index()
        .ok_or(AnalysisError::InsufficientData {
            required,
            available: 0,
        })?;
    // last_closed_index is always a valid index
    let candle = frame.series().candles()[index];
    let close = candle.close;

    let span_a = require(frame, Line::SenkouA, index)?;
    let span_b = require(frame, Line::SenkouB, index)?;
    let tenkan = require(frame, Line::Tenkan, index)?;
    let kijun = require(frame, Line::Kijun, index)?;

    let reference = index
        .checked_sub(params.displacement)
        .ok_or(AnalysisError::UndefinedValue {
            line: Line::Chikou,
            index,
        })?;
    let lagging = require(frame, Line::Chikou, reference)?;
    let ref_candle = frame.series().candles()[reference];

    let chikou = match config.chikou_rule {
        ChikouRule::Price => above_below(lagging, ref_candle.high, ref_candle.low),
        ChikouRule::PriceAndCloud => {
            let ref_a = require(frame, Line::SenkouA, reference)?;
            let ref_b = require(frame, Line::SenkouB, reference)?;
            above_below(
                lagging,
                ref_candle.high.max(ref_a).max(ref_b),
                ref_candle.low.min(ref_a).min(ref_b),
            )
        }
    };

    let sub_scores = SubScores {
        price_vs_kumo: above_below(close, span_a.max(span_b), span_a.min(span_b)),
        tenkan_vs_kijun: sign(tenkan - kijun),
        future_cloud: sign(span_a - span_b),
        chikou,
    };

    Ok(ConfluenceResult {
        index,
        time: candle.time,
        close,
        sub_scores,
        score: sub_scores.total(),
        verdict: Verdict::classify(&sub_scores, config.strong_mode),
    })
}

fn require(frame: &IndicatorFrame, line: Line, index: usize) -> Result<f64, AnalysisError> {
    frame
        .value(line, index)
        .ok_or(AnalysisError::UndefinedValue { line, index })
}

/// +1 strictly above `upper`, -1 strictly below `lower`, else 0.
fn above_below(value: f64, upper: f64, lower: f64) -> i8 {
    if value > upper {
        1
    } else if value < lower {
        -1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Candle, Granularity, Series};
    use crate::indicators::{make_hlc_candles, IchimokuParams};

    fn frame_of(candles: Vec<Candle>) -> IndicatorFrame {
        let series = Series::new("TEST", Granularity::H1, candles).unwrap();
        IndicatorFrame::compute(series, &IchimokuParams::default())
    }

    fn candles_from_closes(closes: &[f64]) -> Vec<Candle> {
        let data: Vec<_> = closes.iter().map(|&c| (c + 0.5, c - 0.5, c)).collect();
        make_hlc_candles(&data)
    }

    fn v_shape(n: usize, turn: usize) -> Vec<f64> {
        (0..n)
            .map(|i| {
                if i <= turn {
                    200.0 - i as f64
                } else {
                    200.0 - turn as f64 + 2.0 * (i - turn) as f64
                }
            })
            .collect()
    }

    fn all_sub_scores() -> Vec<SubScores> {
        let vals = [-1i8, 0, 1];
        let mut out = Vec::new();
        for &a in &vals {
            for &b in &vals {
                for &c in &vals {
                    for &d in &vals {
                        out.push(SubScores {
                            price_vs_kumo: a,
                            tenkan_vs_kijun: b,
                            future_cloud: c,
                            chikou: d,
                        });
                    }
                }
            }
        }
        out
    }

    #[test]
    fn strict_strong_iff_all_four_agree() {
        for sub in all_sub_scores() {
            let v = Verdict::classify(&sub, StrongMode::Strict);
            assert!((-4..=4).contains(&sub.total()));
            assert_eq!(v == Verdict::StrongBuy, sub.total() == 4, "{sub:?}");
            assert_eq!(v == Verdict::StrongSell, sub.total() == -4, "{sub:?}");
        }
    }

    #[test]
    fn verdict_table() {
        let mk = |a, b, c, d| SubScores {
            price_vs_kumo: a,
            tenkan_vs_kijun: b,
            future_cloud: c,
            chikou: d,
        };
        let strict = StrongMode::Strict;
        assert_eq!(Verdict::classify(&mk(1, 1, 1, 1), strict), Verdict::StrongBuy);
        assert_eq!(Verdict::classify(&mk(1, 1, 1, 0), strict), Verdict::Bullish);
        assert_eq!(Verdict::classify(&mk(1, 0, 0, 0), strict), Verdict::Bullish);
        assert_eq!(Verdict::classify(&mk(1, -1, 0, 0), strict), Verdict::Neutral);
        assert_eq!(Verdict::classify(&mk(-1, 0, 0, 0), strict), Verdict::Bearish);
        assert_eq!(Verdict::classify(&mk(-1, -1, -1, 0), strict), Verdict::Bearish);
        assert_eq!(Verdict::classify(&mk(-1, -1, -1, -1), strict), Verdict::StrongSell);
    }

    #[test]
    fn relaxed_accepts_three_only_when_chikou_is_the_holdout() {
        let relaxed = StrongMode::Relaxed;
        let mk = |a, b, c, d| SubScores {
            price_vs_kumo: a,
            tenkan_vs_kijun: b,
            future_cloud: c,
            chikou: d,
        };
        assert_eq!(Verdict::classify(&mk(1, 1, 1, 0), relaxed), Verdict::StrongBuy);
        assert_eq!(Verdict::classify(&mk(-1, -1, -1, 0), relaxed), Verdict::StrongSell);
        // another sub-score is the holdout
        assert_eq!(Verdict::classify(&mk(1, 1, 0, 1), relaxed), Verdict::Bullish);
        assert_eq!(Verdict::classify(&mk(0, -1, -1, -1), relaxed), Verdict::Bearish);
        assert_eq!(Verdict::classify(&mk(1, 1, 1, 1), relaxed), Verdict::StrongBuy);
    }

    #[test]
    fn v_shape_scores_strong_buy() {
        let frame = frame_of(candles_from_closes(&v_shape(101, 41)));
        let result = score(&frame, &ScorerConfig::default()).unwrap();
        assert_eq!(result.index, 100);
        assert_eq!(result.score, 4);
        assert_eq!(result.verdict, Verdict::StrongBuy);
        assert_eq!(result.close, 277.0);
    }

    #[test]
    fn inverted_v_scores_strong_sell() {
        let closes: Vec<f64> = v_shape(101, 41).iter().map(|c| 400.0 - c).collect();
        let frame = frame_of(candles_from_closes(&closes));
        let result = score(&frame, &ScorerConfig::default()).unwrap();
        assert_eq!(result.score, -4);
        assert_eq!(result.verdict, Verdict::StrongSell);
    }

    #[test]
    fn forming_candle_is_skipped() {
        let mut candles = candles_from_closes(&v_shape(102, 41));
        candles.last_mut().unwrap().complete = false;
        let frame = frame_of(candles);
        let result = score(&frame, &ScorerConfig::default()).unwrap();
        assert_eq!(result.index, 100);
        assert_eq!(result.time, frame.candle(100).unwrap().time);
    }

    #[test]
    fn below_minimum_is_insufficient() {
        let frame = frame_of(candles_from_closes(&v_shape(78, 30)));
        assert_eq!(
            score(&frame, &ScorerConfig::default()),
            Err(AnalysisError::InsufficientData {
                required: 79,
                available: 78
            })
        );
    }

    #[test]
    fn exactly_minimum_with_forming_tail_scores() {
        let mut candles = candles_from_closes(&v_shape(79, 30));
        candles.last_mut().unwrap().complete = false;
        let frame = frame_of(candles);
        let result = score(&frame, &ScorerConfig::default()).unwrap();
        assert_eq!(result.index, 77);
    }

    #[test]
    fn no_complete_candle_is_insufficient() {
        let mut candles = candles_from_closes(&v_shape(90, 30));
        for c in &mut candles {
            c.complete = false;
        }
        let frame = frame_of(candles);
        assert!(matches!(
            score(&frame, &ScorerConfig::default()),
            Err(AnalysisError::InsufficientData { available: 0, .. })
        ));
    }

    #[test]
    fn price_and_cloud_needs_reference_cloud() {
        let frame = frame_of(candles_from_closes(&v_shape(101, 41)));
        let config = ScorerConfig {
            chikou_rule: ChikouRule::PriceAndCloud,
            ..ScorerConfig::default()
        };
        assert_eq!(
            score(&frame, &config),
            Err(AnalysisError::UndefinedValue {
                line: Line::SenkouB,
                index: 74
            })
        );

        let frame = frame_of(candles_from_closes(&v_shape(130, 41)));
        let result = score(&frame, &config).unwrap();
        assert_eq!(result.sub_scores.chikou, 1);
    }

    #[test]
    fn chikou_reference_is_exactly_displacement_back() {
        // close equal to the high 26 bars back scores 0, one tick above scores +1
        let mut closes = vec![100.0; 100];
        closes[73] = 120.0; // reference for evaluated index 99
        let mut candles = candles_from_closes(&closes);
        candles[99].close = 120.5;
        candles[99].high = 121.0;
        let frame = frame_of(candles.clone());
        let result = score(&frame, &ScorerConfig::default()).unwrap();
        assert_eq!(result.sub_scores.chikou, 0);

        candles[99].close = 120.6;
        let frame = frame_of(candles);
        let result = score(&frame, &ScorerConfig::default()).unwrap();
        assert_eq!(result.sub_scores.chikou, 1);
    }

    #[test]
    fn scoring_is_deterministic() {
        let frame = frame_of(candles_from_closes(&v_shape(150, 60)));
        let config = ScorerConfig::default();
        assert_eq!(score(&frame, &config), score(&frame, &config));
    }
}
