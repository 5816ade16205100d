//! Tenkan/Kijun crossover detection.
//!
//! diff[i] = sign(tenkan[i] - kijun[i]) wherever both lines are defined.
//! A transition at `i` needs diff[i - 1] defined as well:
//! - bullish when diff[i] > 0 and diff[i - 1] <= 0
//! - bearish when diff[i] < 0 and diff[i - 1] >= 0
//!
//! A bar with diff = 0 never carries an event itself. Leaving zero toward
//! the sign the lines had before the touch still counts (`+, 0, +` yields a
//! bullish event on the third bar).
//!
//! Only closed candles are scanned: candles after the last one with
//! `complete` set never carry an event, the same cut the scorer applies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{sign, Direction};
use crate::indicators::IndicatorFrame;

/// Bar at which tenkan - kijun changed sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossEvent {
    pub index: usize,
    pub time: DateTime<Utc>,
    pub direction: Direction,
}

/// Most recent crossover, or `None` if the relationship never changed sign.
pub fn detect_latest(frame: &IndicatorFrame) -> Option<CrossEvent> {
    let diffs = diffs(frame);
    (1..diffs.len())
        .rev()
        .find_map(|i| transition(diffs[i - 1], diffs[i]).map(|d| (i, d)))
        .and_then(|(index, direction)| event(frame, index, direction))
}

/// Every crossover in the frame, oldest first.
pub fn detect_all(frame: &IndicatorFrame) -> Vec<CrossEvent> {
    let diffs = diffs(frame);
    (1..diffs.len())
        .filter_map(|i| transition(diffs[i - 1], diffs[i]).map(|d| (i, d)))
        .filter_map(|(index, direction)| event(frame, index, direction))
        .collect()
}

fn diffs(frame: &IndicatorFrame) -> Vec<Option<i8>> {
    let end = frame.series().last_closed_index().map_or(0, |i| i + 1);
    (0..end)
        .map(|i| Some(sign(frame.tenkan(i)? - frame.kijun(i)?)))
        .collect()
}

fn transition(prev: Option<i8>, cur: Option<i8>) -> Option<Direction> {
    let (prev, cur) = (prev?, cur?);
    if cur > 0 && prev <= 0 {
        Some(Direction::Bullish)
    } else if cur < 0 && prev >= 0 {
        Some(Direction::Bearish)
    } else {
        None
    }
}

fn event(frame: &IndicatorFrame, index: usize, direction: Direction) -> Option<CrossEvent> {
    frame.candle(index).map(|c| CrossEvent {
        index,
        time: c.time,
        direction,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Granularity, Series};
    use crate::indicators::{make_hlc_candles, IchimokuParams};

    fn frame_from_closes(closes: &[f64]) -> IndicatorFrame {
        let data: Vec<_> = closes.iter().map(|&c| (c + 0.5, c - 0.5, c)).collect();
        let series = Series::new("TEST", Granularity::H1, make_hlc_candles(&data)).unwrap();
        IndicatorFrame::compute(series, &IchimokuParams::default())
    }

    /// Falls 1.0 per bar until `turn`, then rises 2.0 per bar.
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

    fn signs(seq: &[Option<i8>]) -> Vec<(usize, Direction)> {
        (1..seq.len())
            .filter_map(|i| transition(seq[i - 1], seq[i]).map(|d| (i, d)))
            .collect()
    }

    #[test]
    fn transition_rules() {
        assert_eq!(transition(Some(-1), Some(1)), Some(Direction::Bullish));
        assert_eq!(transition(Some(0), Some(1)), Some(Direction::Bullish));
        assert_eq!(transition(Some(1), Some(-1)), Some(Direction::Bearish));
        assert_eq!(transition(Some(0), Some(-1)), Some(Direction::Bearish));
        assert_eq!(transition(Some(1), Some(1)), None);
        assert_eq!(transition(Some(-1), Some(0)), None);
        assert_eq!(transition(Some(1), Some(0)), None);
        assert_eq!(transition(None, Some(1)), None);
        assert_eq!(transition(Some(-1), None), None);
    }

    #[test]
    fn zero_bar_is_never_the_event() {
        let seq = [Some(-1), Some(0), Some(0), Some(1)];
        assert_eq!(signs(&seq), vec![(3, Direction::Bullish)]);
    }

    #[test]
    fn touch_and_bounce_refires() {
        let seq = [Some(1), Some(0), Some(1)];
        assert_eq!(signs(&seq), vec![(2, Direction::Bullish)]);
    }

    #[test]
    fn undefined_previous_suppresses_event() {
        let seq = [None, Some(1), Some(1), Some(-1)];
        assert_eq!(signs(&seq), vec![(3, Direction::Bearish)]);
    }

    #[test]
    fn v_shape_crosses_bullish_once() {
        let frame = frame_from_closes(&v_shape(101, 41));
        let all = detect_all(&frame);
        assert_eq!(all.len(), 1);
        let latest = detect_latest(&frame).unwrap();
        assert_eq!(latest.index, 50);
        assert_eq!(latest.direction, Direction::Bullish);
        assert_eq!(latest.time, frame.candle(50).unwrap().time);
    }

    #[test]
    fn latest_picks_most_recent_of_many() {
        // up, down, up again
        let mut closes = v_shape(60, 30);
        let peak = *closes.last().unwrap();
        closes.extend((1..=40).map(|k| peak - 2.0 * k as f64));
        let frame = frame_from_closes(&closes);
        let all = detect_all(&frame);
        assert!(all.len() >= 2);
        assert_eq!(detect_latest(&frame), all.last().copied());
        assert_eq!(all.last().unwrap().direction, Direction::Bearish);
    }

    #[test]
    fn flat_market_has_no_cross() {
        let frame = frame_from_closes(&[100.0; 100]);
        assert!(detect_all(&frame).is_empty());
        assert_eq!(detect_latest(&frame), None);
    }

    /// Flat closed candles with a spike at 85 and a dip at 86 push kijun
    /// above tenkan from bar 94. A forming candle with a high of 119 would
    /// flip tenkan back above kijun.
    fn spike_with_forming_flip() -> IndicatorFrame {
        let mut data: Vec<_> = (0..101).map(|_| (100.5, 99.5, 100.0)).collect();
        data[85].0 = 120.0;
        data[86].1 = 90.0;
        data[100].0 = 119.0;
        let mut candles = make_hlc_candles(&data);
        candles[100].complete = false;
        let series = Series::new("TEST", Granularity::H1, candles).unwrap();
        IndicatorFrame::compute(series, &IchimokuParams::default())
    }

    #[test]
    fn forming_candle_never_carries_a_cross() {
        let frame = spike_with_forming_flip();
        // the forming bar itself is bullish
        assert!(frame.tenkan(100).unwrap() > frame.kijun(100).unwrap());

        let all = detect_all(&frame);
        let summary: Vec<_> = all.iter().map(|e| (e.index, e.direction)).collect();
        assert_eq!(summary, vec![(94, Direction::Bearish)]);
        assert_eq!(detect_latest(&frame), all.last().copied());
    }

    #[test]
    fn no_closed_candle_means_no_cross() {
        let data: Vec<_> = (0..60)
            .map(|i| {
                let c = 100.0 + i as f64;
                (c + 1.0, c - 1.0, c)
            })
            .collect();
        let mut candles = make_hlc_candles(&data);
        for c in &mut candles {
            c.complete = false;
        }
        let series = Series::new("TEST", Granularity::H1, candles).unwrap();
        let frame = IndicatorFrame::compute(series, &IchimokuParams::default());
        assert!(detect_all(&frame).is_empty());
        assert_eq!(detect_latest(&frame), None);
    }

    #[test]
    fn too_short_for_kijun_has_no_cross() {
        let frame = frame_from_closes(&v_shape(25, 10));
        assert_eq!(detect_latest(&frame), None);
    }
}
