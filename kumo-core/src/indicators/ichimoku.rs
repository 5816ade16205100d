//! Ichimoku Kinko Hyo: the five-line indicator family.
//!
//! - Tenkan:   midpoint over `tenkan` bars
//! - Kijun:    midpoint over `kijun` bars
//! - Senkou A: (tenkan + kijun) / 2, displaced forward `displacement` bars
//! - Senkou B: midpoint over `senkou_b` bars, displaced forward `displacement` bars
//! - Chikou:   close displaced backward `displacement` bars
//!
//! Chikou is the only line that reads later bars; its last `displacement`
//! positions are always undefined.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::midpoint::rolling_midpoint;
use super::rolling::{shift_backward, shift_forward};
use super::Indicator;
use crate::domain::{Candle, Series};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParamsError {
    #[error("{name} period must be >= 1")]
    ZeroPeriod { name: &'static str },

    #[error("periods must satisfy tenkan <= kijun <= senkou_b (got {tenkan}/{kijun}/{senkou_b})")]
    Unordered {
        tenkan: usize,
        kijun: usize,
        senkou_b: usize,
    },
}

/// Ichimoku periods. Defaults are the classic 9/26/52 with a 26-bar shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct IchimokuParams {
    pub tenkan: usize,
    pub kijun: usize,
    pub senkou_b: usize,
    pub displacement: usize,
}

impl Default for IchimokuParams {
    fn default() -> Self {
        Self {
            tenkan: 9,
            kijun: 26,
            senkou_b: 52,
            displacement: 26,
        }
    }
}

impl IchimokuParams {
    pub fn validate(&self) -> Result<(), ParamsError> {
        for (name, value) in [
            ("tenkan", self.tenkan),
            ("kijun", self.kijun),
            ("senkou_b", self.senkou_b),
            ("displacement", self.displacement),
        ] {
            if value == 0 {
                return Err(ParamsError::ZeroPeriod { name });
            }
        }
        if self.tenkan > self.kijun || self.kijun > self.senkou_b {
            return Err(ParamsError::Unordered {
                tenkan: self.tenkan,
                kijun: self.kijun,
                senkou_b: self.senkou_b,
            });
        }
        Ok(())
    }

    /// Fewest candles for which the second-to-last candle has a defined
    /// cloud: `senkou_b + displacement + 1` (79 with default periods).
    pub fn min_scoring_candles(&self) -> usize {
        self.senkou_b + self.displacement + 1
    }
}

impl fmt::Display for IchimokuParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Ichimoku({},{},{};{})",
            self.tenkan, self.kijun, self.senkou_b, self.displacement
        )
    }
}

/// One of the five Ichimoku lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Line {
    Tenkan,
    Kijun,
    SenkouA,
    SenkouB,
    Chikou,
}

impl Line {
    pub const ALL: [Line; 5] = [
        Line::Tenkan,
        Line::Kijun,
        Line::SenkouA,
        Line::SenkouB,
        Line::Chikou,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Line::Tenkan => "tenkan",
            Line::Kijun => "kijun",
            Line::SenkouA => "senkou_a",
            Line::SenkouB => "senkou_b",
            Line::Chikou => "chikou",
        }
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single Ichimoku line as an [`Indicator`].
///
/// [`IndicatorFrame::compute`] builds every column through this type.
#[derive(Debug, Clone, Copy)]
pub struct IchimokuLine {
    line: Line,
    params: IchimokuParams,
}

impl IchimokuLine {
    pub fn new(line: Line, params: IchimokuParams) -> Result<Self, ParamsError> {
        params.validate()?;
        Ok(Self { line, params })
    }

    pub fn line(&self) -> Line {
        self.line
    }
}

impl Indicator for IchimokuLine {
    fn name(&self) -> &str {
        self.line.as_str()
    }

    fn lookback(&self) -> usize {
        let p = &self.params;
        match self.line {
            Line::Tenkan => p.tenkan - 1,
            Line::Kijun => p.kijun - 1,
            Line::SenkouA => p.tenkan.max(p.kijun) - 1 + p.displacement,
            Line::SenkouB => p.senkou_b - 1 + p.displacement,
            Line::Chikou => 0,
        }
    }

    fn compute(&self, candles: &[Candle]) -> Vec<f64> {
        let p = &self.params;
        match self.line {
            Line::Tenkan => rolling_midpoint(candles, p.tenkan),
            Line::Kijun => rolling_midpoint(candles, p.kijun),
            Line::SenkouA => {
                let tenkan = rolling_midpoint(candles, p.tenkan);
                let kijun = rolling_midpoint(candles, p.kijun);
                shift_forward(&average(&tenkan, &kijun), p.displacement)
            }
            Line::SenkouB => shift_forward(&rolling_midpoint(candles, p.senkou_b), p.displacement),
            Line::Chikou => {
                let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
                shift_backward(&closes, p.displacement)
            }
        }
    }
}

fn average(a: &[f64], b: &[f64]) -> Vec<f64> {
    a.iter().zip(b).map(|(x, y)| (x + y) / 2.0).collect()
}

/// A series enriched with the five Ichimoku columns.
///
/// Columns are computed once and aligned by index with the candles. The
/// accessors return `None` for undefined (NaN) positions and out-of-range
/// indices, so an undefined value can never be mistaken for zero.
#[derive(Debug, Clone)]
pub struct IndicatorFrame {
    series: Series,
    params: IchimokuParams,
    tenkan: Vec<f64>,
    kijun: Vec<f64>,
    senkou_a: Vec<f64>,
    senkou_b: Vec<f64>,
    chikou: Vec<f64>,
}

impl IndicatorFrame {
    /// Compute every line for `series`.
    ///
    /// Never fails on short input: lines without enough history are NaN.
    /// Params are expected to be validated by the caller.
    pub fn compute(series: Series, params: &IchimokuParams) -> Self {
        let column = |line| {
            IchimokuLine {
                line,
                params: *params,
            }
            .compute(series.candles())
        };
        let tenkan = column(Line::Tenkan);
        let kijun = column(Line::Kijun);
        let senkou_a = column(Line::SenkouA);
        let senkou_b = column(Line::SenkouB);
        let chikou = column(Line::Chikou);

        Self {
            series,
            params: *params,
            tenkan,
            kijun,
            senkou_a,
            senkou_b,
            chikou,
        }
    }

    pub fn series(&self) -> &Series {
        &self.series
    }

    pub fn params(&self) -> &IchimokuParams {
        &self.params
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn candle(&self, index: usize) -> Option<&Candle> {
        self.series.candles().get(index)
    }

    /// Full column for a line, NaN where undefined.
    pub fn column(&self, line: Line) -> &[f64] {
        match line {
            Line::Tenkan => &self.tenkan,
            Line::Kijun => &self.kijun,
            Line::SenkouA => &self.senkou_a,
            Line::SenkouB => &self.senkou_b,
            Line::Chikou => &self.chikou,
        }
    }

    /// Value of `line` at `index`, or `None` if undefined.
    pub fn value(&self, line: Line, index: usize) -> Option<f64> {
        self.column(line)
            .get(index)
            .copied()
            .filter(|v| !v.is_nan())
    }

    pub fn tenkan(&self, index: usize) -> Option<f64> {
        self.value(Line::Tenkan, index)
    }

    pub fn kijun(&self, index: usize) -> Option<f64> {
        self.value(Line::Kijun, index)
    }

    pub fn senkou_a(&self, index: usize) -> Option<f64> {
        self.value(Line::SenkouA, index)
    }

    pub fn senkou_b(&self, index: usize) -> Option<f64> {
        self.value(Line::SenkouB, index)
    }

    pub fn chikou(&self, index: usize) -> Option<f64> {
        self.value(Line::Chikou, index)
    }

    /// Upper and lower cloud boundaries at `index`.
    pub fn cloud(&self, index: usize) -> Option<(f64, f64)> {
        let a = self.senkou_a(index)?;
        let b = self.senkou_b(index)?;
        Some((a.max(b), a.min(b)))
    }
}
