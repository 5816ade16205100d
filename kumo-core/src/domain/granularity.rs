//! Granularity: the fixed time width of one candle.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Candle width, named with the market-data vendor's codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Granularity {
    M1,
    M5,
    M15,
    M30,
    H1,
    H4,
    D,
    W,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown granularity '{0}' (expected one of M1, M5, M15, M30, H1, H4, D, W)")]
pub struct ParseGranularityError(pub String);

impl Granularity {
    pub const ALL: [Granularity; 8] = [
        Granularity::M1,
        Granularity::M5,
        Granularity::M15,
        Granularity::M30,
        Granularity::H1,
        Granularity::H4,
        Granularity::D,
        Granularity::W,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Granularity::M1 => "M1",
            Granularity::M5 => "M5",
            Granularity::M15 => "M15",
            Granularity::M30 => "M30",
            Granularity::H1 => "H1",
            Granularity::H4 => "H4",
            Granularity::D => "D",
            Granularity::W => "W",
        }
    }

    /// Nominal width of one candle.
    pub fn duration(&self) -> Duration {
        match self {
            Granularity::M1 => Duration::minutes(1),
            Granularity::M5 => Duration::minutes(5),
            Granularity::M15 => Duration::minutes(15),
            Granularity::M30 => Duration::minutes(30),
            Granularity::H1 => Duration::hours(1),
            Granularity::H4 => Duration::hours(4),
            Granularity::D => Duration::days(1),
            Granularity::W => Duration::weeks(1),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Granularity {
    type Err = ParseGranularityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Granularity::ALL
            .into_iter()
            .find(|g| g.code() == upper)
            .ok_or_else(|| ParseGranularityError(s.to_string()))
    }
}
