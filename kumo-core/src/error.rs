//! Analysis errors.
//!
//! Both variants are non-fatal: they mark one instrument/timeframe as
//! indeterminate and never abort a batch.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::indicators::Line;

#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisError {
    #[error("insufficient data: {available} candles, need at least {required}")]
    InsufficientData { required: usize, available: usize },

    #[error("{line} undefined at index {index}")]
    UndefinedValue { line: Line, index: usize },
}
