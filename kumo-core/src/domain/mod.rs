//! Domain types: candles, series, granularities.

pub mod candle;
pub mod granularity;
pub mod series;

pub use candle::Candle;
pub use granularity::{Granularity, ParseGranularityError};
pub use series::{Series, SeriesError};
