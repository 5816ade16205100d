//! Candle sources.

pub mod csv_file;
pub mod provider;
pub mod synthetic;

pub use csv_file::{read_candles, CsvProvider};
pub use provider::{CandleProvider, FetchError, MemoryProvider};
pub use synthetic::SyntheticProvider;
