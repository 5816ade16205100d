//! CSV candle files.
//!
//! One file per instrument and granularity, `<dir>/<INSTRUMENT>_<GRANULARITY>.csv`,
//! with header `time,open,high,low,close,complete` and RFC 3339 timestamps.
//! `complete` may be omitted, in which case every row counts as closed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::provider::{CandleProvider, FetchError};
use crate::domain::{Candle, Granularity, Series};

#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    time: DateTime<Utc>,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[serde(default = "default_complete")]
    complete: bool,
}

fn default_complete() -> bool {
    true
}

impl From<CsvRow> for Candle {
    fn from(row: CsvRow) -> Self {
        Candle {
            time: row.time,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            complete: row.complete,
        }
    }
}

/// Provider reading candle files from a directory.
#[derive(Debug, Clone)]
pub struct CsvProvider {
    dir: PathBuf,
}

impl CsvProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the file holding `instrument` at `granularity`.
    pub fn path_for(&self, instrument: &str, granularity: Granularity) -> PathBuf {
        self.dir.join(format!("{instrument}_{granularity}.csv"))
    }

    /// Write a series to its file, creating the directory if needed.
    pub fn write(&self, series: &Series) -> Result<PathBuf, FetchError> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(series.instrument(), series.granularity());
        let mut wtr = csv::Writer::from_path(&path).map_err(|e| FetchError::Parse(e.to_string()))?;
        for c in series.candles() {
            wtr.serialize(CsvRow {
                time: c.time,
                open: c.open,
                high: c.high,
                low: c.low,
                close: c.close,
                complete: c.complete,
            })
            .map_err(|e| FetchError::Parse(e.to_string()))?;
        }
        wtr.flush()?;
        Ok(path)
    }
}

/// Parse candle rows from any reader.
pub fn read_candles<R: std::io::Read>(reader: R) -> Result<Vec<Candle>, FetchError> {
    let mut rdr = csv::Reader::from_reader(reader);
    rdr.deserialize::<CsvRow>()
        .map(|row| {
            row.map(Candle::from)
                .map_err(|e| FetchError::Parse(e.to_string()))
        })
        .collect()
}

impl CandleProvider for CsvProvider {
    fn name(&self) -> &str {
        "csv"
    }

    fn fetch_candles(
        &self,
        instrument: &str,
        granularity: Granularity,
        count: usize,
    ) -> Result<Series, FetchError> {
        let path = self.path_for(instrument, granularity);
        let file = match std::fs::File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(FetchError::NotFound {
                    instrument: instrument.to_string(),
                    granularity,
                });
            }
            Err(e) => return Err(e.into()),
        };

        let candles = read_candles(file)?;
        if candles.is_empty() {
            return Err(FetchError::Empty {
                instrument: instrument.to_string(),
                granularity,
            });
        }
        Ok(Series::new(instrument, granularity, candles)?.tail(count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const SAMPLE: &str = "\
time,open,high,low,close,complete
2024-03-04T10:00:00Z,1.0850,1.0872,1.0841,1.0866,true
2024-03-04T11:00:00Z,1.0866,1.0880,1.0860,1.0875,true
2024-03-04T12:00:00Z,1.0875,1.0879,1.0869,1.0871,false
";

    #[test]
    fn parses_rows() {
        let candles = read_candles(SAMPLE.as_bytes()).unwrap();
        assert_eq!(candles.len(), 3);
        assert_eq!(
            candles[0].time,
            Utc.with_ymd_and_hms(2024, 3, 4, 10, 0, 0).unwrap()
        );
        assert_eq!(candles[1].close, 1.0875);
        assert!(!candles[2].complete);
    }

    #[test]
    fn complete_column_is_optional() {
        let data = "time,open,high,low,close\n2024-03-04T10:00:00Z,1.0,1.2,0.9,1.1\n";
        let candles = read_candles(data.as_bytes()).unwrap();
        assert!(candles[0].complete);
    }

    #[test]
    fn bad_number_is_parse_error() {
        let data = "time,open,high,low,close\n2024-03-04T10:00:00Z,abc,1.2,0.9,1.1\n";
        assert!(matches!(
            read_candles(data.as_bytes()),
            Err(FetchError::Parse(_))
        ));
    }

    #[test]
    fn write_then_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let provider = CsvProvider::new(dir.path());
        let series = Series::new(
            "EUR_USD",
            Granularity::H1,
            read_candles(SAMPLE.as_bytes()).unwrap(),
        )
        .unwrap();
        let path = provider.write(&series).unwrap();
        assert!(path.ends_with("EUR_USD_H1.csv"));

        let fetched = provider
            .fetch_candles("EUR_USD", Granularity::H1, 2)
            .unwrap();
        assert_eq!(fetched.len(), 2);
        assert_eq!(fetched.candles()[1].close, 1.0871);
        assert!(!fetched.candles()[1].complete);
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let provider = CsvProvider::new(dir.path());
        assert!(matches!(
            provider.fetch_candles("GBP_USD", Granularity::D, 10),
            Err(FetchError::NotFound { .. })
        ));
    }

    #[test]
    fn header_only_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let provider = CsvProvider::new(dir.path());
        std::fs::write(
            provider.path_for("USD_JPY", Granularity::H4),
            "time,open,high,low,close,complete\n",
        )
        .unwrap();
        assert!(matches!(
            provider.fetch_candles("USD_JPY", Granularity::H4, 10),
            Err(FetchError::Empty { .. })
        ));
    }

    #[test]
    fn unordered_rows_are_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let provider = CsvProvider::new(dir.path());
        std::fs::write(
            provider.path_for("AUD_USD", Granularity::H1),
            "time,open,high,low,close\n\
             2024-03-04T11:00:00Z,1.0,1.2,0.9,1.1\n\
             2024-03-04T10:00:00Z,1.0,1.2,0.9,1.1\n",
        )
        .unwrap();
        assert!(matches!(
            provider.fetch_candles("AUD_USD", Granularity::H1, 10),
            Err(FetchError::InvalidSeries(_))
        ));
    }
}
