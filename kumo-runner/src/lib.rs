//! Kumo Runner: scan orchestration, configuration, result set, export.
//!
//! This crate builds on `kumo-core` to provide:
//! - TOML scan configuration with validated defaults
//! - A parallel, cancellable batch scanner over an instrument universe
//! - Per-instrument reports with multi-timeframe alignment
//! - JSON, CSV, and text-table export

pub mod config;
pub mod export;
pub mod report;
pub mod scan;

pub use config::{ConfigError, ScanConfig, ScanSection, DEFAULT_INSTRUMENTS, MAX_TIMEFRAMES};
pub use export::{export_csv, export_json, import_json, render_table, write_output};
pub use report::{InstrumentReport, ScanReport, TimeframeOutcome, TimeframeReport};
pub use scan::{run_scan, scan_instrument, ScanError};
