//! Reporting and export: JSON, CSV, and a fixed-width text table.
//!
//! - **JSON**: the full `ScanReport`, round-trippable
//! - **CSV**: one row per instrument × timeframe, for spreadsheets
//! - **Table**: one row per instrument for the terminal

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};

use crate::report::{InstrumentReport, ScanReport, TimeframeOutcome, TimeframeReport};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `ScanReport` to pretty JSON.
pub fn export_json(report: &ScanReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize ScanReport to JSON")
}

/// Deserialize a `ScanReport` from JSON.
pub fn import_json(json: &str) -> Result<ScanReport> {
    serde_json::from_str(json).context("failed to deserialize ScanReport from JSON")
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export the report as CSV, one row per instrument and timeframe.
///
/// Columns: instrument, timeframe, status, candles, evaluated_at, close,
/// price_vs_kumo, tenkan_vs_kijun, future_cloud, chikou, score, verdict,
/// last_cross_at, last_cross_direction, aligned, detail
pub fn export_csv(report: &ScanReport) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "instrument",
        "timeframe",
        "status",
        "candles",
        "evaluated_at",
        "close",
        "price_vs_kumo",
        "tenkan_vs_kijun",
        "future_cloud",
        "chikou",
        "score",
        "verdict",
        "last_cross_at",
        "last_cross_direction",
        "aligned",
        "detail",
    ])?;

    for inst in &report.instruments {
        let aligned = inst.aligned().map(|s| s.to_string()).unwrap_or_default();
        for tf in &inst.timeframes {
            let (cross_at, cross_dir) = match &tf.last_cross {
                Some(c) => (c.time.to_rfc3339(), c.direction.to_string()),
                None => (String::new(), String::new()),
            };
            let scored = match &tf.outcome {
                TimeframeOutcome::Scored(r) => vec![
                    r.time.to_rfc3339(),
                    format!("{:.5}", r.close),
                    r.sub_scores.price_vs_kumo.to_string(),
                    r.sub_scores.tenkan_vs_kijun.to_string(),
                    r.sub_scores.future_cloud.to_string(),
                    r.sub_scores.chikou.to_string(),
                    r.score.to_string(),
                    r.verdict.to_string(),
                ],
                _ => vec![String::new(); 8],
            };
            let detail = match &tf.outcome {
                TimeframeOutcome::Scored(_) => String::new(),
                TimeframeOutcome::Indeterminate { reason } => reason.to_string(),
                TimeframeOutcome::FetchFailed { error } => error.clone(),
            };

            let mut row = vec![
                inst.instrument.clone(),
                tf.granularity.to_string(),
                tf.outcome.status().to_string(),
                tf.candles.to_string(),
            ];
            row.extend(scored);
            row.extend([cross_at, cross_dir, aligned.clone(), detail]);
            wtr.write_record(&row)?;
        }
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Text table ─────────────────────────────────────────────────────

/// Render the report as a fixed-width table, one row per instrument.
///
/// Each timeframe gets a column showing `score verdict`, or `n/a` when it
/// could not be scored. The cross column reads the primary timeframe.
pub fn render_table(report: &ScanReport) -> String {
    let mut out = String::new();

    let mut header = format!("{:<10} {:<9} {:<17}", "Pair", "Cross", "Cross time");
    for g in &report.timeframes {
        let _ = write!(header, " {:<16}", g.code());
    }
    let _ = write!(header, " {:<11}", "Aligned");
    let width = header.len();
    let _ = writeln!(out, "{header}");
    let _ = writeln!(out, "{}", "-".repeat(width));

    for inst in &report.instruments {
        let _ = writeln!(out, "{}", table_row(inst));
    }

    if !report.skipped.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Cancelled: {} instrument(s) not scanned: {}",
            report.skipped.len(),
            report.skipped.join(", ")
        );
    }
    out
}

fn table_row(inst: &InstrumentReport) -> String {
    let (direction, time) = match inst.last_cross() {
        Some(c) => (c.direction.to_string(), c.time.format(TIME_FORMAT).to_string()),
        None => ("-".to_string(), "-".to_string()),
    };
    let mut row = format!("{:<10} {:<9} {:<17}", inst.instrument, direction, time);
    for tf in &inst.timeframes {
        let _ = write!(row, " {:<16}", cell(tf));
    }
    let aligned = inst
        .aligned()
        .map(|s| s.to_string())
        .unwrap_or_else(|| "-".to_string());
    let _ = write!(row, " {aligned:<11}");
    row.trim_end().to_string()
}

fn cell(tf: &TimeframeReport) -> String {
    match &tf.outcome {
        TimeframeOutcome::Scored(r) => format!("{:+} {}", r.score, r.verdict),
        TimeframeOutcome::Indeterminate { .. } => "n/a".to_string(),
        TimeframeOutcome::FetchFailed { .. } => "no data".to_string(),
    }
}

// ─── Files ──────────────────────────────────────────────────────────

/// Write `contents` to `path`, creating parent directories.
pub fn write_output(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(path, contents)
        .with_context(|| format!("failed to write output: {}", path.display()))
}
