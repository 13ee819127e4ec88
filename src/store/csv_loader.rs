// =============================================================================
// CSV bar loader
// =============================================================================
//
// Reads a directory of `<SYMBOL>.csv` files with the columns
//
//   Date,Open,High,Low,Close,Adj Close,Volume
//
// into a `MemoryBarStore`. Prices are rounded to two decimal places. Rows that
// fail to parse are skipped and counted; a file that cannot be read at all is
// logged and skipped without aborting the rest of the load.

use std::path::Path;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::MemoryBarStore;
use crate::types::Bar;

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Open")]
    open: String,
    #[serde(rename = "High")]
    high: String,
    #[serde(rename = "Low")]
    low: String,
    #[serde(rename = "Close")]
    close: String,
    #[serde(rename = "Adj Close")]
    adj_close: String,
    #[serde(rename = "Volume")]
    volume: String,
}

/// Outcome of loading a directory.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub files_loaded: usize,
    pub files_failed: usize,
    pub bars_loaded: usize,
    pub rows_skipped: usize,
}

/// Load every `*.csv` file in `dir`. The symbol is the upper-cased file stem.
pub fn load_csv_dir(dir: impl AsRef<Path>) -> Result<(MemoryBarStore, LoadReport)> {
    let dir = dir.as_ref();
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read data directory {}", dir.display()))?;

    let mut store = MemoryBarStore::new();
    let mut report = LoadReport::default();

    for entry in entries {
        let path = entry.context("failed to read directory entry")?.path();
        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
        if !is_csv {
            continue;
        }
        let Some(symbol) = path.file_stem().and_then(|s| s.to_str()).map(str::to_uppercase) else {
            continue;
        };

        match load_csv_file(&path) {
            Ok((bars, skipped)) => {
                debug!(symbol = %symbol, bars = bars.len(), skipped, "loaded csv");
                if skipped > 0 {
                    warn!(symbol = %symbol, skipped, "skipped unparseable rows");
                }
                report.files_loaded += 1;
                report.bars_loaded += bars.len();
                report.rows_skipped += skipped;
                store.insert_bars(&symbol, bars);
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load csv file");
                report.files_failed += 1;
            }
        }
    }

    info!(
        dir = %dir.display(),
        symbols = store.symbol_count(),
        bars = report.bars_loaded,
        failed = report.files_failed,
        "bar store loaded"
    );

    Ok((store, report))
}

/// Parse one file; returns the bars and the number of skipped rows.
pub fn load_csv_file(path: impl AsRef<Path>) -> Result<(Vec<Bar>, usize)> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let mut bars = Vec::new();
    let mut skipped = 0;
    for row in reader.deserialize::<CsvRow>() {
        // Record-level errors (wrong field count, bad UTF-8) only cost the row.
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "skipping malformed record");
                skipped += 1;
                continue;
            }
        };
        match parse_row(&row) {
            Ok(bar) => bars.push(bar),
            Err(e) => {
                debug!(path = %path.display(), date = %row.date, error = %e, "skipping row");
                skipped += 1;
            }
        }
    }

    Ok((bars, skipped))
}

fn parse_row(row: &CsvRow) -> Result<Bar> {
    let date = NaiveDate::parse_from_str(row.date.trim(), "%Y-%m-%d")
        .with_context(|| format!("bad date {:?}", row.date))?;
    Ok(Bar {
        date,
        open: parse_price(&row.open)?,
        high: parse_price(&row.high)?,
        low: parse_price(&row.low)?,
        close: parse_price(&row.close)?,
        adj_close: parse_price(&row.adj_close)?,
        volume: parse_volume(&row.volume)?,
    })
}

fn parse_price(raw: &str) -> Result<Decimal> {
    let raw = raw.trim();
    let value = Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .with_context(|| format!("bad price {raw:?}"))?;
    Ok(value.round_dp(2))
}

fn parse_volume(raw: &str) -> Result<u64> {
    let raw = raw.trim();
    if let Ok(v) = raw.parse::<u64>() {
        return Ok(v);
    }
    // Some exports write volumes as floats ("1200.0").
    let v: f64 = raw.parse().with_context(|| format!("bad volume {raw:?}"))?;
    if !v.is_finite() || v < 0.0 {
        bail!("bad volume {raw:?}");
    }
    Ok(v.round() as u64)
}
