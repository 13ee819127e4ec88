// =============================================================================
// Result Assembler
// =============================================================================
//
// Zips calculator output back onto the date axis. Inside the engine every
// array keeps one slot per bar; outward-facing results only carry dates where
// a value is defined, so the undefined prefix simply disappears. A window
// with no defined values produces an empty collection, not an error.
// =============================================================================

use chrono::NaiveDate;
use serde::Serialize;

use crate::indicators::{MacdSeries, Series};

/// One defined indicator value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub value: f64,
    /// Value mapped onto the price axis; only present when an overlay was
    /// requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scaled: Option<f64>,
}

/// One MACD date. Emitted whenever the MACD line is defined; signal and
/// histogram stay `null` until they are defined too.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MacdPoint {
    pub date: NaiveDate,
    pub macd: f64,
    pub signal: Option<f64>,
    pub histogram: Option<f64>,
}

/// Per-date EMA plus MACD view used by the combined endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinedPoint {
    pub date: NaiveDate,
    pub ema: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_histogram: Option<f64>,
}

fn defined(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Keep only the dates whose value is defined and finite.
pub fn assemble(dates: &[NaiveDate], values: &Series) -> Vec<IndicatorPoint> {
    dates
        .iter()
        .zip(values)
        .filter_map(|(&date, &value)| {
            defined(value).map(|value| IndicatorPoint {
                date,
                value,
                scaled: None,
            })
        })
        .collect()
}

/// MACD points, keyed on the line being defined.
pub fn assemble_macd(dates: &[NaiveDate], series: &MacdSeries) -> Vec<MacdPoint> {
    dates
        .iter()
        .enumerate()
        .filter_map(|(i, &date)| {
            let macd = defined(series.macd.get(i).copied().flatten())?;
            Some(MacdPoint {
                date,
                macd,
                signal: defined(series.signal.get(i).copied().flatten()),
                histogram: defined(series.histogram.get(i).copied().flatten()),
            })
        })
        .collect()
}

/// Combined EMA + MACD rows; dates where nothing is defined are dropped.
pub fn assemble_combined(dates: &[NaiveDate], ema: &Series, macd: &MacdSeries) -> Vec<CombinedPoint> {
    let at = |series: &Series, i: usize| defined(series.get(i).copied().flatten());

    dates
        .iter()
        .enumerate()
        .map(|(i, &date)| CombinedPoint {
            date,
            ema: at(ema, i),
            macd: at(&macd.macd, i),
            macd_signal: at(&macd.signal, i),
            macd_histogram: at(&macd.histogram, i),
        })
        .filter(|p| {
            p.ema.is_some() || p.macd.is_some() || p.macd_signal.is_some() || p.macd_histogram.is_some()
        })
        .collect()
}
