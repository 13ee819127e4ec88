// =============================================================================
// Timeframe Resolver
// =============================================================================
//
// Maps a symbolic window code onto a concrete start date relative to the
// simulated "today". The window is always [start, simulated_date], so every
// query built from it is causal.
//
//   1W  -> -7 days      1Y  -> -365 days
//   1M  -> -30 days     5Y  -> -1825 days
//   3M  -> -90 days     YTD -> January 1 of the simulated year
//   6M  -> -180 days    anything else -> same as 1Y
// =============================================================================

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Symbolic window length selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1W")]
    Week1,
    #[serde(rename = "1M")]
    Month1,
    #[serde(rename = "3M")]
    Month3,
    #[serde(rename = "6M")]
    Month6,
    #[default]
    #[serde(rename = "1Y")]
    Year1,
    #[serde(rename = "YTD")]
    YearToDate,
    #[serde(rename = "5Y")]
    Year5,
}

impl Timeframe {
    pub fn all() -> [Timeframe; 7] {
        [
            Timeframe::Week1,
            Timeframe::Month1,
            Timeframe::Month3,
            Timeframe::Month6,
            Timeframe::Year1,
            Timeframe::YearToDate,
            Timeframe::Year5,
        ]
    }

    pub fn code(&self) -> &'static str {
        match self {
            Timeframe::Week1 => "1W",
            Timeframe::Month1 => "1M",
            Timeframe::Month3 => "3M",
            Timeframe::Month6 => "6M",
            Timeframe::Year1 => "1Y",
            Timeframe::YearToDate => "YTD",
            Timeframe::Year5 => "5Y",
        }
    }

    /// Recognise one of the known codes. Callers that want to reject unknown
    /// codes use this before resolving.
    pub fn parse_strict(code: &str) -> Option<Timeframe> {
        Timeframe::all().into_iter().find(|tf| tf.code() == code)
    }

    /// Unknown codes fall back to one year.
    pub fn parse_lenient(code: &str) -> Timeframe {
        Timeframe::parse_strict(code).unwrap_or_default()
    }

    /// First date (inclusive) of the window ending at `simulated_date`.
    pub fn start_date(&self, simulated_date: NaiveDate) -> NaiveDate {
        let days = match self {
            Timeframe::Week1 => 7,
            Timeframe::Month1 => 30,
            Timeframe::Month3 => 90,
            Timeframe::Month6 => 180,
            Timeframe::Year1 => 365,
            Timeframe::Year5 => 1825,
            Timeframe::YearToDate => {
                return NaiveDate::from_ymd_opt(simulated_date.year(), 1, 1)
                    .unwrap_or(simulated_date);
            }
        };
        simulated_date
            .checked_sub_signed(Duration::days(days))
            .unwrap_or(NaiveDate::MIN)
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Resolve `(simulated_date, code)` into the window's start date. Never fails:
/// unrecognised codes silently use the 1Y rule.
pub fn resolve(simulated_date: NaiveDate, timeframe_code: &str) -> NaiveDate {
    Timeframe::parse_lenient(timeframe_code).start_date(simulated_date)
}
