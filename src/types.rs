// =============================================================================
// Shared types used across the stockview service
// =============================================================================

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ServiceError};

/// One trading day for a symbol. Prices carry two fractional digits and
/// serialize as decimal strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub adj_close: Decimal,
    pub volume: u64,
}

/// Raw OHLC bars for a symbol inside a resolved window.
#[derive(Debug, Clone, Serialize)]
pub struct PriceHistory {
    pub symbol: String,
    pub simulated_date: NaiveDate,
    pub timeframe: String,
    pub data: Vec<Bar>,
}

/// Snapshot of a single symbol as of the simulated date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockDetail {
    pub symbol: String,
    pub name: String,
    pub as_of: NaiveDate,
    pub current_price: Decimal,
    pub change: Decimal,
    pub change_percent: Decimal,
    pub volume: u64,
    pub high_52w: Decimal,
    pub low_52w: Decimal,
}

/// One row of a watchlist response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WatchlistItem {
    pub symbol: String,
    pub name: String,
    pub as_of: NaiveDate,
    pub last_price: Decimal,
    pub net_change: Decimal,
    pub change_percent: Decimal,
    pub volume: u64,
}

/// A symbol the store knows about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockInfo {
    pub symbol: String,
    pub name: String,
}

/// First and last bar date, either for one symbol or the whole store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Date coverage as reported to clients. Both ends are `null` when the store
/// holds no bars at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DataCoverage {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl From<Option<DateRange>> for DataCoverage {
    fn from(range: Option<DateRange>) -> Self {
        Self {
            start_date: range.map(|r| r.start_date),
            end_date: range.map(|r| r.end_date),
        }
    }
}

/// Parse a client-supplied `YYYY-MM-DD` date. Anything else is rejected;
/// nothing is coerced.
pub fn parse_simulated_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| ServiceError::InvalidDateFormat)
}

/// Change and percent change between two closes. Zero when there is no
/// previous close (or it is zero).
pub fn price_change(current: Decimal, previous: Option<Decimal>) -> (Decimal, Decimal) {
    match previous {
        Some(prev) if !prev.is_zero() => {
            let change = current - prev;
            (change, change / prev * Decimal::ONE_HUNDRED)
        }
        _ => (Decimal::ZERO, Decimal::ZERO),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn parses_iso_dates() {
        assert_eq!(
            parse_simulated_date("2020-03-15").unwrap(),
            NaiveDate::from_ymd_opt(2020, 3, 15).unwrap()
        );
    }

    #[test]
    fn rejects_other_formats() {
        assert_eq!(
            parse_simulated_date("15/03/2020"),
            Err(ServiceError::InvalidDateFormat)
        );
        assert_eq!(
            parse_simulated_date("2020-02-30"),
            Err(ServiceError::InvalidDateFormat)
        );
        assert_eq!(parse_simulated_date(""), Err(ServiceError::InvalidDateFormat));
    }

    #[test]
    fn price_change_against_previous_close() {
        let (chg, pct) = price_change(
            Decimal::from_str("110.00").unwrap(),
            Some(Decimal::from_str("100.00").unwrap()),
        );
        assert_eq!(chg, Decimal::from_str("10.00").unwrap());
        assert_eq!(pct, Decimal::from_str("10.00").unwrap());
    }

    #[test]
    fn price_change_percent_keeps_full_precision() {
        let (chg, pct) = price_change(
            Decimal::from_str("1.00").unwrap(),
            Some(Decimal::from_str("3.00").unwrap()),
        );
        assert_eq!(chg, Decimal::from_str("-2.00").unwrap());
        assert!(pct.scale() > 2);
        assert!((pct - Decimal::from_str("-66.6667").unwrap()).abs() < Decimal::from_str("0.0001").unwrap());
    }

    #[test]
    fn price_change_without_previous_is_zero() {
        let (chg, pct) = price_change(Decimal::from_str("42.10").unwrap(), None);
        assert!(chg.is_zero());
        assert!(pct.is_zero());
    }

    #[test]
    fn bar_prices_serialize_as_strings() {
        let bar = Bar {
            date: NaiveDate::from_ymd_opt(2021, 1, 4).unwrap(),
            open: Decimal::from_str("10.50").unwrap(),
            high: Decimal::from_str("11.00").unwrap(),
            low: Decimal::from_str("10.25").unwrap(),
            close: Decimal::from_str("10.75").unwrap(),
            adj_close: Decimal::from_str("10.75").unwrap(),
            volume: 12_345,
        };
        let json = serde_json::to_value(&bar).unwrap();
        assert_eq!(json["date"], "2021-01-04");
        assert_eq!(json["close"], "10.75");
        assert_eq!(json["volume"], 12_345);
    }
}
