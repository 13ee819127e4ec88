// =============================================================================
// Series Extractor
// =============================================================================
//
// Turns an ascending run of bars into the parallel numeric arrays the
// calculators work on. Index `i` of every array refers to `bars[i]`.

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;

use crate::error::{Result, ServiceError};
use crate::types::Bar;

/// Date axis plus close/volume arrays, index-aligned.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    pub dates: Vec<NaiveDate>,
    pub closes: Vec<f64>,
    pub volumes: Vec<f64>,
}

impl PriceSeries {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Extract closes and volumes from `bars` (already ordered ascending by date).
///
/// Fails with `NoData` when `bars` is empty.
pub fn extract(bars: &[Bar]) -> Result<PriceSeries> {
    if bars.is_empty() {
        return Err(ServiceError::NoData);
    }

    let mut dates = Vec::with_capacity(bars.len());
    let mut closes = Vec::with_capacity(bars.len());
    let mut volumes = Vec::with_capacity(bars.len());

    for bar in bars {
        dates.push(bar.date);
        // Two-digit decimals always fit in an f64; NaN would only surface as
        // undefined indicator values downstream.
        closes.push(bar.close.to_f64().unwrap_or(f64::NAN));
        volumes.push(bar.volume as f64);
    }

    Ok(PriceSeries {
        dates,
        closes,
        volumes,
    })
}
