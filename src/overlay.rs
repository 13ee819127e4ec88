// =============================================================================
// Chart Overlay Scaling
// =============================================================================
//
// Optional presentation transform applied after assembly: maps indicator
// values onto the price axis so a chart can draw them over the candles.
//
//   scaled = price_min + (value - lo) / (hi - lo) * (price_max - price_min)
//
// `lo`/`hi` are either the observed min/max of the assembled values or a
// fixed range (RSI uses 0..100). A flat observed range is treated as width 1.
// The raw `value` is never modified.

use crate::assembler::IndicatorPoint;

/// Source of the indicator-side range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OverlayRange {
    /// Min/max of the assembled values.
    Observed,
    /// A known bounded scale, e.g. 0..100 for RSI.
    Fixed { lo: f64, hi: f64 },
}

/// Fill `scaled` on every point. `closes` is the window's close series.
/// Does nothing if there are no closes or no points.
pub fn scale_onto_price_axis(points: &mut [IndicatorPoint], closes: &[f64], range: OverlayRange) {
    let Some((price_min, price_max)) = min_max(closes.iter().copied()) else {
        return;
    };
    let Some((lo, hi)) = (match range {
        OverlayRange::Observed => min_max(points.iter().map(|p| p.value)),
        OverlayRange::Fixed { lo, hi } => Some((lo, hi)),
    }) else {
        return;
    };

    let width = if hi != lo { hi - lo } else { 1.0 };
    let price_range = price_max - price_min;

    for point in points.iter_mut() {
        point.scaled = Some(price_min + (point.value - lo) / width * price_range);
    }
}

fn min_max(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}
