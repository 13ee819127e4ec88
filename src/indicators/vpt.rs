// =============================================================================
// Volume Price Trend (VPT)
// =============================================================================
//
//   VPT_0 = 0
//   VPT_t = VPT_{t-1} + volume_t * (close_t - close_{t-1}) / close_{t-1}
//
// A zero previous close holds VPT unchanged instead of dividing by zero.

use super::{finite, undefined, Series};

/// Cumulative volume price trend. Needs at least two points and equal-length
/// inputs; otherwise all `None`.
pub fn calculate_vpt(closes: &[f64], volumes: &[f64]) -> Series {
    if closes.len() != volumes.len() || closes.len() < 2 {
        return undefined(closes.len());
    }

    let mut result = Vec::with_capacity(closes.len());
    let mut vpt = 0.0;
    result.push(Some(vpt));

    for i in 1..closes.len() {
        let prev = closes[i - 1];
        if prev != 0.0 {
            vpt += volumes[i] * (closes[i] - prev) / prev;
        }
        result.push(finite(vpt));
    }

    result
}
