// =============================================================================
// Relative Strength Index (RSI) — Simple Rolling Mean
// =============================================================================
//
// Step 1: Price changes: delta_0 = 0, delta_t = close_t - close_{t-1}.
// Step 2: Split into gains (delta > 0) and losses (|delta| for delta < 0).
// Step 3: avg_gain / avg_loss = plain mean of the trailing `period` gains /
//          losses. This is NOT Wilder's exponential smoothing.
// Step 4: RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS)
//
// The first position carries no change and counts as a zero gain and a zero
// loss, so the first defined RSI sits at index `period - 1`.
//
// Edge cases at a single position:
//   avg_loss == 0, avg_gain > 0  => RS is infinite, RSI = 100
//   avg_loss == 0, avg_gain == 0 => 0/0, undefined
// =============================================================================

use super::{finite, undefined, Series};

/// Compute the RSI series for `closes` with look-back `period`.
///
/// Requires at least `period + 1` closes; shorter input is all `None`.
pub fn calculate_rsi(closes: &[f64], period: usize) -> Series {
    if period == 0 || closes.len() < period + 1 {
        return undefined(closes.len());
    }

    // --- Gains / losses per position (position 0 has no change) -------------
    let mut gains = Vec::with_capacity(closes.len());
    let mut losses = Vec::with_capacity(closes.len());
    gains.push(0.0);
    losses.push(0.0);
    for w in closes.windows(2) {
        let delta = w[1] - w[0];
        gains.push(if delta > 0.0 { delta } else { 0.0 });
        losses.push(if delta < 0.0 { -delta } else { 0.0 });
    }

    // --- Rolling means over the trailing window ------------------------------
    let period_f = period as f64;
    let mut result = undefined(closes.len());
    for i in (period - 1)..closes.len() {
        let start = i + 1 - period;
        let avg_gain = gains[start..=i].iter().sum::<f64>() / period_f;
        let avg_loss = losses[start..=i].iter().sum::<f64>() / period_f;
        result[i] = rsi_from_averages(avg_gain, avg_loss);
    }

    result
}

/// Convert average gain / average loss into an RSI value in [0, 100].
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    if avg_loss == 0.0 {
        if avg_gain > 0.0 {
            return Some(100.0);
        }
        return None;
    }
    let rs = avg_gain / avg_loss;
    finite(100.0 - 100.0 / (1.0 + rs))
}
