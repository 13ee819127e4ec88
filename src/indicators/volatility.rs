// =============================================================================
// Historical Volatility (VIX-like)
// =============================================================================
//
//   return_t     = (close_t - close_{t-1}) / close_{t-1}
//   volatility_t = stddev(return_{t-period+1} .. return_t) * sqrt(252) * 100
//
// Sample standard deviation (n - 1 denominator), annualised over 252 trading
// days and expressed in percent. Position 0 has no return, so the first
// defined value is at index `period`.
// =============================================================================

use super::{finite, undefined, Series};

/// Trading days per year used for annualisation.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Rolling annualised volatility of daily percentage returns.
///
/// Requires at least `period + 1` closes. A zero previous close produces a
/// non-finite return, which leaves every window containing it undefined.
pub fn calculate_volatility(closes: &[f64], period: usize) -> Series {
    if period == 0 || closes.len() < period + 1 {
        return undefined(closes.len());
    }

    // returns[k] is the return at close index k + 1.
    let returns: Vec<f64> = closes.windows(2).map(|w| (w[1] - w[0]) / w[0]).collect();
    let annualise = TRADING_DAYS_PER_YEAR.sqrt() * 100.0;

    let mut result = undefined(closes.len());
    for i in period..closes.len() {
        let window = &returns[i - period..i];
        result[i] = sample_std_dev(window).and_then(|sd| finite(sd * annualise));
    }

    result
}

/// Sample standard deviation; `None` for fewer than two values or non-finite
/// input.
fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    finite(variance.sqrt())
}
