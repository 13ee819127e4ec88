// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free calculators over daily close/volume arrays. Every
// calculator returns a vector the same length as its input, aligned index for
// index, with `None` marking positions where the look-back is not yet
// satisfied (or the arithmetic produced a non-finite value). `None` is never
// conflated with 0.0.
//
// Input that is shorter than a calculator's minimum length yields an
// all-`None` output rather than an error.

pub mod ema;
pub mod macd;
pub mod obv;
pub mod rsi;
pub mod sma;
pub mod volatility;
pub mod vpt;

pub use ema::calculate_ema;
pub use macd::{calculate_macd, MacdSeries};
pub use obv::calculate_obv;
pub use rsi::calculate_rsi;
pub use sma::calculate_sma;
pub use volatility::calculate_volatility;
pub use vpt::calculate_vpt;

/// Output of a scalar calculator: one optional value per input position.
pub type Series = Vec<Option<f64>>;

/// All-undefined output of length `len`.
pub(crate) fn undefined(len: usize) -> Series {
    vec![None; len]
}

/// Map non-finite arithmetic results onto the undefined sentinel.
pub(crate) fn finite(value: f64) -> Option<f64> {
    if value.is_finite() {
        Some(value)
    } else {
        None
    }
}

#[cfg(test)]
pub(crate) mod test_util {
    use super::Series;

    /// Number of leading `None` entries.
    pub(crate) fn undefined_prefix(series: &Series) -> usize {
        series.iter().take_while(|v| v.is_none()).count()
    }

    pub(crate) fn assert_close(actual: Option<f64>, expected: f64) {
        let a = actual.unwrap_or_else(|| panic!("expected {expected}, got None"));
        assert!((a - expected).abs() < 1e-10, "got {a}, expected {expected}");
    }
}
