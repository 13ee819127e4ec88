// =============================================================================
// Simple Moving Average (SMA)
// =============================================================================
//
//   SMA_t = (close_{t-period+1} + ... + close_t) / period
//
// Each window is summed directly so results do not drift over long series.

use super::{finite, undefined, Series};

/// Arithmetic mean of the trailing `period` values at every position.
///
/// The first `period - 1` positions are `None`; input shorter than `period`
/// (or `period == 0`) is all `None`.
pub fn calculate_sma(values: &[f64], period: usize) -> Series {
    if period == 0 || values.len() < period {
        return undefined(values.len());
    }

    let mut result = undefined(values.len());
    for i in (period - 1)..values.len() {
        let window = &values[i + 1 - period..=i];
        let sum: f64 = window.iter().sum();
        result[i] = finite(sum / period as f64);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::test_util::{assert_close, undefined_prefix};

    #[test]
    fn sma_three_over_one_to_five() {
        let sma = calculate_sma(&[1.0, 2.0, 3.0, 4.0, 5.0], 3);
        assert_eq!(sma[0], None);
        assert_eq!(sma[1], None);
        assert_close(sma[2], 2.0);
        assert_close(sma[3], 3.0);
        assert_close(sma[4], 4.0);
    }

    #[test]
    fn sma_insufficient_data() {
        assert_eq!(calculate_sma(&[1.0, 2.0], 3), vec![None, None]);
        assert!(calculate_sma(&[], 3).is_empty());
    }

    #[test]
    fn sma_period_zero() {
        assert_eq!(calculate_sma(&[1.0, 2.0], 0), vec![None, None]);
    }

    #[test]
    fn sma_prefix_matches_period() {
        let closes: Vec<f64> = (0..50).map(|i| (i as f64).sin() + 10.0).collect();
        for period in [1, 2, 5, 20, 50] {
            let sma = calculate_sma(&closes, period);
            assert_eq!(sma.len(), closes.len());
            assert_eq!(undefined_prefix(&sma), period - 1);
        }
    }

    #[test]
    fn sma_nan_input_is_undefined_only_in_its_windows() {
        let sma = calculate_sma(&[1.0, f64::NAN, 3.0, 4.0, 5.0], 2);
        assert_eq!(sma[1], None);
        assert_eq!(sma[2], None);
        assert_close(sma[3], 3.5);
    }
}
