// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
// EMA gives more weight to recent prices, making it more responsive to new
// information than the Simple Moving Average (SMA).
//
// Formula:
//   multiplier = 2 / (period + 1)
//   EMA_0      = close_0
//   EMA_t      = close_t * multiplier + EMA_{t-1} * (1 - multiplier)
//
// The recursion starts at the very first close; there is no SMA seed. Values
// before index `period - 1` are still computed (they feed the recursion) but
// reported as undefined.
// =============================================================================

use super::{finite, undefined, Series};

/// Compute the EMA series for `values` with look-back `period`.
///
/// # Edge cases
/// - `period == 0` => all `None`
/// - `values.len() < period` => all `None`
/// - The first `period - 1` positions are always `None`.
pub fn calculate_ema(values: &[f64], period: usize) -> Series {
    if period == 0 || values.len() < period {
        return undefined(values.len());
    }

    let multiplier = 2.0 / (period + 1) as f64;

    let mut result = Vec::with_capacity(values.len());
    let mut prev_ema = values[0];
    for (i, &value) in values.iter().enumerate() {
        let ema = if i == 0 {
            value
        } else {
            value * multiplier + prev_ema * (1.0 - multiplier)
        };
        prev_ema = ema;

        if i + 1 < period {
            result.push(None);
        } else {
            result.push(finite(ema));
        }
    }

    result
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::test_util::{assert_close, undefined_prefix};

    fn ascending(n: usize) -> Vec<f64> {
        (1..=n).map(|i| i as f64).collect()
    }

    #[test]
    fn ema_empty_input() {
        assert!(calculate_ema(&[], 5).is_empty());
    }

    #[test]
    fn ema_period_zero() {
        assert_eq!(calculate_ema(&[1.0, 2.0, 3.0], 0), vec![None; 3]);
    }

    #[test]
    fn ema_insufficient_data() {
        assert_eq!(calculate_ema(&[1.0, 2.0], 5), vec![None, None]);
    }

    #[test]
    fn ema_period_equals_length() {
        // multiplier = 0.5: 2 -> 3 -> 4.5, no SMA seed.
        let ema = calculate_ema(&[2.0, 4.0, 6.0], 3);
        assert_eq!(ema.len(), 3);
        assert_eq!(ema[0], None);
        assert_eq!(ema[1], None);
        assert_close(ema[2], 4.5);
    }

    #[test]
    fn ema_known_values() {
        let closes = ascending(10);
        let ema = calculate_ema(&closes, 5);
        assert_eq!(ema.len(), 10);

        let mult = 2.0 / 6.0;
        let mut expected = closes[0];
        for (i, &c) in closes.iter().enumerate().skip(1) {
            expected = c * mult + expected * (1.0 - mult);
            if i >= 4 {
                assert_close(ema[i], expected);
            }
        }
    }

    #[test]
    fn ema_undefined_prefix_is_period_minus_one() {
        for period in 1..=12 {
            let ema = calculate_ema(&ascending(30), period);
            assert_eq!(undefined_prefix(&ema), period - 1, "period {period}");
            assert!(ema[period - 1..].iter().all(Option::is_some));
        }
    }

    #[test]
    fn ema_period_one_tracks_input() {
        let closes = vec![3.0, 1.0, 4.0, 1.0, 5.0];
        let ema = calculate_ema(&closes, 1);
        for (v, c) in ema.iter().zip(&closes) {
            assert_close(*v, *c);
        }
    }

    #[test]
    fn ema_flat_series_is_flat() {
        let ema = calculate_ema(&[100.0; 40], 20);
        for v in &ema[19..] {
            assert_close(*v, 100.0);
        }
    }
}
