// =============================================================================
// Moving Average Convergence Divergence (MACD)
// =============================================================================
//
//   MACD line = EMA(fast) - EMA(slow)          where both are defined
//   Signal    = EMA(signal) of the MACD line   computed over the defined
//                                              line values only, then mapped
//                                              back onto the date axis
//   Histogram = MACD line - Signal             where both are defined
//
// With the usual fast < slow the line is defined from index `slow - 1` and
// the signal from `slow + signal - 2`.
// =============================================================================

use super::{calculate_ema, finite, undefined, Series};

/// The three MACD series, each aligned with the input.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdSeries {
    pub macd: Series,
    pub signal: Series,
    pub histogram: Series,
}

impl MacdSeries {
    fn undefined(len: usize) -> Self {
        Self {
            macd: undefined(len),
            signal: undefined(len),
            histogram: undefined(len),
        }
    }
}

/// Compute MACD line, signal and histogram for `closes`.
///
/// Fewer than `slow_period` closes yields all three series undefined.
pub fn calculate_macd(
    closes: &[f64],
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
) -> MacdSeries {
    let len = closes.len();
    if slow_period == 0 || len < slow_period {
        return MacdSeries::undefined(len);
    }

    let ema_fast = calculate_ema(closes, fast_period);
    let ema_slow = calculate_ema(closes, slow_period);

    let macd: Series = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(fast, slow)| match (fast, slow) {
            (Some(f), Some(s)) => finite(f - s),
            _ => None,
        })
        .collect();

    // Signal runs over the compacted line, then each value goes back to the
    // position its input came from.
    let (positions, compact): (Vec<usize>, Vec<f64>) = macd
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|v| (i, v)))
        .unzip();

    let mut signal = undefined(len);
    if signal_period > 0 && compact.len() >= signal_period {
        let compact_signal = calculate_ema(&compact, signal_period);
        for (pos, value) in positions.into_iter().zip(compact_signal) {
            signal[pos] = value;
        }
    }

    let histogram: Series = macd
        .iter()
        .zip(&signal)
        .map(|(line, sig)| match (line, sig) {
            (Some(l), Some(s)) => finite(l - s),
            _ => None,
        })
        .collect();

    MacdSeries {
        macd,
        signal,
        histogram,
    }
}
