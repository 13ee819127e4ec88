// =============================================================================
// On Balance Volume (OBV)
// =============================================================================
//
//   OBV_0 = 0
//   OBV_t = OBV_{t-1} + volume_t   if close_t > close_{t-1}
//         = OBV_{t-1} - volume_t   if close_t < close_{t-1}
//         = OBV_{t-1}              otherwise

use super::{undefined, Series};

/// Cumulative on-balance volume. Needs at least two points and equal-length
/// inputs; otherwise all `None`.
pub fn calculate_obv(closes: &[f64], volumes: &[f64]) -> Series {
    if closes.len() != volumes.len() || closes.len() < 2 {
        return undefined(closes.len());
    }

    let mut result = Vec::with_capacity(closes.len());
    let mut obv = 0.0;
    result.push(Some(obv));

    for i in 1..closes.len() {
        if closes[i] > closes[i - 1] {
            obv += volumes[i];
        } else if closes[i] < closes[i - 1] {
            obv -= volumes[i];
        }
        result.push(Some(obv));
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn obv_reference_scenario() {
        let closes = [100.0, 102.0, 101.0, 103.0, 102.0];
        let volumes = [1000.0, 1200.0, 800.0, 1500.0, 900.0];
        let obv = calculate_obv(&closes, &volumes);
        assert_eq!(
            obv,
            vec![Some(0.0), Some(1200.0), Some(400.0), Some(1900.0), Some(1000.0)]
        );
    }

    #[test]
    fn obv_unchanged_close_holds() {
        let obv = calculate_obv(&[5.0, 5.0, 5.0], &[10.0, 20.0, 30.0]);
        assert_eq!(obv, vec![Some(0.0); 3]);
    }

    #[test]
    fn obv_steps_follow_sign_of_change() {
        let closes = [10.0, 11.0, 9.0, 9.0, 12.0, 8.0];
        let volumes = [7.0, 3.0, 4.0, 5.0, 6.0, 2.0];
        let obv = calculate_obv(&closes, &volumes);
        assert_eq!(obv[0], Some(0.0));
        for i in 1..closes.len() {
            let step = obv[i].unwrap() - obv[i - 1].unwrap();
            let expected = if closes[i] > closes[i - 1] {
                volumes[i]
            } else if closes[i] < closes[i - 1] {
                -volumes[i]
            } else {
                0.0
            };
            assert_eq!(step, expected, "step at {i}");
        }
    }

    #[test]
    fn obv_needs_two_points() {
        assert_eq!(calculate_obv(&[1.0], &[100.0]), vec![None]);
        assert!(calculate_obv(&[], &[]).is_empty());
    }

    #[test]
    fn obv_mismatched_lengths() {
        assert_eq!(calculate_obv(&[1.0, 2.0, 3.0], &[1.0, 2.0]), vec![None; 3]);
    }
}
