// =============================================================================
// Relative Strength Index (RSI) — simple rolling averages
// =============================================================================
//
// RSI measures the speed and magnitude of recent price changes to evaluate
// whether an asset is overbought or oversold.
//
// Step 1 — delta_t = close_t - close_{t-1}
// Step 2 — gain = max(delta, 0), loss = max(-delta, 0)
// Step 3 — avg_gain / avg_loss = plain means over the trailing `period`
//          deltas (not Wilder's exponential smoothing)
// Step 4 — RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS)
//
// A window with no losses saturates at exactly 100.
// =============================================================================

use super::sma::RollingWindow;

/// Compute the RSI column for `closes`, aligned with the input.
///
/// Index 0 has no delta; the first defined value is at index `period`.
/// Defined values always lie in `[0, 100]`.
pub fn calculate_rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut result = Vec::with_capacity(closes.len());
    if closes.is_empty() {
        return result;
    }
    result.push(None);

    let mut gains = RollingWindow::new(period);
    let mut losses = RollingWindow::new(period);

    for pair in closes.windows(2) {
        let delta = pair[1] - pair[0];
        gains.push(delta.max(0.0));
        losses.push((-delta).max(0.0));

        let rsi = match (gains.mean(), losses.mean()) {
            (Some(avg_gain), Some(avg_loss)) => Some(rsi_from_averages(
                avg_gain,
                avg_loss,
                losses.all_zero(),
            )),
            _ => None,
        };
        result.push(rsi);
    }

    result
}

// =============================================================================
// Internal helpers
// =============================================================================

/// Convert average gain / average loss into an RSI value in [0, 100].
///
/// `no_losses` short-circuits to 100 so that an exactly-zero loss window
/// never reaches the division.
fn rsi_from_averages(avg_gain: f64, avg_loss: f64, no_losses: bool) -> f64 {
    if no_losses || avg_loss <= 0.0 {
        return 100.0;
    }
    let rs = avg_gain.max(0.0) / avg_loss;
    (100.0 - 100.0 / (1.0 + rs)).clamp(0.0, 100.0)
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rsi_empty_input() {
        assert!(calculate_rsi(&[], 14).is_empty());
    }

    #[test]
    fn rsi_single_point() {
        assert_eq!(calculate_rsi(&[10.0], 14), vec![None]);
    }

    #[test]
    fn rsi_warmup_alignment() {
        let closes: Vec<f64> = (1..=20).map(|x| (x as f64).sin() + 10.0).collect();
        let rsi = calculate_rsi(&closes, 14);
        assert_eq!(rsi.len(), 20);
        assert!(rsi[..14].iter().all(Option::is_none));
        assert!(rsi[14..].iter().all(Option::is_some));
    }

    #[test]
    fn rsi_all_gains_is_exactly_100() {
        let closes: Vec<f64> = (1..=30).map(|x| x as f64).collect();
        for v in calculate_rsi(&closes, 14).into_iter().flatten() {
            assert_eq!(v, 100.0);
        }
    }

    #[test]
    fn rsi_flat_market_is_100() {
        // No losses at all => avg_loss == 0 => saturates.
        let closes = vec![100.0; 30];
        for v in calculate_rsi(&closes, 14).into_iter().flatten() {
            assert_eq!(v, 100.0);
        }
    }

    #[test]
    fn rsi_all_losses_is_zero() {
        let closes: Vec<f64> = (1..=30).rev().map(|x| x as f64).collect();
        for v in calculate_rsi(&closes, 14).into_iter().flatten() {
            assert!(v.abs() < 1e-12, "expected 0, got {v}");
        }
    }

    #[test]
    fn rsi_recovers_100_after_losses_leave_window() {
        // A drop early on, then 20 straight gains: once the drop leaves the
        // 14-delta window the reading must be exactly 100, not 99.999...
        let mut closes = vec![50.0, 49.37];
        for i in 1..=20 {
            closes.push(49.37 + i as f64 * 0.13);
        }
        let rsi = calculate_rsi(&closes, 14);
        assert!(rsi[14].unwrap() < 100.0);
        assert_eq!(rsi[15], Some(100.0));
        assert_eq!(*rsi.last().unwrap(), Some(100.0));
    }

    #[test]
    fn rsi_matches_direct_computation() {
        let closes = vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08,
            45.89, 46.03, 44.18, 44.22, 44.57, 43.42, 42.66, 43.13,
        ];
        let rsi = calculate_rsi(&closes, 14);
        for i in 14..closes.len() {
            let (mut g, mut l) = (0.0, 0.0);
            for j in (i - 13)..=i {
                let d: f64 = closes[j] - closes[j - 1];
                g += d.max(0.0);
                l += (-d).max(0.0);
            }
            let expected = 100.0 - 100.0 / (1.0 + (g / 14.0) / (l / 14.0));
            assert!((rsi[i].unwrap() - expected).abs() < 1e-9);
            assert!((0.0..=100.0).contains(&rsi[i].unwrap()));
        }
    }
}
