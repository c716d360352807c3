// =============================================================================
// Key Metrics — whole-period statistics of a series
// =============================================================================
//
//   daily change  r_i = close_i / close_{i-1} - 1
//   volatility        = stdev(r) * sqrt(252) * 100     (sample stdev, n - 1)
//   period return     = (close_last / close_first - 1) * 100
//   average volume    = mean(volume)
//
// Volatility needs at least two daily changes, the return at least two
// closes.  Closes are strictly positive in every `Series`, so the ratios are
// always defined.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::types::Series;

/// Trading days per year used to annualise daily volatility.
const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyMetrics {
    /// Annualised volatility of daily changes, in percent.
    pub annual_volatility_pct: Option<f64>,
    /// Change from the first to the last close, in percent.
    pub period_return_pct: Option<f64>,
    pub avg_volume: f64,
}

impl KeyMetrics {
    pub fn from_series(series: &Series) -> Self {
        let closes = series.closes();
        let changes: Vec<f64> = closes.windows(2).map(|w| w[1] / w[0] - 1.0).collect();

        let annual_volatility_pct =
            sample_std_dev(&changes).map(|sd| sd * TRADING_DAYS_PER_YEAR.sqrt() * 100.0);

        let period_return_pct = match (closes.first(), closes.last()) {
            (Some(&first), Some(&last)) if closes.len() >= 2 => Some((last / first - 1.0) * 100.0),
            _ => None,
        };

        let points = series.points();
        let avg_volume =
            points.iter().map(|p| p.volume as f64).sum::<f64>() / points.len().max(1) as f64;

        Self {
            annual_volatility_pct,
            period_return_pct,
            avg_volume,
        }
    }
}

/// Standard deviation with Bessel's correction; `None` below two values.
fn sample_std_dev(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    Some(var.sqrt())
}
