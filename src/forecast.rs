// =============================================================================
// Trend Forecast — least-squares projection of recent closes
// =============================================================================
//
// Fits a straight line to the last `lookback` closes and walks it forward
// from the latest close:
//
//   predicted_i  = max(last_close + slope * i, 0)
//   confidence_i = max(min_confidence, 1 - (i / horizon) * 0.7)
//
// This is a naive extrapolation for display, not a model.
// =============================================================================

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};
use crate::runtime_config::ForecastParams;
use crate::types::Series;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub predicted: f64,
    pub confidence: f64,
}

/// Slope of the least-squares line through `(i, values[i])`.
///
/// `None` with fewer than two values.
pub fn linear_slope(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let n_f = n as f64;
    let mean_x = (n_f - 1.0) / 2.0;
    let mean_y = values.iter().sum::<f64>() / n_f;

    let (mut cov, mut var) = (0.0, 0.0);
    for (i, &y) in values.iter().enumerate() {
        let dx = i as f64 - mean_x;
        cov += dx * (y - mean_y);
        var += dx * dx;
    }
    Some(cov / var)
}

/// Project the trend of `series` `params.horizon` days past its last bar.
pub fn forecast(series: &Series, params: &ForecastParams) -> Result<Vec<ForecastPoint>> {
    if params.horizon == 0 {
        return Ok(Vec::new());
    }

    let closes = series.closes();
    let start = closes.len().saturating_sub(params.lookback.max(2));
    let slope = linear_slope(&closes[start..]).ok_or(AnalysisError::InsufficientHistory {
        required: 2,
        actual: closes.len(),
    })?;

    let last = series.latest();
    let horizon = params.horizon as f64;

    (1..=params.horizon)
        .map(|i| {
            let date = last
                .date
                .checked_add_days(Days::new(i as u64))
                .ok_or_else(|| AnalysisError::invalid("forecast date out of range"))?;
            let predicted = (last.close + slope * i as f64).max(0.0);
            let confidence = (1.0 - (i as f64 / horizon) * 0.7).max(params.min_confidence);
            Ok(ForecastPoint {
                date,
                predicted,
                confidence,
            })
        })
        .collect()
}
