// =============================================================================
// Indicator Engine — OHLCV bars in, indicator-augmented rows out
// =============================================================================

use serde::{Deserialize, Serialize};

use super::macd::calculate_macd;
use super::rsi::calculate_rsi;
use super::sma::calculate_sma;
use crate::error::{AnalysisError, Result};
use crate::runtime_config::IndicatorParams;
use crate::types::{PricePoint, Series};

/// A price bar together with every indicator computed at that date.
///
/// A column is `None` until its window has enough history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRow {
    #[serde(flatten)]
    pub point: PricePoint,
    pub sma20: Option<f64>,
    pub sma50: Option<f64>,
    pub rsi14: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_histogram: Option<f64>,
}

impl IndicatorRow {
    /// True when every column the scorer reads is defined.
    pub fn is_complete(&self) -> bool {
        self.sma20.is_some()
            && self.sma50.is_some()
            && self.rsi14.is_some()
            && self.macd.is_some()
            && self.macd_signal.is_some()
    }
}

#[derive(Debug, Clone, Default)]
pub struct IndicatorEngine {
    params: IndicatorParams,
}

impl IndicatorEngine {
    pub fn new(params: IndicatorParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &IndicatorParams {
        &self.params
    }

    /// Compute one row per input point, in input order.
    ///
    /// The `sma20`/`sma50`/`rsi14` columns use the configured short/long/RSI
    /// windows, whatever their actual lengths.
    pub fn compute(&self, points: &[PricePoint]) -> Result<Vec<IndicatorRow>> {
        if points.is_empty() {
            return Err(AnalysisError::invalid("cannot compute indicators on an empty series"));
        }
        self.params.validate()?;

        let p = &self.params;
        let closes: Vec<f64> = points.iter().map(|pt| pt.close).collect();

        let sma_short = calculate_sma(&closes, p.sma_short);
        let sma_long = calculate_sma(&closes, p.sma_long);
        let rsi = calculate_rsi(&closes, p.rsi_period);
        let macd = calculate_macd(&closes, p.macd_fast, p.macd_slow, p.macd_signal);

        let rows = points
            .iter()
            .enumerate()
            .map(|(i, point)| IndicatorRow {
                point: point.clone(),
                sma20: sma_short[i],
                sma50: sma_long[i],
                rsi14: rsi[i],
                macd: macd.macd.get(i).copied(),
                macd_signal: macd.signal.get(i).copied(),
                macd_histogram: macd.histogram.get(i).copied(),
            })
            .collect();

        Ok(rows)
    }

    pub fn compute_series(&self, series: &Series) -> Result<Vec<IndicatorRow>> {
        self.compute(series.points())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::SeriesGenerator;
    use chrono::NaiveDate;

    fn series(days: usize) -> Series {
        SeriesGenerator::default()
            .generate_as_of("AAPL", days, 178.25, NaiveDate::from_ymd_opt(2024, 6, 30).unwrap())
            .unwrap()
    }

    #[test]
    fn empty_input_is_invalid() {
        let engine = IndicatorEngine::default();
        assert!(matches!(
            engine.compute(&[]),
            Err(AnalysisError::InvalidInput(_))
        ));
    }

    #[test]
    fn one_row_per_point_in_order() {
        let s = series(120);
        let rows = IndicatorEngine::default().compute_series(&s).unwrap();
        assert_eq!(rows.len(), 120);
        for (row, point) in rows.iter().zip(s.points()) {
            assert_eq!(&row.point, point);
        }
    }

    #[test]
    fn warmup_gaps_follow_windows() {
        let rows = IndicatorEngine::default().compute_series(&series(120)).unwrap();
        assert!(rows[..19].iter().all(|r| r.sma20.is_none()));
        assert!(rows[19..].iter().all(|r| r.sma20.is_some()));
        assert!(rows[..49].iter().all(|r| r.sma50.is_none()));
        assert!(rows[49..].iter().all(|r| r.sma50.is_some()));
        assert!(rows[..14].iter().all(|r| r.rsi14.is_none()));
        assert!(rows[14..].iter().all(|r| r.rsi14.is_some()));
        assert!(rows.iter().all(|r| r.macd.is_some() && r.macd_signal.is_some()));
        assert!(!rows[48].is_complete());
        assert!(rows[49].is_complete());
    }

    #[test]
    fn sma20_is_exact_trailing_mean() {
        let s = series(90);
        let rows = IndicatorEngine::default().compute_series(&s).unwrap();
        let closes = s.closes();
        for i in 19..rows.len() {
            let expected = closes[i - 19..=i].iter().sum::<f64>() / 20.0;
            assert!((rows[i].sma20.unwrap() - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn rsi_bounds_and_macd_identity() {
        for sym in ["AAPL", "MSFT", "GOOGL", "TSLA", "AMZN"] {
            let s = SeriesGenerator::default()
                .generate_as_of(sym, 365, 150.0, NaiveDate::from_ymd_opt(2024, 6, 30).unwrap())
                .unwrap();
            let rows = IndicatorEngine::default().compute_series(&s).unwrap();
            for row in &rows {
                if let Some(rsi) = row.rsi14 {
                    assert!((0.0..=100.0).contains(&rsi));
                }
                let (m, sig, h) = (
                    row.macd.unwrap(),
                    row.macd_signal.unwrap(),
                    row.macd_histogram.unwrap(),
                );
                assert_eq!(h, m - sig);
                assert!(m.is_finite() && sig.is_finite());
            }
        }
    }

    #[test]
    fn single_point_series() {
        let rows = IndicatorEngine::default().compute_series(&series(1)).unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].rsi14.is_none());
        assert!(rows[0].sma20.is_none());
        assert_eq!(rows[0].macd, Some(0.0));
    }

    #[test]
    fn alternate_windows() {
        let params = IndicatorParams {
            sma_short: 3,
            sma_long: 5,
            rsi_period: 4,
            macd_fast: 2,
            macd_slow: 4,
            macd_signal: 2,
        };
        let rows = IndicatorEngine::new(params).compute_series(&series(10)).unwrap();
        assert!(rows[1].sma20.is_none());
        assert!(rows[2].sma20.is_some());
        assert!(rows[4].sma50.is_some());
        assert!(rows[3].rsi14.is_none());
        assert!(rows[4].rsi14.is_some());
    }

    #[test]
    fn invalid_params_are_rejected() {
        let params = IndicatorParams {
            sma_short: 0,
            ..IndicatorParams::default()
        };
        assert!(IndicatorEngine::new(params).compute_series(&series(10)).is_err());
    }

    #[test]
    fn row_serialises_flat() {
        let rows = IndicatorEngine::default().compute_series(&series(60)).unwrap();
        let json = serde_json::to_value(rows.last().unwrap()).unwrap();
        assert!(json["close"].is_number());
        assert!(json["sma50"].is_number());
        let first = serde_json::to_value(&rows[0]).unwrap();
        assert!(first["sma20"].is_null());
    }
}
