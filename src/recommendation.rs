// =============================================================================
// Recommendation Engine — indicator state to BUY / SELL / HOLD
// =============================================================================
//
// Reads only the latest indicator row plus a short trailing volume window.
//
// Pipeline (every rule is independent, applied in this order):
//   1. RSI        < oversold  => +rsi_weight   | > overbought => -rsi_weight
//   2. Trend      close > sma20 > sma50 => +trend_weight
//                 close < sma20 < sma50 => -trend_weight
//   3. Momentum   macd > signal => +momentum_weight, else -momentum_weight
//   4. Volume     latest > mean(last N volumes) * multiplier => +volume_weight
//   5. Decide     score >= buy_threshold  => BUY  (target close * 1.15)
//                 score <= sell_threshold => SELL (target close * 0.85)
//                 otherwise               => HOLD (target close)
//
// The score is not clamped.
// =============================================================================

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AnalysisError, Result};
use crate::indicators::IndicatorRow;
use crate::market_data::RangeContext;
use crate::runtime_config::{IndicatorParams, ScoringParams};
use crate::types::{Action, ReferenceMetrics, RiskLevel};

// =============================================================================
// Recommendation
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub action: Action,
    pub score: i32,
    pub target_price: f64,
    pub risk_level: RiskLevel,
    /// One entry per triggered rule, in rule order.
    pub reasons: Vec<String>,
    /// Latest close's position inside the 52-week band.  Informational only;
    /// it never feeds the score.
    pub range_position: Option<f64>,
}

// =============================================================================
// Recommendation Engine
// =============================================================================

#[derive(Debug, Clone)]
pub struct RecommendationEngine {
    params: ScoringParams,
    required_history: usize,
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self::new(ScoringParams::default(), &IndicatorParams::default())
    }
}

impl RecommendationEngine {
    /// `indicators` must be the params the rows were computed with; it fixes
    /// how much history the engine insists on.
    pub fn new(params: ScoringParams, indicators: &IndicatorParams) -> Self {
        Self {
            params,
            required_history: indicators.required_history(),
        }
    }

    pub fn required_history(&self) -> usize {
        self.required_history
    }

    /// Score the latest row of `rows`.
    pub fn evaluate(&self, rows: &[IndicatorRow], metrics: &ReferenceMetrics) -> Result<Recommendation> {
        self.params.validate()?;

        let latest = rows
            .last()
            .ok_or_else(|| AnalysisError::invalid("cannot evaluate an empty series"))?;

        if rows.len() < self.required_history {
            return Err(AnalysisError::InsufficientHistory {
                required: self.required_history,
                actual: rows.len(),
            });
        }

        let (Some(sma20), Some(sma50), Some(rsi), Some(macd), Some(signal)) = (
            latest.sma20,
            latest.sma50,
            latest.rsi14,
            latest.macd,
            latest.macd_signal,
        ) else {
            return Err(AnalysisError::invalid(format!(
                "latest row ({}) is missing indicator values",
                latest.point.date
            )));
        };

        let p = &self.params;
        let close = latest.point.close;
        let mut score = p.base_score;
        let mut reasons = Vec::new();

        // ── 1. RSI ───────────────────────────────────────────────────────
        if rsi < p.rsi_oversold {
            score += p.rsi_weight;
            reasons.push("RSI indicates oversold conditions (bullish)".to_string());
        } else if rsi > p.rsi_overbought {
            score -= p.rsi_weight;
            reasons.push("RSI indicates overbought conditions (bearish)".to_string());
        }

        // ── 2. Moving-average trend ──────────────────────────────────────
        if close > sma20 && sma20 > sma50 {
            score += p.trend_weight;
            reasons.push("Price above both moving averages (bullish trend)".to_string());
        } else if close < sma20 && sma20 < sma50 {
            score -= p.trend_weight;
            reasons.push("Price below both moving averages (bearish trend)".to_string());
        }

        // ── 3. MACD momentum ─────────────────────────────────────────────
        if macd > signal {
            score += p.momentum_weight;
            reasons.push("MACD above signal line (bullish momentum)".to_string());
        } else {
            score -= p.momentum_weight;
            reasons.push("MACD below signal line (bearish momentum)".to_string());
        }

        // ── 4. Volume ────────────────────────────────────────────────────
        let window = &rows[rows.len().saturating_sub(p.volume_window)..];
        let avg_volume =
            window.iter().map(|r| r.point.volume as f64).sum::<f64>() / window.len() as f64;
        let latest_volume = latest.point.volume as f64;
        if latest_volume > avg_volume * p.volume_multiplier {
            score += p.volume_weight;
            reasons.push("Above average trading volume".to_string());
        }

        // ── 5. Decision ──────────────────────────────────────────────────
        let (action, target_price, risk_level) = if score >= p.buy_threshold {
            let risk = if rsi > p.buy_risk_rsi {
                RiskLevel::Medium
            } else {
                RiskLevel::Low
            };
            (Action::Buy, close * p.buy_target_factor, risk)
        } else if score <= p.sell_threshold {
            let risk = if rsi < p.sell_risk_rsi {
                RiskLevel::High
            } else {
                RiskLevel::Medium
            };
            (Action::Sell, close * p.sell_target_factor, risk)
        } else {
            (Action::Hold, close, RiskLevel::Medium)
        };

        let range_position = RangeContext::from_metrics(close, metrics).position;

        debug!(
            date = %latest.point.date,
            score,
            action = %action,
            risk = %risk_level,
            rsi,
            close,
            target_price,
            pe_ratio = metrics.pe_ratio,
            "recommendation scored"
        );

        Ok(Recommendation {
            action,
            score,
            target_price,
            risk_level,
            reasons,
            range_position,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::IndicatorEngine;
    use crate::market_data::{ReferenceSource, ReferenceTable, SeriesGenerator};
    use crate::types::PricePoint;
    use chrono::{Days, NaiveDate};

    const NORMAL_VOLUME: u64 = 20_000_000;

    fn metrics() -> ReferenceMetrics {
        ReferenceTable::demo().lookup("AAPL").unwrap().metrics
    }

    /// 50 quiet rows followed by a latest row with the given indicator state.
    fn rows_with_latest(
        close: f64,
        sma20: f64,
        sma50: f64,
        rsi: f64,
        macd: f64,
        signal: f64,
        volume: u64,
    ) -> Vec<IndicatorRow> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut rows: Vec<IndicatorRow> = (0..50u64)
            .map(|i| IndicatorRow {
                point: PricePoint {
                    date: start.checked_add_days(Days::new(i)).unwrap(),
                    open: 100.0,
                    high: 101.0,
                    low: 99.0,
                    close: 100.0,
                    volume: NORMAL_VOLUME,
                },
                sma20: Some(100.0),
                sma50: Some(100.0),
                rsi14: Some(50.0),
                macd: Some(0.0),
                macd_signal: Some(0.0),
                macd_histogram: Some(0.0),
            })
            .collect();

        let last = rows.last_mut().unwrap();
        last.point.close = close;
        last.point.high = close + 1.0;
        last.point.low = close - 1.0;
        last.point.open = close;
        last.point.volume = volume;
        last.sma20 = Some(sma20);
        last.sma50 = Some(sma50);
        last.rsi14 = Some(rsi);
        last.macd = Some(macd);
        last.macd_signal = Some(signal);
        last.macd_histogram = Some(macd - signal);
        rows
    }

    #[test]
    fn oversold_bullish_trend_is_buy() {
        let rows = rows_with_latest(110.0, 105.0, 100.0, 25.0, 1.0, 0.5, NORMAL_VOLUME);
        let rec = RecommendationEngine::default().evaluate(&rows, &metrics()).unwrap();
        assert_eq!(rec.score, 83);
        assert_eq!(rec.action, Action::Buy);
        assert!((rec.target_price - 110.0 * 1.15).abs() < 1e-9);
        assert_eq!(rec.risk_level, RiskLevel::Low);
        assert_eq!(
            rec.reasons,
            vec![
                "RSI indicates oversold conditions (bullish)",
                "Price above both moving averages (bullish trend)",
                "MACD above signal line (bullish momentum)",
            ]
        );
    }

    #[test]
    fn overbought_bearish_trend_is_sell() {
        let rows = rows_with_latest(90.0, 95.0, 100.0, 75.0, 0.2, 0.5, NORMAL_VOLUME);
        let rec = RecommendationEngine::default().evaluate(&rows, &metrics()).unwrap();
        assert_eq!(rec.score, 17);
        assert_eq!(rec.action, Action::Sell);
        assert!((rec.target_price - 90.0 * 0.85).abs() < 1e-9);
        assert_eq!(rec.risk_level, RiskLevel::Medium);
        assert_eq!(rec.reasons.len(), 3);
    }

    #[test]
    fn macd_equal_to_signal_counts_as_bearish() {
        let rows = rows_with_latest(100.0, 100.0, 100.0, 50.0, 0.5, 0.5, NORMAL_VOLUME);
        let rec = RecommendationEngine::default().evaluate(&rows, &metrics()).unwrap();
        assert_eq!(rec.score, 42);
        assert_eq!(rec.action, Action::Hold);
        assert_eq!(rec.target_price, 100.0);
        assert_eq!(rec.risk_level, RiskLevel::Medium);
        assert_eq!(rec.reasons, vec!["MACD below signal line (bearish momentum)"]);
    }

    #[test]
    fn volume_spike_adds_points() {
        let rows = rows_with_latest(100.0, 100.0, 100.0, 50.0, 1.0, 0.5, NORMAL_VOLUME * 3);
        let rec = RecommendationEngine::default().evaluate(&rows, &metrics()).unwrap();
        assert_eq!(rec.score, 63);
        assert_eq!(rec.reasons.last().unwrap(), "Above average trading volume");
    }

    #[test]
    fn buy_with_elevated_rsi_is_medium_risk() {
        let rows = rows_with_latest(110.0, 105.0, 100.0, 65.0, 1.0, 0.5, NORMAL_VOLUME * 3);
        let rec = RecommendationEngine::default().evaluate(&rows, &metrics()).unwrap();
        assert_eq!(rec.score, 73);
        assert_eq!(rec.action, Action::Buy);
        assert_eq!(rec.risk_level, RiskLevel::Medium);
    }

    #[test]
    fn sell_with_low_rsi_is_high_risk() {
        let rows = rows_with_latest(90.0, 95.0, 100.0, 35.0, 0.1, 0.5, NORMAL_VOLUME);
        let rec = RecommendationEngine::default().evaluate(&rows, &metrics()).unwrap();
        assert_eq!(rec.score, 32);
        assert_eq!(rec.action, Action::Sell);
        assert_eq!(rec.risk_level, RiskLevel::High);
    }

    #[test]
    fn thresholds_are_inclusive() {
        // Zero momentum weight so a lone RSI rule lands on either boundary.
        let params = ScoringParams {
            momentum_weight: 0,
            ..ScoringParams::default()
        };
        let engine = RecommendationEngine::new(params, &IndicatorParams::default());

        let rows = rows_with_latest(100.0, 100.0, 100.0, 25.0, 0.0, 0.0, NORMAL_VOLUME);
        let rec = engine.evaluate(&rows, &metrics()).unwrap();
        assert_eq!(rec.score, 65);
        assert_eq!(rec.action, Action::Buy);

        let rows = rows_with_latest(100.0, 100.0, 100.0, 75.0, 0.0, 0.0, NORMAL_VOLUME);
        let rec = engine.evaluate(&rows, &metrics()).unwrap();
        assert_eq!(rec.score, 35);
        assert_eq!(rec.action, Action::Sell);
    }

    #[test]
    fn range_position_is_reported() {
        let rows = rows_with_latest(161.2, 100.0, 100.0, 50.0, 1.0, 0.5, NORMAL_VOLUME);
        let rec = RecommendationEngine::default().evaluate(&rows, &metrics()).unwrap();
        let expected = (161.2 - 124.17) / (198.23 - 124.17);
        assert!((rec.range_position.unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn short_series_is_insufficient_history() {
        let series = SeriesGenerator::default()
            .generate_as_of("AAPL", 10, 178.25, NaiveDate::from_ymd_opt(2024, 6, 30).unwrap())
            .unwrap();
        let rows = IndicatorEngine::default().compute_series(&series).unwrap();
        let err = RecommendationEngine::default()
            .evaluate(&rows, &metrics())
            .unwrap_err();
        assert_eq!(
            err,
            AnalysisError::InsufficientHistory {
                required: 50,
                actual: 10
            }
        );
    }

    #[test]
    fn zero_volume_window_is_invalid() {
        let params = ScoringParams {
            volume_window: 0,
            ..ScoringParams::default()
        };
        let engine = RecommendationEngine::new(params, &IndicatorParams::default());
        let rows = rows_with_latest(110.0, 105.0, 100.0, 25.0, 1.0, 0.5, NORMAL_VOLUME);
        assert!(matches!(
            engine.evaluate(&rows, &metrics()),
            Err(AnalysisError::InvalidInput(_))
        ));
    }

    #[test]
    fn empty_rows_are_invalid() {
        assert!(matches!(
            RecommendationEngine::default().evaluate(&[], &metrics()),
            Err(AnalysisError::InvalidInput(_))
        ));
    }

    #[test]
    fn incomplete_latest_row_is_rejected() {
        let mut rows = rows_with_latest(100.0, 100.0, 100.0, 50.0, 1.0, 0.5, NORMAL_VOLUME);
        rows.last_mut().unwrap().sma50 = None;
        assert!(RecommendationEngine::default().evaluate(&rows, &metrics()).is_err());
    }

    #[test]
    fn generated_year_produces_a_verdict() {
        let series = SeriesGenerator::default()
            .generate_as_of("MSFT", 365, 378.85, NaiveDate::from_ymd_opt(2024, 6, 30).unwrap())
            .unwrap();
        let rows = IndicatorEngine::default().compute_series(&series).unwrap();
        let rec = RecommendationEngine::default().evaluate(&rows, &metrics()).unwrap();
        assert!(!rec.reasons.is_empty());
        assert!(rec.target_price > 0.0);
        // Exactly one MACD reason is always present.
        assert_eq!(rec.reasons.iter().filter(|r| r.starts_with("MACD")).count(), 1);
    }
}
