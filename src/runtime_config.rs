// =============================================================================
// Analyzer Configuration — every tunable window, weight and threshold
// =============================================================================
//
// The analysis core never hardcodes its parameters: the generator, the
// indicator engine, the scorer and the forecaster each read a params block
// from here.  All fields carry `#[serde(default)]` so that a partial JSON file
// (or `{}`) loads with the stock defaults filled in.
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::AnalysisError;
use crate::market_data::reference::StockProfile;
use crate::types::Period;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_start_factor() -> f64 {
    0.8
}

fn default_drift() -> f64 {
    0.0003
}

fn default_volatility() -> f64 {
    0.02
}

fn default_price_floor() -> f64 {
    1.0
}

fn default_intraday_band() -> f64 {
    0.03
}

fn default_min_volume() -> u64 {
    10_000_000
}

fn default_max_volume() -> u64 {
    50_000_000
}

fn default_sma_short() -> usize {
    20
}

fn default_sma_long() -> usize {
    50
}

fn default_rsi_period() -> usize {
    14
}

fn default_macd_fast() -> usize {
    12
}

fn default_macd_slow() -> usize {
    26
}

fn default_macd_signal() -> usize {
    9
}

fn default_base_score() -> i32 {
    50
}

fn default_oversold() -> f64 {
    30.0
}

fn default_overbought() -> f64 {
    70.0
}

fn default_rsi_weight() -> i32 {
    15
}

fn default_trend_weight() -> i32 {
    10
}

fn default_momentum_weight() -> i32 {
    8
}

fn default_volume_weight() -> i32 {
    5
}

fn default_volume_window() -> usize {
    10
}

fn default_volume_multiplier() -> f64 {
    1.2
}

fn default_buy_threshold() -> i32 {
    65
}

fn default_sell_threshold() -> i32 {
    35
}

fn default_buy_target_factor() -> f64 {
    1.15
}

fn default_sell_target_factor() -> f64 {
    0.85
}

fn default_buy_risk_rsi() -> f64 {
    60.0
}

fn default_sell_risk_rsi() -> f64 {
    40.0
}

fn default_forecast_lookback() -> usize {
    30
}

fn default_forecast_horizon() -> usize {
    30
}

fn default_min_confidence() -> f64 {
    0.3
}

// =============================================================================
// GeneratorParams
// =============================================================================

/// Random-walk model used by the synthetic series generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorParams {
    /// The walk starts at `base_price * start_factor`.
    #[serde(default = "default_start_factor")]
    pub start_factor: f64,

    /// Mean of the daily return distribution.
    #[serde(default = "default_drift")]
    pub drift: f64,

    /// Standard deviation of the daily return distribution.
    #[serde(default = "default_volatility")]
    pub volatility: f64,

    #[serde(default = "default_price_floor")]
    pub price_floor: f64,

    /// Maximum fractional excursion of high/low from the open.
    #[serde(default = "default_intraday_band")]
    pub intraday_band: f64,

    #[serde(default = "default_min_volume")]
    pub min_volume: u64,

    /// Exclusive upper bound.
    #[serde(default = "default_max_volume")]
    pub max_volume: u64,
}

impl Default for GeneratorParams {
    fn default() -> Self {
        Self {
            start_factor: default_start_factor(),
            drift: default_drift(),
            volatility: default_volatility(),
            price_floor: default_price_floor(),
            intraday_band: default_intraday_band(),
            min_volume: default_min_volume(),
            max_volume: default_max_volume(),
        }
    }
}

impl GeneratorParams {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if !(self.volatility.is_finite() && self.volatility >= 0.0) {
            return Err(AnalysisError::invalid("volatility must be finite and >= 0"));
        }
        if !(self.start_factor.is_finite() && self.start_factor > 0.0) {
            return Err(AnalysisError::invalid("start_factor must be > 0"));
        }
        if !(self.price_floor.is_finite() && self.price_floor > 0.0) {
            return Err(AnalysisError::invalid("price_floor must be > 0"));
        }
        if !(0.0..1.0).contains(&self.intraday_band) {
            return Err(AnalysisError::invalid("intraday_band must be in [0, 1)"));
        }
        if self.min_volume >= self.max_volume {
            return Err(AnalysisError::invalid("min_volume must be below max_volume"));
        }
        Ok(())
    }
}

// =============================================================================
// IndicatorParams
// =============================================================================

/// Window sizes for every computed indicator column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorParams {
    #[serde(default = "default_sma_short")]
    pub sma_short: usize,

    #[serde(default = "default_sma_long")]
    pub sma_long: usize,

    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,

    #[serde(default = "default_macd_fast")]
    pub macd_fast: usize,

    #[serde(default = "default_macd_slow")]
    pub macd_slow: usize,

    #[serde(default = "default_macd_signal")]
    pub macd_signal: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            sma_short: default_sma_short(),
            sma_long: default_sma_long(),
            rsi_period: default_rsi_period(),
            macd_fast: default_macd_fast(),
            macd_slow: default_macd_slow(),
            macd_signal: default_macd_signal(),
        }
    }
}

impl IndicatorParams {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        let windows = [
            ("sma_short", self.sma_short),
            ("sma_long", self.sma_long),
            ("rsi_period", self.rsi_period),
            ("macd_fast", self.macd_fast),
            ("macd_slow", self.macd_slow),
            ("macd_signal", self.macd_signal),
        ];
        if let Some((name, _)) = windows.iter().find(|(_, w)| *w == 0) {
            return Err(AnalysisError::invalid(format!("{name} must be >= 1")));
        }
        if self.macd_fast >= self.macd_slow {
            return Err(AnalysisError::invalid(format!(
                "macd_fast ({}) must be shorter than macd_slow ({})",
                self.macd_fast, self.macd_slow
            )));
        }
        Ok(())
    }

    /// Number of points needed before every column of the latest row is
    /// defined.  RSI needs one extra point because it works on deltas.
    pub fn required_history(&self) -> usize {
        self.sma_short
            .max(self.sma_long)
            .max(self.rsi_period + 1)
    }
}

// =============================================================================
// ScoringParams
// =============================================================================

/// Rule weights and decision thresholds for the recommendation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringParams {
    #[serde(default = "default_base_score")]
    pub base_score: i32,

    #[serde(default = "default_oversold")]
    pub rsi_oversold: f64,

    #[serde(default = "default_overbought")]
    pub rsi_overbought: f64,

    #[serde(default = "default_rsi_weight")]
    pub rsi_weight: i32,

    #[serde(default = "default_trend_weight")]
    pub trend_weight: i32,

    #[serde(default = "default_momentum_weight")]
    pub momentum_weight: i32,

    #[serde(default = "default_volume_weight")]
    pub volume_weight: i32,

    /// Number of trailing volumes averaged for the volume rule.
    #[serde(default = "default_volume_window")]
    pub volume_window: usize,

    #[serde(default = "default_volume_multiplier")]
    pub volume_multiplier: f64,

    #[serde(default = "default_buy_threshold")]
    pub buy_threshold: i32,

    #[serde(default = "default_sell_threshold")]
    pub sell_threshold: i32,

    #[serde(default = "default_buy_target_factor")]
    pub buy_target_factor: f64,

    #[serde(default = "default_sell_target_factor")]
    pub sell_target_factor: f64,

    /// BUY is MEDIUM risk above this RSI, LOW otherwise.
    #[serde(default = "default_buy_risk_rsi")]
    pub buy_risk_rsi: f64,

    /// SELL is HIGH risk below this RSI, MEDIUM otherwise.
    #[serde(default = "default_sell_risk_rsi")]
    pub sell_risk_rsi: f64,
}

impl Default for ScoringParams {
    fn default() -> Self {
        Self {
            base_score: default_base_score(),
            rsi_oversold: default_oversold(),
            rsi_overbought: default_overbought(),
            rsi_weight: default_rsi_weight(),
            trend_weight: default_trend_weight(),
            momentum_weight: default_momentum_weight(),
            volume_weight: default_volume_weight(),
            volume_window: default_volume_window(),
            volume_multiplier: default_volume_multiplier(),
            buy_threshold: default_buy_threshold(),
            sell_threshold: default_sell_threshold(),
            buy_target_factor: default_buy_target_factor(),
            sell_target_factor: default_sell_target_factor(),
            buy_risk_rsi: default_buy_risk_rsi(),
            sell_risk_rsi: default_sell_risk_rsi(),
        }
    }
}

impl ScoringParams {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.volume_window == 0 {
            return Err(AnalysisError::invalid("volume_window must be >= 1"));
        }
        if !(self.volume_multiplier.is_finite() && self.volume_multiplier >= 0.0) {
            return Err(AnalysisError::invalid("volume_multiplier must be finite and >= 0"));
        }
        if self.sell_threshold >= self.buy_threshold {
            return Err(AnalysisError::invalid(
                "sell_threshold must be below buy_threshold",
            ));
        }
        Ok(())
    }
}

// =============================================================================
// ForecastParams
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastParams {
    /// Trailing closes used to fit the trend line.
    #[serde(default = "default_forecast_lookback")]
    pub lookback: usize,

    /// Days projected past the last close.
    #[serde(default = "default_forecast_horizon")]
    pub horizon: usize,

    /// Confidence never decays below this value.
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,
}

impl Default for ForecastParams {
    fn default() -> Self {
        Self {
            lookback: default_forecast_lookback(),
            horizon: default_forecast_horizon(),
            min_confidence: default_min_confidence(),
        }
    }
}

// =============================================================================
// AnalyzerConfig
// =============================================================================

/// Top-level configuration for the analysis service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Period used when a request does not name one.
    #[serde(default)]
    pub default_period: Period,

    #[serde(default)]
    pub generator: GeneratorParams,

    #[serde(default)]
    pub indicators: IndicatorParams,

    #[serde(default)]
    pub scoring: ScoringParams,

    #[serde(default)]
    pub forecast: ForecastParams,

    /// Replaces the built-in reference table when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_stocks: Option<Vec<StockProfile>>,
}

impl AnalyzerConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// A missing or malformed file is an error; the caller decides whether to
    /// fall back to defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read analyzer config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse analyzer config from {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("invalid analyzer config in {}", path.display()))?;

        info!(
            path = %path.display(),
            default_period = %config.default_period,
            custom_reference = config.reference_stocks.is_some(),
            "analyzer config loaded"
        );

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        self.generator.validate()?;
        self.indicators.validate()?;
        self.scoring.validate()?;
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let cfg = AnalyzerConfig::default();
        assert_eq!(cfg.default_period, Period::OneYear);
        assert_eq!(cfg.indicators.sma_short, 20);
        assert_eq!(cfg.indicators.sma_long, 50);
        assert_eq!(cfg.indicators.rsi_period, 14);
        assert_eq!(cfg.indicators.macd_fast, 12);
        assert_eq!(cfg.indicators.macd_slow, 26);
        assert_eq!(cfg.indicators.macd_signal, 9);
        assert_eq!(cfg.scoring.base_score, 50);
        assert_eq!(cfg.scoring.buy_threshold, 65);
        assert_eq!(cfg.scoring.sell_threshold, 35);
        assert!((cfg.generator.drift - 0.0003).abs() < f64::EPSILON);
        assert!((cfg.generator.volatility - 0.02).abs() < f64::EPSILON);
        assert!(cfg.reference_stocks.is_none());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn deserialise_empty_json_uses_defaults() {
        let cfg: AnalyzerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.indicators, IndicatorParams::default());
        assert_eq!(cfg.scoring, ScoringParams::default());
        assert_eq!(cfg.forecast, ForecastParams::default());
    }

    #[test]
    fn deserialise_partial_json_fills_defaults() {
        let json = r#"{ "default_period": "3M", "indicators": { "sma_short": 5 } }"#;
        let cfg: AnalyzerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.default_period, Period::ThreeMonths);
        assert_eq!(cfg.indicators.sma_short, 5);
        assert_eq!(cfg.indicators.sma_long, 50);
        assert_eq!(cfg.scoring.volume_window, 10);
    }

    #[test]
    fn required_history_is_longest_window() {
        assert_eq!(IndicatorParams::default().required_history(), 50);
        let short = IndicatorParams {
            sma_short: 3,
            sma_long: 5,
            rsi_period: 6,
            ..IndicatorParams::default()
        };
        assert_eq!(short.required_history(), 7);
    }

    #[test]
    fn indicator_params_reject_bad_windows() {
        let zero = IndicatorParams {
            rsi_period: 0,
            ..IndicatorParams::default()
        };
        assert!(zero.validate().is_err());

        let inverted = IndicatorParams {
            macd_fast: 26,
            macd_slow: 12,
            ..IndicatorParams::default()
        };
        assert!(inverted.validate().is_err());
    }

    #[test]
    fn scoring_params_reject_bad_values() {
        assert!(ScoringParams::default().validate().is_ok());

        let no_window = ScoringParams {
            volume_window: 0,
            ..ScoringParams::default()
        };
        assert!(no_window.validate().is_err());

        let crossed = ScoringParams {
            buy_threshold: 40,
            sell_threshold: 60,
            ..ScoringParams::default()
        };
        assert!(crossed.validate().is_err());

        let cfg = AnalyzerConfig {
            scoring: no_window,
            ..AnalyzerConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn load_missing_file_is_error() {
        assert!(AnalyzerConfig::load("/nonexistent/analyzer_config.json").is_err());
    }

    #[test]
    fn load_reads_file_from_disk() {
        let path = std::env::temp_dir().join(format!("stock-lens-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(&path, r#"{ "scoring": { "buy_threshold": 70 } }"#).unwrap();
        let cfg = AnalyzerConfig::load(&path).unwrap();
        assert_eq!(cfg.scoring.buy_threshold, 70);
        std::fs::remove_file(&path).unwrap();
    }
}
