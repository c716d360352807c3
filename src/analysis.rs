// =============================================================================
// Analysis Pipeline — one symbol from reference lookup to verdict
// =============================================================================
//
//   1. Look up reference metrics for the symbol
//   2. Generate the synthetic series from the current price
//   3. Compute indicator rows
//   4. Score the latest row
//   5. Optionally project the trend forward
//   6. Summarise the whole period (volatility, return, volume)
//   7. Package everything into an auditable report
//
// Every step is synchronous and pure apart from the report id/timestamp, so a
// caller may run many symbols in parallel without coordination.
// =============================================================================

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{AnalysisError, Result};
use crate::forecast::{forecast, ForecastPoint};
use crate::formatter::{format_currency, format_large_number};
use crate::indicators::{IndicatorEngine, IndicatorRow};
use crate::key_metrics::KeyMetrics;
use crate::market_data::{RangeContext, ReferenceSource, SeriesGenerator};
use crate::recommendation::{Recommendation, RecommendationEngine};
use crate::runtime_config::AnalyzerConfig;
use crate::types::{Action, Period, ReferenceMetrics, RiskLevel};

/// What to analyse.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub symbol: String,
    pub period: Period,
    pub include_forecast: bool,
}

impl AnalysisRequest {
    pub fn new(symbol: impl Into<String>, period: Period) -> Self {
        Self {
            symbol: symbol.into(),
            period,
            include_forecast: false,
        }
    }

    pub fn with_forecast(mut self, include: bool) -> Self {
        self.include_forecast = include;
        self
    }
}

/// Pre-rendered strings for the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct DisplayMetrics {
    pub price: String,
    pub change: String,
    pub volume: String,
    pub market_cap: String,
    pub target_price: String,
    pub avg_volume: String,
    /// `31.4%`, absent with fewer than three closes.
    pub annual_volatility: Option<String>,
    /// `+4.2%`, absent for a single close.
    pub period_return: Option<String>,
}

/// Complete record of one analysis run.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    /// Unique identifier for this run (UUID v4).
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub period: Period,
    pub days: usize,
    /// RFC 3339 timestamp of when the report was built.
    pub created_at: String,
    pub metrics: ReferenceMetrics,
    pub display: DisplayMetrics,
    pub range: RangeContext,
    pub key_metrics: KeyMetrics,
    pub recommendation: Recommendation,
    pub rows: Vec<IndicatorRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forecast: Option<Vec<ForecastPoint>>,
}

/// Compact view kept in the recent-analysis log.
#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub id: String,
    pub symbol: String,
    pub period: Period,
    pub action: Action,
    pub score: i32,
    pub target_price: f64,
    pub risk_level: RiskLevel,
    pub created_at: String,
}

impl AnalysisReport {
    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            id: self.id.clone(),
            symbol: self.symbol.clone(),
            period: self.period,
            action: self.recommendation.action,
            score: self.recommendation.score,
            target_price: self.recommendation.target_price,
            risk_level: self.recommendation.risk_level,
            created_at: self.created_at.clone(),
        }
    }
}

/// Run the full pipeline for `request`.
pub fn analyze(
    request: &AnalysisRequest,
    reference: &dyn ReferenceSource,
    config: &AnalyzerConfig,
) -> Result<AnalysisReport> {
    let profile = reference
        .lookup(&request.symbol)
        .ok_or_else(|| AnalysisError::UnknownSymbol(request.symbol.trim().to_uppercase()))?;

    let days = request.period.days();
    let generator = SeriesGenerator::new(config.generator.clone());
    let series = generator.generate(&profile.symbol, days, profile.metrics.current_price)?;

    let indicators = IndicatorEngine::new(config.indicators.clone());
    let rows = indicators.compute_series(&series)?;

    let scorer = RecommendationEngine::new(config.scoring.clone(), &config.indicators);
    let recommendation = scorer.evaluate(&rows, &profile.metrics)?;

    let projected = if request.include_forecast {
        Some(forecast(&series, &config.forecast)?)
    } else {
        None
    };

    let key_metrics = KeyMetrics::from_series(&series);
    let range = RangeContext::from_metrics(profile.metrics.current_price, &profile.metrics);
    let m = &profile.metrics;
    let display = DisplayMetrics {
        price: format_currency(m.current_price),
        change: format!("{:+.2} ({:+.2}%)", m.change, m.change_percent),
        volume: format_large_number(m.volume as f64),
        market_cap: format_large_number(m.market_cap),
        target_price: format_currency(recommendation.target_price),
        avg_volume: format_large_number(key_metrics.avg_volume),
        annual_volatility: key_metrics.annual_volatility_pct.map(|v| format!("{v:.1}%")),
        period_return: key_metrics.period_return_pct.map(|v| format!("{v:+.1}%")),
    };

    debug!(
        symbol = %profile.symbol,
        rows = rows.len(),
        forecast = projected.is_some(),
        "analysis pipeline complete"
    );

    info!(
        symbol = %profile.symbol,
        period = %request.period,
        action = %recommendation.action,
        score = recommendation.score,
        risk = %recommendation.risk_level,
        "analysis generated"
    );

    Ok(AnalysisReport {
        id: uuid::Uuid::new_v4().to_string(),
        symbol: profile.symbol,
        name: profile.name,
        period: request.period,
        days,
        created_at: chrono::Utc::now().to_rfc3339(),
        metrics: profile.metrics,
        display,
        range,
        key_metrics,
        recommendation,
        rows,
        forecast: projected,
    })
}
