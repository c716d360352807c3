// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// All endpoints live under `/api/v1/`.  Analyses run on the blocking pool so
// a long series never stalls the reactor; batch requests fan out one task per
// symbol and report failures per symbol.
//
// CORS is configured permissively for development; tighten `allowed_origins`
// in production.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};

use crate::analysis::{AnalysisReport, AnalysisRequest, ReportSummary};
use crate::app_state::AppState;
use crate::error::AnalysisError;
use crate::formatter::{format_currency, format_large_number};
use crate::market_data::{RangeContext, ReferenceSource, StockProfile};
use crate::types::Period;

/// Upper bound on symbols per batch request.
const MAX_BATCH_SYMBOLS: usize = 50;

// =============================================================================
// Router construction
// =============================================================================

/// Build the full REST API router with CORS middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/stocks", get(search_stocks))
        .route("/api/v1/stocks/:symbol", get(stock_detail))
        .route("/api/v1/analysis/recent", get(recent_analyses))
        .route("/api/v1/analysis/batch", post(batch_analysis))
        .route("/api/v1/analysis/:symbol", get(analyze_symbol))
        .route("/api/v1/config", get(get_config))
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Error mapping
// =============================================================================

/// Handler error rendered as `{ "error": ... }` with a matching status.
#[derive(Debug)]
pub enum ApiError {
    Analysis(AnalysisError),
    Internal(String),
}

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        Self::Analysis(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Analysis(err) => {
                let status = match err {
                    AnalysisError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                    AnalysisError::UnknownSymbol(_) => StatusCode::NOT_FOUND,
                    AnalysisError::InsufficientHistory { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                };
                (status, err.to_string())
            }
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

fn parse_period(raw: Option<&str>, state: &AppState) -> Result<Period, AnalysisError> {
    match raw {
        Some(code) => code.parse(),
        None => Ok(state.config.read().default_period),
    }
}

// =============================================================================
// Health
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    state_version: u64,
    uptime_secs: u64,
    server_time: i64,
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let resp = HealthResponse {
        status: "ok",
        state_version: state.current_state_version(),
        uptime_secs: state.uptime_secs(),
        server_time: chrono::Utc::now().timestamp_millis(),
    };
    Json(resp)
}

// =============================================================================
// Reference lookups
// =============================================================================

#[derive(Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: Option<String>,
}

async fn search_stocks(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> impl IntoResponse {
    let hits = state.reference.read().search(query.q.as_deref().unwrap_or(""));
    Json(hits)
}

#[derive(Serialize)]
struct StockDetail {
    #[serde(flatten)]
    profile: StockProfile,
    formatted: FormattedMetrics,
    range: RangeContext,
}

#[derive(Serialize)]
struct FormattedMetrics {
    price: String,
    volume: String,
    market_cap: String,
    high_52w: String,
    low_52w: String,
}

async fn stock_detail(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> Result<Json<StockDetail>, ApiError> {
    let profile = state
        .reference
        .read()
        .lookup(&symbol)
        .ok_or_else(|| AnalysisError::UnknownSymbol(symbol.to_uppercase()))?;

    let m = &profile.metrics;
    let formatted = FormattedMetrics {
        price: format_currency(m.current_price),
        volume: format_large_number(m.volume as f64),
        market_cap: format_large_number(m.market_cap),
        high_52w: format_currency(m.high_52w),
        low_52w: format_currency(m.low_52w),
    };
    let range = RangeContext::from_metrics(m.current_price, m);

    Ok(Json(StockDetail {
        profile,
        formatted,
        range,
    }))
}

// =============================================================================
// Analysis
// =============================================================================

#[derive(Deserialize)]
struct AnalysisQuery {
    #[serde(default)]
    period: Option<String>,
    #[serde(default)]
    forecast: Option<bool>,
}

async fn analyze_symbol(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
    Query(query): Query<AnalysisQuery>,
) -> Result<Json<AnalysisReport>, ApiError> {
    let period = parse_period(query.period.as_deref(), &state)?;
    let request = AnalysisRequest::new(symbol, period).with_forecast(query.forecast.unwrap_or(false));

    let worker = state.clone();
    let report = tokio::task::spawn_blocking(move || worker.run_analysis(&request))
        .await
        .map_err(|e| {
            error!(error = %e, "analysis task failed");
            ApiError::Internal(format!("analysis task failed: {e}"))
        })??;

    Ok(Json(report))
}

#[derive(Deserialize)]
struct BatchRequest {
    symbols: Vec<String>,
    #[serde(default)]
    period: Option<String>,
}

#[derive(Serialize)]
struct BatchEntry {
    symbol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ReportSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

async fn batch_analysis(
    State(state): State<Arc<AppState>>,
    Json(body): Json<BatchRequest>,
) -> Result<Json<Vec<BatchEntry>>, ApiError> {
    if body.symbols.is_empty() {
        return Err(AnalysisError::invalid("symbols must not be empty").into());
    }
    if body.symbols.len() > MAX_BATCH_SYMBOLS {
        return Err(AnalysisError::invalid(format!(
            "at most {MAX_BATCH_SYMBOLS} symbols per batch, got {}",
            body.symbols.len()
        ))
        .into());
    }
    let period = parse_period(body.period.as_deref(), &state)?;

    let tasks = body.symbols.iter().map(|symbol| {
        let worker = state.clone();
        let request = AnalysisRequest::new(symbol.clone(), period);
        tokio::task::spawn_blocking(move || worker.run_analysis(&request).map(|r| r.summary()))
    });
    let results = join_all(tasks).await;

    let entries: Vec<BatchEntry> = body
        .symbols
        .into_iter()
        .zip(results)
        .map(|(symbol, joined)| match joined {
            Ok(Ok(summary)) => BatchEntry {
                symbol,
                summary: Some(summary),
                error: None,
            },
            Ok(Err(e)) => {
                warn!(symbol = %symbol, error = %e, "batch analysis entry failed");
                BatchEntry {
                    symbol,
                    summary: None,
                    error: Some(e.to_string()),
                }
            }
            Err(e) => {
                error!(symbol = %symbol, error = %e, "batch analysis task failed");
                BatchEntry {
                    symbol,
                    summary: None,
                    error: Some(format!("analysis task failed: {e}")),
                }
            }
        })
        .collect();

    info!(
        count = entries.len(),
        failed = entries.iter().filter(|e| e.error.is_some()).count(),
        period = %period,
        "batch analysis complete"
    );

    Ok(Json(entries))
}

async fn recent_analyses(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let reports = state.recent_reports.read().clone();
    Json(reports)
}

// =============================================================================
// Config
// =============================================================================

async fn get_config(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let config = state.config.read().clone();
    Json(config)
}
