// =============================================================================
// stock-lens — synthetic market analysis core
// =============================================================================
//
// Deterministic price generation, technical indicators and a rule-based
// recommendation, served over a small JSON API.
// =============================================================================

pub mod analysis;
pub mod api;
pub mod app_state;
pub mod error;
pub mod forecast;
pub mod formatter;
pub mod indicators;
pub mod key_metrics;
pub mod market_data;
pub mod recommendation;
pub mod runtime_config;
pub mod types;

pub use analysis::{analyze, AnalysisReport, AnalysisRequest};
pub use error::{AnalysisError, Result};
pub use runtime_config::AnalyzerConfig;
