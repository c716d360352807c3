// =============================================================================
// Central Application State — stock-lens service
// =============================================================================
//
// Shared across all request handlers via `Arc<AppState>`.
//
// Thread safety:
//   - Atomic counter for lock-free version tracking.
//   - parking_lot::RwLock for the config, reference table and report log.
//
// Analyses themselves never touch shared state while running: handlers take
// a snapshot of the config and reference table, compute, then record the
// summary.
// =============================================================================

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::analysis::{analyze, AnalysisReport, AnalysisRequest, ReportSummary};
use crate::error::Result;
use crate::market_data::ReferenceTable;
use crate::runtime_config::AnalyzerConfig;

/// Maximum number of recent report summaries to retain.
const MAX_RECENT_REPORTS: usize = 100;

pub struct AppState {
    /// Incremented every time a report is recorded.
    pub state_version: AtomicU64,

    pub config: Arc<RwLock<AnalyzerConfig>>,
    pub reference: Arc<RwLock<ReferenceTable>>,
    pub recent_reports: RwLock<Vec<ReportSummary>>,

    /// Instant when the service was started. Used for uptime reporting.
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Build the state from `config`, taking the reference table from the
    /// config when it carries one.
    pub fn new(config: AnalyzerConfig) -> Self {
        let reference = match &config.reference_stocks {
            Some(stocks) => ReferenceTable::new(stocks.clone()),
            None => ReferenceTable::demo(),
        };

        Self {
            state_version: AtomicU64::new(0),
            config: Arc::new(RwLock::new(config)),
            reference: Arc::new(RwLock::new(reference)),
            recent_reports: RwLock::new(Vec::new()),
            start_time: std::time::Instant::now(),
        }
    }

    pub fn current_state_version(&self) -> u64 {
        self.state_version.load(Ordering::Relaxed)
    }

    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Run one analysis against snapshots of the config and reference table
    /// and record its summary.
    pub fn run_analysis(&self, request: &AnalysisRequest) -> Result<AnalysisReport> {
        let config = self.config.read().clone();
        let reference = self.reference.read().clone();
        let report = analyze(request, &reference, &config)?;
        self.push_report(report.summary());
        Ok(report)
    }

    /// Append a summary, trimming the log to the most recent entries.
    pub fn push_report(&self, summary: ReportSummary) {
        let mut reports = self.recent_reports.write();
        reports.push(summary);
        if reports.len() > MAX_RECENT_REPORTS {
            let excess = reports.len() - MAX_RECENT_REPORTS;
            reports.drain(..excess);
        }
        self.state_version.fetch_add(1, Ordering::Relaxed);
    }
}
