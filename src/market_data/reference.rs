// =============================================================================
// Reference Table — static per-symbol metrics
// =============================================================================
//
// Supplies the current price, 52-week range, P/E and friends for each symbol
// the service knows about.  The built-in demo table can be replaced from the
// config file; anything else implementing `ReferenceSource` can stand in.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::types::ReferenceMetrics;

/// A symbol, its display name and its reference metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockProfile {
    pub symbol: String,
    pub name: String,
    #[serde(flatten)]
    pub metrics: ReferenceMetrics,
}

/// Lookup collaborator for reference metrics.
pub trait ReferenceSource: Send + Sync {
    /// Exact (case-insensitive) symbol lookup.
    fn lookup(&self, symbol: &str) -> Option<StockProfile>;

    /// Case-insensitive substring match on symbol or name.  An empty query
    /// returns every entry.
    fn search(&self, query: &str) -> Vec<StockProfile>;
}

/// In-memory reference table.
#[derive(Debug, Clone)]
pub struct ReferenceTable {
    stocks: Vec<StockProfile>,
}

impl ReferenceTable {
    pub fn new(stocks: Vec<StockProfile>) -> Self {
        let stocks = stocks
            .into_iter()
            .map(|mut s| {
                s.symbol = s.symbol.trim().to_uppercase();
                s
            })
            .collect();
        Self { stocks }
    }

    /// The five demo symbols shipped with the service.
    pub fn demo() -> Self {
        Self::new(vec![
            profile("AAPL", "Apple Inc.", 178.25, 2.34, 1.33, 45_234_567, 2.80e12, 28.5, 198.23, 124.17),
            profile("MSFT", "Microsoft Corporation", 378.85, -1.22, -0.32, 23_456_789, 2.82e12, 32.1, 384.30, 245.61),
            profile("GOOGL", "Alphabet Inc.", 138.93, 3.45, 2.55, 34_567_890, 1.75e12, 25.8, 153.78, 102.21),
            profile("TSLA", "Tesla, Inc.", 248.50, -8.75, -3.40, 67_890_123, 7.90e11, 78.2, 299.29, 138.80),
            profile("AMZN", "Amazon.com Inc.", 145.86, 1.23, 0.85, 28_456_789, 1.52e12, 45.3, 170.00, 118.35),
        ])
    }

    pub fn len(&self) -> usize {
        self.stocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stocks.is_empty()
    }

    pub fn symbols(&self) -> Vec<String> {
        self.stocks.iter().map(|s| s.symbol.clone()).collect()
    }
}

impl Default for ReferenceTable {
    fn default() -> Self {
        Self::demo()
    }
}

impl ReferenceSource for ReferenceTable {
    fn lookup(&self, symbol: &str) -> Option<StockProfile> {
        let wanted = symbol.trim().to_uppercase();
        self.stocks.iter().find(|s| s.symbol == wanted).cloned()
    }

    fn search(&self, query: &str) -> Vec<StockProfile> {
        let needle = query.trim().to_lowercase();
        self.stocks
            .iter()
            .filter(|s| {
                needle.is_empty()
                    || s.symbol.to_lowercase().contains(&needle)
                    || s.name.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect()
    }
}

#[allow(clippy::too_many_arguments)]
fn profile(
    symbol: &str,
    name: &str,
    current_price: f64,
    change: f64,
    change_percent: f64,
    volume: u64,
    market_cap: f64,
    pe_ratio: f64,
    high_52w: f64,
    low_52w: f64,
) -> StockProfile {
    StockProfile {
        symbol: symbol.to_string(),
        name: name.to_string(),
        metrics: ReferenceMetrics {
            current_price,
            change,
            change_percent,
            volume,
            market_cap,
            pe_ratio,
            high_52w,
            low_52w,
        },
    }
}

// =============================================================================
// 52-week range context
// =============================================================================

/// Where a price sits relative to the trailing 52-week band.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeContext {
    pub price: f64,
    pub high_52w: f64,
    pub low_52w: f64,
    /// `(price - low) / (high - low)`; below 0 or above 1 when the price has
    /// broken out of the band.  `None` when the band is degenerate.
    pub position: Option<f64>,
    /// Percent below the 52-week high (negative above it).
    pub pct_from_high: Option<f64>,
    /// Percent above the 52-week low (negative below it).
    pub pct_from_low: Option<f64>,
}

impl RangeContext {
    pub fn from_metrics(price: f64, metrics: &ReferenceMetrics) -> Self {
        let (high, low) = (metrics.high_52w, metrics.low_52w);
        let span = high - low;

        let position = (span > 0.0 && span.is_finite()).then(|| (price - low) / span);
        let pct_from_high = (high > 0.0).then(|| (high - price) / high * 100.0);
        let pct_from_low = (low > 0.0).then(|| (price - low) / low * 100.0);

        Self {
            price,
            high_52w: high,
            low_52w: low,
            position,
            pct_from_high,
            pct_from_low,
        }
    }
}
