// =============================================================================
// Synthetic Series Generator — deterministic daily OHLCV random walk
// =============================================================================
//
// Used whenever no live feed is wired in.  The random stream is seeded only
// from the symbol, so the same (symbol, days, base price, end date) always
// yields the same bars.
//
// Per day, starting from price_0 = base_price * start_factor:
//   change = N(drift, volatility)
//   price  = max(prev * (1 + change), floor)
//   open   = price
//   high   = open * (1 + U(0, band))
//   low    = open * (1 - U(0, band))
//   close  = low + U(0, 1) * (high - low)
//   volume = U[min_volume, max_volume)
//   prev   = close (unrounded)
//
// Prices are rounded to cents only when the bar is emitted.
// =============================================================================

use chrono::{Days, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{AnalysisError, Result};
use crate::runtime_config::GeneratorParams;
use crate::types::{PricePoint, Series};

/// Produces reproducible synthetic price histories.
#[derive(Debug, Clone, Default)]
pub struct SeriesGenerator {
    params: GeneratorParams,
}

impl SeriesGenerator {
    pub fn new(params: GeneratorParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &GeneratorParams {
        &self.params
    }

    /// Generate `days` bars ending today (UTC, inclusive).
    pub fn generate(&self, symbol: &str, days: usize, base_price: f64) -> Result<Series> {
        self.generate_as_of(symbol, days, base_price, Utc::now().date_naive())
    }

    /// Generate `days` consecutive calendar-day bars ending on `end_date`
    /// (inclusive), oldest first.
    pub fn generate_as_of(
        &self,
        symbol: &str,
        days: usize,
        base_price: f64,
        end_date: NaiveDate,
    ) -> Result<Series> {
        if days == 0 {
            return Err(AnalysisError::invalid("days must be >= 1"));
        }
        if !base_price.is_finite() || base_price <= 0.0 {
            return Err(AnalysisError::invalid(format!(
                "base price must be a positive finite number, got {base_price}"
            )));
        }
        self.params.validate()?;

        let start_date = end_date
            .checked_sub_days(Days::new(days as u64 - 1))
            .ok_or_else(|| AnalysisError::invalid(format!("{days} days before {end_date} is out of range")))?;

        let returns = Normal::new(self.params.drift, self.params.volatility)
            .map_err(|e| AnalysisError::invalid(format!("bad return distribution: {e}")))?;

        let seed = symbol_seed(symbol);
        let mut rng = StdRng::seed_from_u64(seed);
        let band = self.params.intraday_band;

        let mut points = Vec::with_capacity(days);
        let mut prev = base_price * self.params.start_factor;
        let mut date = start_date;

        for _ in 0..days {
            let change: f64 = returns.sample(&mut rng);
            let price = (prev * (1.0 + change)).max(self.params.price_floor);

            let open = price;
            let high = open * (1.0 + rng.gen::<f64>() * band);
            let low = open * (1.0 - rng.gen::<f64>() * band);
            let close = low + rng.gen::<f64>() * (high - low);
            let volume = rng.gen_range(self.params.min_volume..self.params.max_volume);

            points.push(PricePoint {
                date,
                open: round_cents(open),
                high: round_cents(high),
                low: round_cents(low),
                close: round_cents(close),
                volume,
            });

            prev = close;
            date = date.succ_opt().unwrap_or(date);
        }

        debug!(symbol, days, base_price, seed, %start_date, %end_date, "synthetic series generated");

        Ok(Series::from_generated(points))
    }
}

/// Stable seed derived from the symbol, reduced modulo 2^32.
pub fn symbol_seed(symbol: &str) -> u64 {
    let digest = Sha256::digest(symbol.as_bytes());
    let mut prefix = [0u8; 4];
    prefix.copy_from_slice(&digest[..4]);
    u64::from(u32::from_be_bytes(prefix))
}

/// Round to two decimals, never below one cent.
fn round_cents(value: f64) -> f64 {
    ((value * 100.0).round() / 100.0).max(0.01)
}
