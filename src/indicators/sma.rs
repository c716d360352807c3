// =============================================================================
// Simple Moving Average (SMA) — sliding-window accumulator
// =============================================================================
//
// SMA_t = mean(close_{t-n+1} ..= close_t)
//
// The window keeps a running sum so each new point costs O(1) regardless of
// the window length.  The same accumulator backs the RSI gain/loss averages.
// =============================================================================

use std::collections::VecDeque;

/// Fixed-capacity window with a running sum.
///
/// Also counts how many values in the window are non-zero, so callers can
/// tell an exactly-zero window from one whose running sum has drifted to a
/// tiny residue.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    values: VecDeque<f64>,
    capacity: usize,
    sum: f64,
    nonzero: usize,
}

impl RollingWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            values: VecDeque::with_capacity(capacity + 1),
            capacity,
            sum: 0.0,
            nonzero: 0,
        }
    }

    /// Append a value, evicting the oldest once the window is full.
    pub fn push(&mut self, value: f64) {
        self.values.push_back(value);
        self.sum += value;
        if value != 0.0 {
            self.nonzero += 1;
        }

        if self.values.len() > self.capacity {
            if let Some(old) = self.values.pop_front() {
                self.sum -= old;
                if old != 0.0 {
                    self.nonzero -= 1;
                }
            }
        }

        if self.nonzero == 0 {
            self.sum = 0.0;
        }
    }

    pub fn is_full(&self) -> bool {
        self.capacity > 0 && self.values.len() == self.capacity
    }

    /// True when every value currently in the window is exactly zero.
    pub fn all_zero(&self) -> bool {
        self.nonzero == 0
    }

    /// Mean of the window, `None` until `capacity` values have been seen.
    pub fn mean(&self) -> Option<f64> {
        if !self.is_full() {
            return None;
        }
        if self.nonzero == 0 {
            return Some(0.0);
        }
        Some(self.sum / self.capacity as f64)
    }
}

/// Compute the SMA column for `values`, aligned with the input.
///
/// Index `i` is `None` while `i < period - 1`.  A zero period yields an
/// all-`None` column.
pub fn calculate_sma(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut window = RollingWindow::new(period);
    values
        .iter()
        .map(|&v| {
            window.push(v);
            window.mean()
        })
        .collect()
}
