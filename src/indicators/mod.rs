// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the indicators the recommendation
// engine reads.  Column functions return one entry per input close; warm-up
// positions are `None` rather than being dropped, so every column lines up
// with the bars it was computed from.

pub mod ema;
pub mod engine;
pub mod macd;
pub mod rsi;
pub mod sma;

pub use engine::{IndicatorEngine, IndicatorRow};
