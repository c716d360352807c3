pub mod generator;
pub mod reference;

// Re-exported for convenient access (e.g. `use crate::market_data::SeriesGenerator`).
pub use generator::SeriesGenerator;
pub use reference::{RangeContext, ReferenceSource, ReferenceTable, StockProfile};
