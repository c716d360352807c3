// =============================================================================
// Analysis Errors
// =============================================================================
//
// Every fallible operation in the analysis core returns `AnalysisError`.
// The HTTP layer maps each variant onto a status code; the binary itself works
// with `anyhow` and only sees these through `?`.
// =============================================================================

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// Caller-supplied data violates a documented precondition.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The series is too short for the longest indicator window.
    #[error("insufficient history: need at least {required} points, got {actual}")]
    InsufficientHistory { required: usize, actual: usize },

    /// The reference table has no entry for the requested symbol.
    #[error("unknown symbol: {0}")]
    UnknownSymbol(String),
}

impl AnalysisError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
