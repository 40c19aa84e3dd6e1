use thiserror::Error;

/// Error taxonomy for the decision core.
///
/// A vetoed trade or a no-trade selection is NOT an error: those are normal
/// results carrying a reason string. Only broken inputs and broken math land
/// here.
#[derive(Error, Debug)]
pub enum DecisionError {
    /// Bad market data: insufficient rows, NaN/Inf, degenerate series.
    #[error("Data quality: {0}")]
    DataQuality(String),

    /// Contract violation at a component boundary.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A computation produced a non-finite value.
    #[error("Numeric error: {0}")]
    Numeric(String),

    /// Trade memory persistence failure.
    #[error("Store error: {0}")]
    Store(String),
}
