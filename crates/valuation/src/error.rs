//! Pipeline error types.

use thiserror::Error;
use valuation_core::DataError;

/// Errors reported by a pipeline run.
///
/// Each stage wraps the first failure it hits; the underlying [`DataError`]
/// stays reachable through [`std::error::Error::source`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The balance-sheet stage failed.
    #[error("An error occurred while fetching the balance sheet")]
    BalanceSheet(#[source] DataError),

    /// The income-statement stage failed.
    #[error("An error occurred while fetching the income statement sheet")]
    IncomeStatement(#[source] DataError),

    /// The close-price stage failed.
    #[error("An error occurred while fetching the stock close price sheet")]
    StockClosePrice(#[source] DataError),

    /// The symbol list could not be read.
    #[error("Failed to load symbols from sheet `{sheet}`")]
    Symbols {
        /// Sheet holding the symbol list.
        sheet: String,
        /// Underlying failure.
        #[source]
        source: DataError,
    },

    /// The workbook or one of its fixed sheets could not be opened.
    #[error("Failed to open `{target}`")]
    Workbook {
        /// Workbook or sheet title.
        target: String,
        /// Underlying failure.
        #[source]
        source: DataError,
    },

    /// Missing or invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for pipeline runs.
pub type Result<T> = std::result::Result<T, PipelineError>;
