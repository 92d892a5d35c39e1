//! Error types for data operations.
//!
//! This module defines [`DataError`] which covers every failure that can occur
//! while fetching payloads from a provider, reshaping them into tables, or
//! reading and writing workbook sheets.

use thiserror::Error;

/// Errors that can occur during data operations.
#[derive(Error, Debug)]
pub enum DataError {
    /// Network-related errors (connection failures, non-success status, etc.).
    #[error("Network error: {0}")]
    Network(String),

    /// The provider throttled the request.
    #[error("Rate limited by {provider}: {message}")]
    RateLimited {
        /// The provider that rate limited the request.
        provider: String,
        /// The notice returned by the provider.
        message: String,
    },

    /// The requested symbol was not found.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// A payload was missing a field the pipeline cannot do without.
    #[error("Response for {symbol} is missing field `{field}`")]
    MissingField {
        /// The symbol the payload was requested for.
        symbol: String,
        /// The absent field.
        field: String,
    },

    /// Error parsing data from a provider or a sheet.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Error reported by the spreadsheet backend.
    #[error("Sheet error: {0}")]
    Sheet(String),

    /// No worksheet with the given title exists in the workbook.
    #[error("Worksheet not found: {0}")]
    WorksheetNotFound(String),

    /// No workbook with the given title is visible to the credentials.
    #[error("Workbook not found: {0}")]
    WorkbookNotFound(String),

    /// Authentication failed for a provider or backend.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// An invalid parameter was provided.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

impl DataError {
    /// Returns true if this error means a worksheet lookup found nothing.
    #[must_use]
    pub const fn is_worksheet_not_found(&self) -> bool {
        matches!(self, Self::WorksheetNotFound(_))
    }
}

impl From<polars::prelude::PolarsError> for DataError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::Parse(err.to_string())
    }
}

/// Result type alias using [`DataError`].
pub type Result<T> = std::result::Result<T, DataError>;
