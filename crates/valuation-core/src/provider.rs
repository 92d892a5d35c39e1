//! Provider traits for fetching market data.
//!
//! This module defines the core provider traits:
//!
//! - [`DataProvider`] - Base trait for all data providers
//! - [`FundamentalDataProvider`] - Quarterly financial statements
//! - [`PriceDataProvider`] - Monthly closing prices

use async_trait::async_trait;
use polars::prelude::DataFrame;
use serde_json::{Map, Value};
use std::fmt::Debug;

use crate::{
    error::Result,
    types::{StatementKind, Symbol},
};

/// Base trait for all data providers.
pub trait DataProvider: Send + Sync + Debug {
    /// Returns the name of this provider (e.g., "Alpha Vantage").
    fn name(&self) -> &str;

    /// Returns a description of this provider.
    fn description(&self) -> &str;
}

/// Provider for quarterly fundamental data.
#[async_trait]
pub trait FundamentalDataProvider: DataProvider {
    /// Fetches the raw quarterly reports of one statement for a symbol.
    ///
    /// Reports are returned in upstream order with their source field names
    /// and values untouched.
    async fn fetch_quarterly_reports(
        &self,
        symbol: &Symbol,
        statement: StatementKind,
    ) -> Result<Vec<Map<String, Value>>>;
}

/// Provider for monthly price data.
#[async_trait]
pub trait PriceDataProvider: DataProvider {
    /// Fetches the monthly closing price series for a symbol.
    ///
    /// Returns a DataFrame with string columns: date (`%Y-%m-%d`), value.
    async fn fetch_monthly_closes(&self, symbol: &Symbol) -> Result<DataFrame>;
}
