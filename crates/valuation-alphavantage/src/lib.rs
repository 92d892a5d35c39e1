#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/valuation/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Alpha Vantage data provider.
//!
//! This crate implements the valuation-core provider traits for the
//! [Alpha Vantage](https://www.alphavantage.co/) `query` endpoint.
//!
//! # Usage
//!
//! ```rust,ignore
//! use valuation_alphavantage::AlphaVantageProvider;
//! use valuation_core::{FundamentalDataProvider, PriceDataProvider, StatementKind, Symbol};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = AlphaVantageProvider::new("your_api_key");
//!     let symbol = Symbol::new("AAPL");
//!
//!     // Raw quarterly balance-sheet reports
//!     let reports = provider
//!         .fetch_quarterly_reports(&symbol, StatementKind::BalanceSheet)
//!         .await?;
//!
//!     // Monthly closes as a (date, value) DataFrame
//!     let closes = provider.fetch_monthly_closes(&symbol).await?;
//!
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use polars::prelude::*;
use reqwest::{Client, Url};
use serde_json::{Map, Value};
use std::fmt;
use tracing::{debug, warn};
use valuation_core::{
    DataError, DataProvider, FundamentalDataProvider, PriceDataProvider, Result, StatementKind,
    Symbol, table,
};

/// Default base URL of the Alpha Vantage API.
pub const ALPHA_VANTAGE_BASE_URL: &str = "https://www.alphavantage.co";

/// Provider name used in errors and logs.
const PROVIDER_NAME: &str = "Alpha Vantage";

/// `function` parameter of the monthly time series endpoint.
const MONTHLY_FUNCTION: &str = "TIME_SERIES_MONTHLY";

/// Key holding the quarterly statement list.
const QUARTERLY_REPORTS: &str = "quarterlyReports";

/// Key holding the monthly series, keyed by date.
const MONTHLY_SERIES: &str = "Monthly Time Series";

/// Field of a monthly entry holding the closing price.
const CLOSE_FIELD: &str = "4. close";

/// Alpha Vantage data provider.
///
/// Provides access to:
/// - Quarterly balance sheets and income statements
/// - Monthly closing prices
#[derive(Clone)]
pub struct AlphaVantageProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl fmt::Debug for AlphaVantageProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlphaVantageProvider")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl AlphaVantageProvider {
    /// Create a new Alpha Vantage provider with the given API key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_client(Client::new(), api_key)
    }

    /// Create a new Alpha Vantage provider with a custom HTTP client.
    #[must_use]
    pub fn with_client(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: ALPHA_VANTAGE_BASE_URL.to_string(),
        }
    }

    /// Point the provider at a different API host.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Build the query URL for a function and symbol, API key included.
    fn url(&self, function: &str, symbol: &Symbol) -> Result<Url> {
        Url::parse_with_params(
            &format!("{}/query", self.base_url),
            &[
                ("function", function),
                ("symbol", symbol.as_str()),
                ("apikey", self.api_key.as_str()),
            ],
        )
        .map_err(|e| DataError::InvalidParameter(format!("{}: {e}", self.base_url)))
    }

    /// Make a GET request and parse the JSON response.
    async fn get(&self, function: &str, symbol: &Symbol) -> Result<Value> {
        let url = self.url(function, symbol)?;
        debug!(function, symbol = %symbol, "Alpha Vantage request");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DataError::Network(e.without_url().to_string()))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(DataError::RateLimited {
                provider: PROVIDER_NAME.to_string(),
                message: "HTTP 429".to_string(),
            });
        }

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(DataError::Network(format!("HTTP {status}: {text}")));
        }

        let text = response
            .text()
            .await
            .map_err(|e| DataError::Network(e.without_url().to_string()))?;

        serde_json::from_str(&text).map_err(|e| DataError::Parse(format!("{e}: {text}")))
    }
}

/// Removes `field` from an Alpha Vantage response body.
///
/// When the field is absent the body is inspected for the API's own error
/// and throttling notices, which are reported instead of a bare missing field.
fn take_field(body: Value, symbol: &Symbol, field: &str) -> Result<Value> {
    let mut body = match body {
        Value::Object(map) => map,
        other => {
            return Err(DataError::Parse(format!(
                "expected a JSON object for {symbol}, got {other}"
            )));
        }
    };

    if let Some(value) = body.remove(field) {
        return Ok(value);
    }

    if let Some(message) = body.get("Error Message").and_then(Value::as_str) {
        warn!(symbol = %symbol, message, "Alpha Vantage rejected the request");
        return Err(DataError::SymbolNotFound(symbol.to_string()));
    }

    if let Some(message) = ["Note", "Information"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
    {
        return Err(DataError::RateLimited {
            provider: PROVIDER_NAME.to_string(),
            message: message.to_string(),
        });
    }

    Err(DataError::MissingField {
        symbol: symbol.to_string(),
        field: field.to_string(),
    })
}

/// Extracts the quarterly report objects from a statement response.
fn parse_quarterly_reports(body: Value, symbol: &Symbol) -> Result<Vec<Map<String, Value>>> {
    let Value::Array(reports) = take_field(body, symbol, QUARTERLY_REPORTS)? else {
        return Err(DataError::Parse(format!(
            "`{QUARTERLY_REPORTS}` for {symbol} is not a list"
        )));
    };

    reports
        .into_iter()
        .map(|report| match report {
            Value::Object(map) => Ok(map),
            other => Err(DataError::Parse(format!(
                "quarterly report for {symbol} is not an object: {other}"
            ))),
        })
        .collect()
}

/// Converts a monthly series response into a `(date, value)` DataFrame.
///
/// Entries keep upstream order; an entry without a close yields a null value.
fn parse_monthly_closes(body: Value, symbol: &Symbol) -> Result<DataFrame> {
    let Value::Object(series) = take_field(body, symbol, MONTHLY_SERIES)? else {
        return Err(DataError::Parse(format!(
            "`{MONTHLY_SERIES}` for {symbol} is not an object"
        )));
    };

    let mut dates: Vec<String> = Vec::with_capacity(series.len());
    let mut closes: Vec<Option<String>> = Vec::with_capacity(series.len());
    for (date, entry) in series {
        closes.push(entry.get(CLOSE_FIELD).and_then(table::value_to_text));
        dates.push(date);
    }

    let df = DataFrame::new(vec![
        Column::new("date".into(), dates),
        Column::new("value".into(), closes),
    ])?;

    Ok(df)
}

impl DataProvider for AlphaVantageProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn description(&self) -> &str {
        "Alpha Vantage - Fundamental statements and time series API"
    }
}

#[async_trait]
impl FundamentalDataProvider for AlphaVantageProvider {
    async fn fetch_quarterly_reports(
        &self,
        symbol: &Symbol,
        statement: StatementKind,
    ) -> Result<Vec<Map<String, Value>>> {
        let body = self.get(statement.function(), symbol).await?;
        let reports = parse_quarterly_reports(body, symbol)?;
        debug!(
            symbol = %symbol,
            statement = %statement,
            reports = reports.len(),
            "Fetched quarterly reports"
        );
        Ok(reports)
    }
}

#[async_trait]
impl PriceDataProvider for AlphaVantageProvider {
    async fn fetch_monthly_closes(&self, symbol: &Symbol) -> Result<DataFrame> {
        let body = self.get(MONTHLY_FUNCTION, symbol).await?;
        let df = parse_monthly_closes(body, symbol)?;
        debug!(symbol = %symbol, rows = df.height(), "Fetched monthly closes");
        Ok(df)
    }
}
