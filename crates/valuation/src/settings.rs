//! Environment-based configuration.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use valuation_alphavantage::ALPHA_VANTAGE_BASE_URL;

use crate::error::{PipelineError, Result};

/// Default title of the valuation workbook.
pub const DEFAULT_WORKBOOK_TITLE: &str = "Valoracion";

/// Sheet and column names plus the price lookback used by a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Sheet listing the symbols to process.
    pub symbols_sheet: String,
    /// Column of the symbol sheet holding the tickers.
    pub symbol_column: String,
    /// Shared sheet receiving monthly closes.
    pub close_price_sheet: String,
    /// How many years of month-end closes to keep.
    pub lookback_years: u32,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            symbols_sheet: "Main".to_string(),
            symbol_column: "Symbol".to_string(),
            close_price_sheet: "stock_close_price".to_string(),
            lookback_years: 20,
        }
    }
}

/// Complete process configuration.
#[derive(Clone)]
pub struct Settings {
    /// Path of the Google service-account key file.
    pub credentials_path: PathBuf,
    /// Alpha Vantage API key.
    pub api_key: String,
    /// Title of the workbook to open.
    pub workbook_title: String,
    /// Spreadsheet id; skips the lookup by title when set.
    pub spreadsheet_id: Option<String>,
    /// Alpha Vantage base URL.
    pub api_base_url: String,
    /// Per-request timeout for Alpha Vantage calls.
    pub api_timeout: Option<Duration>,
    /// Sheet layout and lookback.
    pub run: RunOptions,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("credentials_path", &self.credentials_path)
            .field("api_key", &"[REDACTED]")
            .field("workbook_title", &self.workbook_title)
            .field("spreadsheet_id", &self.spreadsheet_id)
            .field("api_base_url", &self.api_base_url)
            .field("api_timeout", &self.api_timeout)
            .field("run", &self.run)
            .finish()
    }
}

impl Settings {
    /// Load settings from the process environment.
    ///
    /// # Errors
    /// Returns [`PipelineError::Config`] when a required variable is missing
    /// or a numeric variable does not parse.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary variable lookup.
    ///
    /// Empty values count as unset.
    ///
    /// # Errors
    /// See [`Settings::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = RunOptions::default();

        Ok(Self {
            credentials_path: required(&get, "GOOGLE_SERVICE_ACCOUNT_CREDENTIALS")?.into(),
            api_key: required(&get, "FINANCIAL_API_KEY")?,
            workbook_title: get("WORKBOOK_TITLE")
                .unwrap_or_else(|| DEFAULT_WORKBOOK_TITLE.to_string()),
            spreadsheet_id: get("SPREADSHEET_ID"),
            api_base_url: get("FINANCIAL_API_BASE_URL")
                .unwrap_or_else(|| ALPHA_VANTAGE_BASE_URL.to_string()),
            api_timeout: parsed::<u64, _>(&get, "FINANCIAL_API_TIMEOUT_SECS")?
                .map(Duration::from_secs),
            run: RunOptions {
                symbols_sheet: get("SYMBOLS_SHEET").unwrap_or(defaults.symbols_sheet),
                symbol_column: get("SYMBOL_COLUMN").unwrap_or(defaults.symbol_column),
                close_price_sheet: get("CLOSE_PRICE_SHEET").unwrap_or(defaults.close_price_sheet),
                lookback_years: parsed(&get, "CLOSE_PRICE_LOOKBACK_YEARS")?
                    .unwrap_or(defaults.lookback_years),
            },
        })
    }
}

fn required<F>(get: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    get(key).ok_or_else(|| PipelineError::Config(format!("{key} is not set")))
}

fn parsed<T, F>(get: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    get(key)
        .map(|v| {
            v.trim()
                .parse()
                .map_err(|e| PipelineError::Config(format!("{key}={v:?}: {e}")))
        })
        .transpose()
}
