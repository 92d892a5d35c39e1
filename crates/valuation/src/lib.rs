#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/valuation/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Valuation workbook pipeline.
//!
//! Reads the symbol list from the workbook, then runs three stages in order:
//!
//! - [`balance_sheet`] - one `balance_sheet_<SYMBOL>` sheet per symbol
//! - [`income_statement`] - one `income_statement_<SYMBOL>` sheet per symbol
//! - [`close_value_stock_monthly`] - month-end closes merged into a shared sheet
//!
//! [`run`] wires the stages together and maps each stage failure to its
//! [`PipelineError`] variant.
//!
//! # Example
//!
//! ```rust,ignore
//! use valuation::{RunOptions, Settings, run};
//! use valuation_alphavantage::AlphaVantageProvider;
//! use valuation_sheets::{GoogleWorkbook, ServiceAccountKey};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::from_env()?;
//!     let key = ServiceAccountKey::from_file(&settings.credentials_path)?;
//!     let workbook = GoogleWorkbook::open(key, &settings.workbook_title).await?;
//!     let provider = AlphaVantageProvider::new(&settings.api_key);
//!
//!     let today = chrono::Local::now().date_naive();
//!     let report = run(&workbook, &provider, &provider, &settings.run, today).await?;
//!     println!("{:?}", report.stages);
//!     Ok(())
//! }
//! ```

/// End-to-end pipeline run.
pub mod driver;
/// Pipeline error types.
pub mod error;
/// Statement column names.
pub mod fields;
/// Monthly close-price ingestion.
pub mod prices;
/// Environment-based configuration.
pub mod settings;
/// Quarterly statement ingestion.
pub mod statements;
/// Symbol list loading.
pub mod symbols;

#[cfg(test)]
mod testing;

// Core types and traits
pub use valuation_core::*;

pub use driver::{RunReport, run};
pub use error::PipelineError;
pub use fields::{BALANCE_SHEET_FIELDS, INCOME_STATEMENT_FIELDS};
pub use prices::close_value_stock_monthly;
pub use settings::{RunOptions, Settings};
pub use statements::{balance_sheet, income_statement, ingest_statements};
pub use symbols::load_symbols;
