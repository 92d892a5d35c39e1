#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/valuation/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core traits and types for the valuation workbook pipeline.
//!
//! This crate provides the abstractions shared by providers, spreadsheet
//! backends and the pipeline:
//!
//! - [`DataProvider`](provider::DataProvider) - Base trait for all providers
//! - [`FundamentalDataProvider`](provider::FundamentalDataProvider) - Quarterly statements
//! - [`PriceDataProvider`](provider::PriceDataProvider) - Monthly closing prices
//! - [`Workbook`](workbook::Workbook) / [`Worksheet`](workbook::Worksheet) - Spreadsheet backends
//! - [`table`] - DataFrame reshaping helpers
//! - [`calendar`] - Month-end sampling grid

/// A1 cell addressing.
pub mod address;
/// Month-end calendar helpers.
pub mod calendar;
/// Error types for data operations.
pub mod error;
/// Provider traits for fetching market data.
pub mod provider;
/// DataFrame helpers for normalizing payloads and sheet contents.
pub mod table;
/// Core data types (Symbol, StatementKind).
pub mod types;
/// Spreadsheet backend traits.
pub mod workbook;

// Re-export commonly used items at crate root
pub use address::CellAddress;
pub use error::{DataError, Result};
pub use provider::{DataProvider, FundamentalDataProvider, PriceDataProvider};
pub use table::FieldMap;
pub use types::{StatementKind, Symbol};
pub use workbook::{Workbook, Worksheet};
