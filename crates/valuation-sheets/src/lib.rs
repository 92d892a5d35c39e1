#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/valuation/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Spreadsheet backends for the valuation workbook pipeline.
//!
//! This crate provides implementations of the [`Workbook`] trait from `valuation-core`:
//!
//! - [`GoogleWorkbook`] - Google Sheets over the REST API (default, requires `google` feature)
//! - [`InMemoryWorkbook`] - In-memory workbook for testing and dry runs

/// In-memory workbook implementation.
pub mod memory;

/// Service-account authentication.
#[cfg(feature = "google")]
pub mod auth;
/// Google Sheets workbook implementation.
#[cfg(feature = "google")]
pub mod google;

// Re-export the traits for convenience
pub use valuation_core::{Workbook, Worksheet};

// Re-export implementations
pub use memory::{InMemoryWorkbook, InMemoryWorksheet};

#[cfg(feature = "google")]
pub use auth::ServiceAccountKey;
#[cfg(feature = "google")]
pub use google::{GoogleWorkbook, GoogleWorksheet};
