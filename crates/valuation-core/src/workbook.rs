//! Spreadsheet backend traits.
//!
//! This module defines the [`Workbook`] and [`Worksheet`] traits that give the
//! pipeline a uniform view over a spreadsheet: tabs are looked up by title,
//! read back as tables, cleared, and overwritten from a [`DataFrame`].

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use polars::prelude::DataFrame;

use crate::{address::CellAddress, error::Result};

/// A single tab of a workbook.
#[async_trait]
pub trait Worksheet: Send + Sync + Debug {
    /// Returns the title of this worksheet.
    fn title(&self) -> &str;

    /// Reads every row of the sheet as a table.
    ///
    /// The first row is the header. Fully empty rows are skipped and short
    /// rows are padded with nulls. An empty sheet yields an empty table.
    async fn get_all_records(&self) -> Result<DataFrame>;

    /// Removes every value from the sheet.
    async fn clear(&self) -> Result<()>;

    /// Writes `df` with its header row, top-left cell at `anchor`.
    async fn set_dataframe(&self, df: &DataFrame, anchor: CellAddress) -> Result<()>;
}

/// A spreadsheet file holding named worksheets.
#[async_trait]
pub trait Workbook: Send + Sync + Debug {
    /// Returns the title of this workbook.
    fn title(&self) -> &str;

    /// Looks up a worksheet by title.
    ///
    /// Fails with [`DataError::WorksheetNotFound`](crate::DataError::WorksheetNotFound)
    /// when no tab has that title.
    async fn worksheet(&self, title: &str) -> Result<Arc<dyn Worksheet>>;

    /// Creates a new empty worksheet.
    async fn add_worksheet(&self, title: &str) -> Result<Arc<dyn Worksheet>>;

    /// Looks up a worksheet by title, creating it when absent.
    ///
    /// Any lookup failure other than "not found" is returned unchanged.
    async fn worksheet_or_create(&self, title: &str) -> Result<Arc<dyn Worksheet>> {
        match self.worksheet(title).await {
            Ok(sheet) => Ok(sheet),
            Err(e) if e.is_worksheet_not_found() => self.add_worksheet(title).await,
            Err(e) => Err(e),
        }
    }
}
