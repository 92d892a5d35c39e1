//! In-memory workbook implementation.

use async_trait::async_trait;
use polars::prelude::DataFrame;
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};
use valuation_core::{CellAddress, DataError, Result, Workbook, Worksheet, table};

/// Cell grid of one worksheet, row-major.
type Grid = Vec<Vec<Value>>;

/// A worksheet title paired with its shared grid.
type Sheet = (String, Arc<RwLock<Grid>>);

/// Simple in-memory workbook for testing and dry runs.
///
/// Sheets are `RwLock`-protected cell grids and are lost when the workbook is
/// dropped. Every mutating call (sheet creation, clear, write) is counted so
/// callers can assert that nothing was touched.
#[derive(Debug)]
pub struct InMemoryWorkbook {
    title: String,
    sheets: RwLock<Vec<Sheet>>,
    mutations: Arc<AtomicUsize>,
}

impl InMemoryWorkbook {
    /// Create a new workbook without sheets.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            sheets: RwLock::new(Vec::new()),
            mutations: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Add a sheet holding `rows` (not counted as a mutation).
    #[must_use]
    pub fn with_sheet(mut self, title: impl Into<String>, rows: Vec<Vec<Value>>) -> Self {
        self.sheets
            .get_mut()
            .push((title.into(), Arc::new(RwLock::new(rows))));
        self
    }

    /// Titles of all sheets in creation order.
    pub async fn sheet_titles(&self) -> Vec<String> {
        self.sheets
            .read()
            .await
            .iter()
            .map(|(title, _)| title.clone())
            .collect()
    }

    /// Raw cell grid of a sheet, if it exists.
    pub async fn rows(&self, title: &str) -> Option<Vec<Vec<Value>>> {
        let grid = self.grid(title).await?;
        let rows = grid.read().await.clone();
        Some(rows)
    }

    /// Number of mutating operations performed so far.
    #[must_use]
    pub fn mutations(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }

    async fn grid(&self, title: &str) -> Option<Arc<RwLock<Grid>>> {
        self.sheets
            .read()
            .await
            .iter()
            .find(|(t, _)| t == title)
            .map(|(_, grid)| Arc::clone(grid))
    }

    fn handle(&self, title: &str, grid: Arc<RwLock<Grid>>) -> Arc<dyn Worksheet> {
        Arc::new(InMemoryWorksheet {
            title: title.to_string(),
            grid,
            mutations: Arc::clone(&self.mutations),
        })
    }
}

#[async_trait]
impl Workbook for InMemoryWorkbook {
    fn title(&self) -> &str {
        &self.title
    }

    #[instrument(skip(self))]
    async fn worksheet(&self, title: &str) -> Result<Arc<dyn Worksheet>> {
        match self.grid(title).await {
            Some(grid) => Ok(self.handle(title, grid)),
            None => {
                debug!("Worksheet not found");
                Err(DataError::WorksheetNotFound(title.to_string()))
            }
        }
    }

    #[instrument(skip(self))]
    async fn add_worksheet(&self, title: &str) -> Result<Arc<dyn Worksheet>> {
        let mut sheets = self.sheets.write().await;
        if sheets.iter().any(|(t, _)| t == title) {
            return Err(DataError::Sheet(format!(
                "A sheet with the name \"{title}\" already exists"
            )));
        }

        let grid = Arc::new(RwLock::new(Grid::new()));
        sheets.push((title.to_string(), Arc::clone(&grid)));
        self.mutations.fetch_add(1, Ordering::SeqCst);
        warn!(sheet = title, "Created worksheet");
        Ok(self.handle(title, grid))
    }
}

/// Handle to one sheet of an [`InMemoryWorkbook`].
#[derive(Debug)]
pub struct InMemoryWorksheet {
    title: String,
    grid: Arc<RwLock<Grid>>,
    mutations: Arc<AtomicUsize>,
}

#[async_trait]
impl Worksheet for InMemoryWorksheet {
    fn title(&self) -> &str {
        &self.title
    }

    #[instrument(skip(self))]
    async fn get_all_records(&self) -> Result<DataFrame> {
        let grid = self.grid.read().await;
        let df = table::rows_to_dataframe(&grid)?;
        debug!(sheet = %self.title, rows = df.height(), "Read records");
        Ok(df)
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<()> {
        self.grid.write().await.clear();
        self.mutations.fetch_add(1, Ordering::SeqCst);
        debug!(sheet = %self.title, "Cleared worksheet");
        Ok(())
    }

    #[instrument(skip(self, df))]
    async fn set_dataframe(&self, df: &DataFrame, anchor: CellAddress) -> Result<()> {
        let rows = table::dataframe_to_rows(df)?;
        let mut grid = self.grid.write().await;

        for (i, row) in rows.into_iter().enumerate() {
            let target = anchor.row + i;
            if grid.len() <= target {
                grid.resize(target + 1, Vec::new());
            }
            let line = &mut grid[target];
            for (j, value) in row.into_iter().enumerate() {
                let column = anchor.column + j;
                if line.len() <= column {
                    line.resize(column + 1, Value::Null);
                }
                line[column] = value;
            }
        }

        self.mutations.fetch_add(1, Ordering::SeqCst);
        debug!(sheet = %self.title, rows = df.height(), "Wrote records");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;
    use serde_json::json;

    fn prices() -> DataFrame {
        DataFrame::new(vec![
            Column::new("date".into(), vec!["2024-01-31", "2024-02-29"]),
            Column::new("value".into(), vec!["148", "150.5"]),
        ])
        .unwrap()
    }

    #[tokio::test]
    async fn test_missing_worksheet() {
        let workbook = InMemoryWorkbook::new("Valoracion");
        let err = workbook.worksheet("Main").await.unwrap_err();
        assert!(err.is_worksheet_not_found());
        assert_eq!(workbook.mutations(), 0);
    }

    #[tokio::test]
    async fn test_worksheet_or_create() {
        let workbook = InMemoryWorkbook::new("Valoracion")
            .with_sheet("Main", vec![vec![json!("Symbol")], vec![json!("AAPL")]]);

        let existing = workbook.worksheet_or_create("Main").await.unwrap();
        assert_eq!(existing.title(), "Main");
        assert_eq!(workbook.mutations(), 0);

        let created = workbook
            .worksheet_or_create("balance_sheet_AAPL")
            .await
            .unwrap();
        assert_eq!(created.title(), "balance_sheet_AAPL");
        assert_eq!(
            workbook.sheet_titles().await,
            vec!["Main", "balance_sheet_AAPL"]
        );
        assert_eq!(workbook.mutations(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_sheet_rejected() {
        let workbook = InMemoryWorkbook::new("Valoracion").with_sheet("Main", Vec::new());
        assert!(workbook.add_worksheet("Main").await.is_err());
    }

    #[tokio::test]
    async fn test_write_read_clear() {
        let workbook = InMemoryWorkbook::new("Valoracion");
        let sheet = workbook.add_worksheet("stock_close_price").await.unwrap();

        sheet.set_dataframe(&prices(), CellAddress::ORIGIN).await.unwrap();
        assert_eq!(
            workbook.rows("stock_close_price").await.unwrap(),
            vec![
                vec![json!("date"), json!("value")],
                vec![json!("2024-01-31"), json!(148)],
                vec![json!("2024-02-29"), json!(150.5)],
            ]
        );

        let df = sheet.get_all_records().await.unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(
            table::unique_values(&df, "value").unwrap(),
            vec!["148", "150.5"]
        );

        sheet.clear().await.unwrap();
        assert_eq!(sheet.get_all_records().await.unwrap().height(), 0);
        assert_eq!(workbook.mutations(), 3);
    }

    #[tokio::test]
    async fn test_write_at_offset() {
        let workbook = InMemoryWorkbook::new("Valoracion");
        let sheet = workbook.add_worksheet("offset").await.unwrap();
        sheet
            .set_dataframe(&prices(), "B2".parse().unwrap())
            .await
            .unwrap();

        let rows = workbook.rows("offset").await.unwrap();
        assert_eq!(rows.len(), 4);
        assert!(rows[0].is_empty());
        assert_eq!(rows[1], vec![Value::Null, json!("date"), json!("value")]);
    }
}
