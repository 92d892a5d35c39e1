//! Quarterly statement ingestion.
//!
//! One sheet per symbol and statement, fully rewritten on every run.

use polars::prelude::DataFrame;
use serde_json::{Map, Value};
use tracing::{debug, info};
use valuation_core::{
    CellAddress, FundamentalDataProvider, Result, StatementKind, Symbol, Workbook, table,
};

use crate::fields::fields_for;

/// Value written for missing statement cells.
const MISSING_VALUE: &str = "0";

/// Confirmation returned by [`balance_sheet`].
pub const BALANCE_SHEET_CREATED: &str = "Balance sheet created";

/// Confirmation returned by [`income_statement`].
pub const INCOME_STATEMENT_CREATED: &str = "Income statement sheet created";

/// Loads the quarterly balance sheets of `symbols` into the workbook.
///
/// # Errors
/// The first provider or sheet failure aborts the remaining symbols.
pub async fn balance_sheet(
    symbols: &[Symbol],
    provider: &dyn FundamentalDataProvider,
    workbook: &dyn Workbook,
) -> Result<&'static str> {
    ingest_statements(symbols, provider, workbook, StatementKind::BalanceSheet).await?;
    Ok(BALANCE_SHEET_CREATED)
}

/// Loads the quarterly income statements of `symbols` into the workbook.
///
/// # Errors
/// The first provider or sheet failure aborts the remaining symbols.
pub async fn income_statement(
    symbols: &[Symbol],
    provider: &dyn FundamentalDataProvider,
    workbook: &dyn Workbook,
) -> Result<&'static str> {
    ingest_statements(symbols, provider, workbook, StatementKind::IncomeStatement).await?;
    Ok(INCOME_STATEMENT_CREATED)
}

/// Fetches, normalizes and writes one statement for every symbol in order.
///
/// Each symbol's table goes to `<prefix><symbol>`, which is created when
/// absent and cleared before the write.
pub async fn ingest_statements(
    symbols: &[Symbol],
    provider: &dyn FundamentalDataProvider,
    workbook: &dyn Workbook,
    statement: StatementKind,
) -> Result<()> {
    for symbol in symbols {
        let reports = provider.fetch_quarterly_reports(symbol, statement).await?;
        debug!(symbol = %symbol, %statement, reports = reports.len(), "Fetched reports");

        let df = normalize_reports(&reports, statement)?;
        let sheet = workbook.worksheet_or_create(&statement.sheet_title(symbol)).await?;
        sheet.clear().await?;
        sheet.set_dataframe(&df, CellAddress::ORIGIN).await?;
        debug!(symbol = %symbol, sheet = sheet.title(), rows = df.height(), "Wrote statement");
    }

    info!(%statement, symbols = symbols.len(), "Statement sheets written");
    Ok(())
}

/// One row per report, columns renamed, missing cells zeroed.
fn normalize_reports(
    reports: &[Map<String, Value>],
    statement: StatementKind,
) -> Result<DataFrame> {
    let mut df = table::records_to_dataframe(reports)?;
    table::rename_columns(&mut df, &fields_for(statement))?;
    table::fill_missing(&df, MISSING_VALUE)
}
