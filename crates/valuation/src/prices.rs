//! Monthly close-price ingestion into the shared price sheet.

use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::{debug, info};
use valuation_core::{
    CellAddress, PriceDataProvider, Result, Symbol, Worksheet, calendar, table,
};

/// Confirmation returned by [`close_value_stock_monthly`].
pub const STOCK_PRICES_ADDED: &str = "Stock prices added";

/// Columns identifying one close in the shared sheet.
const KEY_COLUMNS: [&str; 2] = ["date", "symbol"];

/// Appends month-end closes of `symbols` to `sheet`.
///
/// Only closes dated on a calendar month end within `years` years before
/// `now` are kept. Each symbol is merged into whatever the sheet holds at
/// that moment: a `(date, symbol)` pair already present is replaced by the
/// fetched value.
///
/// # Errors
/// The first provider or sheet failure aborts the remaining symbols.
pub async fn close_value_stock_monthly(
    symbols: &[Symbol],
    provider: &dyn PriceDataProvider,
    sheet: &dyn Worksheet,
    now: NaiveDate,
    years: u32,
) -> Result<&'static str> {
    let eligible: HashSet<String> = calendar::eligible_month_ends(now, years)
        .into_iter()
        .map(|d| d.format(calendar::DATE_FORMAT).to_string())
        .collect();

    for symbol in symbols {
        let closes = provider.fetch_monthly_closes(symbol).await?;
        let closes = table::filter_rows(&closes, "date", |date| {
            date.is_some_and(|d| eligible.contains(d))
        })?;
        let closes = table::with_constant_column(&closes, "symbol", symbol.as_str())?;
        debug!(symbol = %symbol, rows = closes.height(), "Month-end closes");

        let existing = sheet.get_all_records().await?;
        if existing.height() == 0 {
            sheet.set_dataframe(&closes, CellAddress::ORIGIN).await?;
            continue;
        }

        let merged = table::concat_by_name(&existing, &closes)?;
        let merged = table::drop_duplicates_keep_last(&merged, &KEY_COLUMNS)?;
        sheet.clear().await?;
        sheet.set_dataframe(&merged, CellAddress::ORIGIN).await?;
        debug!(symbol = %symbol, sheet = sheet.title(), rows = merged.height(), "Merged closes");
    }

    info!(sheet = sheet.title(), symbols = symbols.len(), "Close prices written");
    Ok(STOCK_PRICES_ADDED)
}
