//! Symbol list loading.

use tracing::debug;
use valuation_core::{Result, Symbol, Worksheet, table};

/// Reads the distinct symbols of `column` from `sheet`.
///
/// Symbols keep their first-seen order; blank cells are skipped. A sheet
/// without the column is a parse error.
pub async fn load_symbols(sheet: &dyn Worksheet, column: &str) -> Result<Vec<Symbol>> {
    let records = sheet.get_all_records().await?;
    if records.width() == 0 {
        debug!(sheet = sheet.title(), "Symbol sheet is empty");
        return Ok(Vec::new());
    }

    let mut symbols: Vec<Symbol> = Vec::new();
    for value in table::unique_values(&records, column)? {
        let symbol = Symbol::new(value);
        if !symbol.is_empty() && !symbols.contains(&symbol) {
            symbols.push(symbol);
        }
    }

    debug!(sheet = sheet.title(), count = symbols.len(), "Loaded symbols");
    Ok(symbols)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use valuation_core::{DataError, Workbook};
    use valuation_sheets::InMemoryWorkbook;

    #[tokio::test]
    async fn test_distinct_in_order() {
        let workbook = InMemoryWorkbook::new("Valoracion").with_sheet(
            "Main",
            vec![
                vec![json!("Symbol"), json!("Name")],
                vec![json!("MSFT"), json!("Microsoft")],
                vec![json!("AAPL"), json!("Apple")],
                vec![json!(" MSFT "), json!("Microsoft again")],
                vec![json!(""), json!("blank")],
                vec![json!("KO"), json!("Coca-Cola")],
            ],
        );
        let sheet = workbook.worksheet("Main").await.unwrap();
        let symbols = load_symbols(sheet.as_ref(), "Symbol").await.unwrap();
        assert_eq!(
            symbols,
            vec![Symbol::new("MSFT"), Symbol::new("AAPL"), Symbol::new("KO")]
        );
    }

    #[tokio::test]
    async fn test_header_only_sheet() {
        let workbook =
            InMemoryWorkbook::new("Valoracion").with_sheet("Main", vec![vec![json!("Symbol")]]);
        let sheet = workbook.worksheet("Main").await.unwrap();
        assert!(load_symbols(sheet.as_ref(), "Symbol").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_sheet() {
        let workbook = InMemoryWorkbook::new("Valoracion").with_sheet("Main", Vec::new());
        let sheet = workbook.worksheet("Main").await.unwrap();
        assert!(load_symbols(sheet.as_ref(), "Symbol").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_column() {
        let workbook = InMemoryWorkbook::new("Valoracion")
            .with_sheet("Main", vec![vec![json!("Ticker")], vec![json!("AAPL")]]);
        let sheet = workbook.worksheet("Main").await.unwrap();
        let err = load_symbols(sheet.as_ref(), "Symbol").await.unwrap_err();
        assert!(matches!(err, DataError::Parse(_)));
    }

    #[tokio::test]
    async fn test_gap_columns_in_header() {
        let workbook = InMemoryWorkbook::new("Valoracion").with_sheet(
            "Main",
            vec![
                vec![json!("Symbol"), json!(""), json!(""), json!("Notes")],
                vec![json!("AAPL"), json!(""), json!(""), json!("core")],
            ],
        );
        let sheet = workbook.worksheet("Main").await.unwrap();
        let symbols = load_symbols(sheet.as_ref(), "Symbol").await.unwrap();
        assert_eq!(symbols, vec![Symbol::new("AAPL")]);
    }
}
