//! End-to-end pipeline run.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, instrument};
use valuation_core::{FundamentalDataProvider, PriceDataProvider, Symbol, Workbook, Worksheet};

use crate::error::{PipelineError, Result};
use crate::prices::close_value_stock_monthly;
use crate::settings::RunOptions;
use crate::statements::{balance_sheet, income_statement};
use crate::symbols::load_symbols;

/// Outcome of a pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Symbols read from the symbol sheet, in processing order.
    pub symbols: Vec<Symbol>,
    /// Confirmation of each completed stage, in run order.
    pub stages: Vec<&'static str>,
}

impl RunReport {
    /// Returns true if no stage ran.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

async fn open_sheet(workbook: &dyn Workbook, title: &str) -> Result<Arc<dyn Worksheet>> {
    workbook
        .worksheet(title)
        .await
        .map_err(|source| PipelineError::Workbook {
            target: title.to_string(),
            source,
        })
}

/// Runs the balance-sheet, income-statement and close-price stages in order.
///
/// Symbols come from `options.symbols_sheet`. When there are none the run
/// ends without calling a provider or writing any sheet. The first failing
/// stage is returned wrapped in its [`PipelineError`] variant and the stages
/// after it do not run.
///
/// # Errors
/// See [`PipelineError`].
#[instrument(skip(workbook, fundamentals, prices), fields(workbook = workbook.title()))]
pub async fn run(
    workbook: &dyn Workbook,
    fundamentals: &dyn FundamentalDataProvider,
    prices: &dyn PriceDataProvider,
    options: &RunOptions,
    today: NaiveDate,
) -> Result<RunReport> {
    let symbol_sheet = open_sheet(workbook, &options.symbols_sheet).await?;
    let price_sheet = open_sheet(workbook, &options.close_price_sheet).await?;

    let symbols = load_symbols(symbol_sheet.as_ref(), &options.symbol_column)
        .await
        .map_err(|source| PipelineError::Symbols {
            sheet: options.symbols_sheet.clone(),
            source,
        })?;

    let mut report = RunReport {
        symbols,
        stages: Vec::new(),
    };
    if report.symbols.is_empty() {
        info!(sheet = %options.symbols_sheet, "No symbols to process");
        return Ok(report);
    }
    info!(count = report.symbols.len(), "Processing symbols");

    let message = balance_sheet(&report.symbols, fundamentals, workbook)
        .await
        .map_err(PipelineError::BalanceSheet)?;
    info!("{message}");
    report.stages.push(message);

    let message = income_statement(&report.symbols, fundamentals, workbook)
        .await
        .map_err(PipelineError::IncomeStatement)?;
    info!("{message}");
    report.stages.push(message);

    let message = close_value_stock_monthly(
        &report.symbols,
        prices,
        price_sheet.as_ref(),
        today,
        options.lookback_years,
    )
    .await
    .map_err(PipelineError::StockClosePrice)?;
    info!("{message}");
    report.stages.push(message);

    Ok(report)
}
