//! In-test provider double.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use polars::prelude::*;
use serde_json::{Map, Value};
use valuation_core::{
    DataError, DataProvider, FundamentalDataProvider, PriceDataProvider, Result, StatementKind,
    Symbol,
};

/// Canned responses keyed by symbol; unknown symbols are `SymbolNotFound`.
#[derive(Debug, Default)]
pub(crate) struct FakeProvider {
    reports: HashMap<(String, StatementKind), Vec<Map<String, Value>>>,
    closes: HashMap<String, Vec<(String, String)>>,
    statement_calls: AtomicUsize,
    price_calls: AtomicUsize,
}

impl FakeProvider {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_report(self, symbol: &str, statement: StatementKind, report: Value) -> Self {
        let report = report.as_object().cloned().unwrap();
        self.with_reports(symbol, statement, vec![report])
    }

    pub(crate) fn with_reports(
        mut self,
        symbol: &str,
        statement: StatementKind,
        reports: Vec<Map<String, Value>>,
    ) -> Self {
        self.reports.insert((symbol.to_string(), statement), reports);
        self
    }

    pub(crate) fn with_closes(mut self, symbol: &str, closes: &[(&str, &str)]) -> Self {
        self.closes.insert(
            symbol.to_string(),
            closes
                .iter()
                .map(|(d, v)| ((*d).to_string(), (*v).to_string()))
                .collect(),
        );
        self
    }

    pub(crate) fn statement_calls(&self) -> usize {
        self.statement_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn price_calls(&self) -> usize {
        self.price_calls.load(Ordering::SeqCst)
    }
}

impl DataProvider for FakeProvider {
    fn name(&self) -> &str {
        "Fake"
    }

    fn description(&self) -> &str {
        "Canned statements and closes"
    }
}

#[async_trait]
impl FundamentalDataProvider for FakeProvider {
    async fn fetch_quarterly_reports(
        &self,
        symbol: &Symbol,
        statement: StatementKind,
    ) -> Result<Vec<Map<String, Value>>> {
        self.statement_calls.fetch_add(1, Ordering::SeqCst);
        self.reports
            .get(&(symbol.to_string(), statement))
            .cloned()
            .ok_or_else(|| DataError::SymbolNotFound(symbol.to_string()))
    }
}

#[async_trait]
impl PriceDataProvider for FakeProvider {
    async fn fetch_monthly_closes(&self, symbol: &Symbol) -> Result<DataFrame> {
        self.price_calls.fetch_add(1, Ordering::SeqCst);
        let closes = self
            .closes
            .get(symbol.as_str())
            .ok_or_else(|| DataError::SymbolNotFound(symbol.to_string()))?;
        let dates: Vec<&str> = closes.iter().map(|(d, _)| d.as_str()).collect();
        let values: Vec<&str> = closes.iter().map(|(_, v)| v.as_str()).collect();
        Ok(DataFrame::new(vec![
            Column::new("date".into(), dates),
            Column::new("value".into(), values),
        ])?)
    }
}
