//! Core data types shared by providers, backends and the pipeline.
//!
//! - [`Symbol`] - Trading symbol/ticker
//! - [`StatementKind`] - Which quarterly financial statement to ingest

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A trading symbol/ticker.
///
/// Surrounding whitespace is trimmed on creation; case is preserved because
/// destination sheet titles are derived from the symbol verbatim.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Symbol(String);

impl Symbol {
    /// Creates a new symbol from a string.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        let s = s.into();
        let trimmed = s.trim();
        if trimmed.len() == s.len() {
            Self(s)
        } else {
            Self(trimmed.to_string())
        }
    }

    /// Returns the symbol as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the symbol is blank.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Symbol {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Quarterly financial statement families ingested into per-symbol sheets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatementKind {
    /// Assets, liabilities and shareholder equity.
    BalanceSheet,
    /// Revenue, expenses and earnings.
    IncomeStatement,
}

impl StatementKind {
    /// The upstream `function` query parameter for this statement.
    #[must_use]
    pub const fn function(&self) -> &'static str {
        match self {
            Self::BalanceSheet => "BALANCE_SHEET",
            Self::IncomeStatement => "INCOME_STATEMENT",
        }
    }

    /// Prefix of the per-symbol destination sheet title.
    #[must_use]
    pub const fn sheet_prefix(&self) -> &'static str {
        match self {
            Self::BalanceSheet => "balance_sheet_",
            Self::IncomeStatement => "income_statement_",
        }
    }

    /// Human readable name used in logs.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::BalanceSheet => "balance sheet",
            Self::IncomeStatement => "income statement",
        }
    }

    /// Title of the destination sheet for `symbol`.
    #[must_use]
    pub fn sheet_title(&self, symbol: &Symbol) -> String {
        format!("{}{}", self.sheet_prefix(), symbol.as_str())
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_trims_and_preserves_case() {
        let symbol = Symbol::new("  brk.b ");
        assert_eq!(symbol.as_str(), "brk.b");
        assert_eq!(symbol.to_string(), "brk.b");
        assert!(Symbol::new("   ").is_empty());
    }

    #[test]
    fn test_symbol_from_str() {
        let symbol: Symbol = "AAPL".parse().unwrap();
        assert_eq!(symbol, Symbol::from("AAPL"));
        assert_eq!(symbol, Symbol::from(String::from("AAPL")));
    }

    #[test]
    fn test_statement_sheet_titles() {
        let symbol = Symbol::new("AAPL");
        assert_eq!(
            StatementKind::BalanceSheet.sheet_title(&symbol),
            "balance_sheet_AAPL"
        );
        assert_eq!(
            StatementKind::IncomeStatement.sheet_title(&symbol),
            "income_statement_AAPL"
        );
    }

    #[test]
    fn test_statement_functions() {
        assert_eq!(StatementKind::BalanceSheet.function(), "BALANCE_SHEET");
        assert_eq!(StatementKind::IncomeStatement.function(), "INCOME_STATEMENT");
    }
}
