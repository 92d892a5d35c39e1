//! Source-to-sheet column names of the quarterly statements.
//!
//! Alpha Vantage reports use camelCase keys; the workbook uses snake_case
//! headers. Keys missing from these tables are written under their source
//! name.

use valuation_core::{FieldMap, StatementKind};

/// Balance-sheet column names.
pub const BALANCE_SHEET_FIELDS: FieldMap = FieldMap::new(&[
    ("fiscalDateEnding", "fiscal_date_ending"),
    ("reportedCurrency", "reported_currency"),
    ("totalAssets", "total_assets"),
    ("totalCurrentAssets", "total_current_assets"),
    (
        "cashAndCashEquivalentsAtCarryingValue",
        "cash_and_cash_equivalents_at_carrying_value",
    ),
    ("cashAndShortTermInvestments", "cash_and_short_term_investments"),
    ("inventory", "inventory"),
    ("currentNetReceivables", "current_net_receivables"),
    ("totalNonCurrentAssets", "total_non_current_assets"),
    ("propertyPlantEquipment", "property_plant_and_equipment"),
    (
        "accumulatedDepreciationAmortizationPPE",
        "accumulated_depreciation_amortization_ppe",
    ),
    ("intangibleAssets", "intangible_assets"),
    (
        "intangibleAssetsExcludingGoodwill",
        "intangible_assets_excluding_goodwill",
    ),
    ("goodwill", "goodwill"),
    ("investments", "investments"),
    ("longTermInvestments", "long_term_investments"),
    ("shortTermInvestments", "short_term_investments"),
    ("otherCurrentAssets", "other_current_assets"),
    ("otherNonCurrentAssets", "other_non_current_assets"),
    ("totalLiabilities", "total_liabilities"),
    ("totalCurrentLiabilities", "total_current_liabilities"),
    ("currentAccountsPayable", "current_accounts_payable"),
    ("deferredRevenue", "deferred_revenue"),
    ("currentDebt", "current_debt"),
    ("shortTermDebt", "short_term_debt"),
    ("totalNonCurrentLiabilities", "total_non_current_liabilities"),
    ("capitalLeaseObligations", "capital_lease_obligations"),
    ("longTermDebt", "long_term_debt"),
    ("currentLongTermDebt", "current_long_term_debt"),
    ("longTermDebtNoncurrent", "long_term_debt_noncurrent"),
    ("shortLongTermDebtTotal", "short_long_term_debt_total"),
    ("otherCurrentLiabilities", "other_current_liabilities"),
    ("otherNonCurrentLiabilities", "other_non_current_liabilities"),
    ("totalShareholderEquity", "total_shareholder_equity"),
    ("treasuryStock", "treasury_stock"),
    ("retainedEarnings", "retained_earnings"),
    ("commonStock", "common_stock"),
    ("commonStockSharesOutstanding", "common_stock_shares_outstanding"),
]);

/// Income-statement column names.
pub const INCOME_STATEMENT_FIELDS: FieldMap = FieldMap::new(&[
    ("fiscalDateEnding", "fiscal_date_ending"),
    ("reportedCurrency", "reported_currency"),
    ("grossProfit", "gross_profit"),
    ("totalRevenue", "total_revenue"),
    ("costOfRevenue", "cost_of_revenue"),
    ("costofGoodsAndServicesSold", "cost_of_goods_and_services_sold"),
    ("operatingIncome", "operating_income"),
    (
        "sellingGeneralAndAdministrative",
        "selling_general_and_administrative",
    ),
    ("researchAndDevelopment", "research_and_development"),
    ("operatingExpenses", "operating_expenses"),
    ("investmentIncomeNet", "investment_income_net"),
    ("netInterestIncome", "net_interest_income"),
    ("interestIncome", "interest_income"),
    ("interestExpense", "interest_expense"),
    ("nonInterestIncome", "non_interest_income"),
    ("otherNonOperatingIncome", "other_non_operating_income"),
    ("depreciation", "depreciation"),
    ("depreciationAndAmortization", "depreciation_and_amortization"),
    ("incomeBeforeTax", "income_before_tax"),
    ("incomeTaxExpense", "income_tax_expense"),
    ("interestAndDebtExpense", "interest_and_debt_expense"),
    (
        "netIncomeFromContinuingOperations",
        "net_income_from_continuing_operations",
    ),
    ("comprehensiveIncomeNetOfTax", "comprehensive_income_net_of_tax"),
    ("ebit", "ebit"),
    ("ebitda", "ebitda"),
    ("netIncome", "net_income"),
]);

/// Column names used for `statement`.
#[must_use]
pub const fn fields_for(statement: StatementKind) -> FieldMap {
    match statement {
        StatementKind::BalanceSheet => BALANCE_SHEET_FIELDS,
        StatementKind::IncomeStatement => INCOME_STATEMENT_FIELDS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_table_sizes() {
        assert_eq!(BALANCE_SHEET_FIELDS.len(), 38);
        assert_eq!(INCOME_STATEMENT_FIELDS.len(), 26);
    }

    #[test]
    fn test_names_are_unique() {
        for fields in [BALANCE_SHEET_FIELDS, INCOME_STATEMENT_FIELDS] {
            let sources: HashSet<_> = fields.pairs().iter().map(|(s, _)| s).collect();
            let targets: HashSet<_> = fields.pairs().iter().map(|(_, t)| t).collect();
            assert_eq!(sources.len(), fields.len());
            assert_eq!(targets.len(), fields.len());
        }
    }

    #[test]
    fn test_targets_are_snake_case() {
        for fields in [BALANCE_SHEET_FIELDS, INCOME_STATEMENT_FIELDS] {
            for (_, target) in fields.pairs() {
                assert!(
                    target
                        .chars()
                        .all(|c| c.is_ascii_lowercase() || c == '_'),
                    "{target}"
                );
            }
        }
    }

    #[test]
    fn test_irregular_names() {
        assert_eq!(
            BALANCE_SHEET_FIELDS.get("propertyPlantEquipment"),
            Some("property_plant_and_equipment")
        );
        assert_eq!(
            INCOME_STATEMENT_FIELDS.get("costofGoodsAndServicesSold"),
            Some("cost_of_goods_and_services_sold")
        );
        assert_eq!(BALANCE_SHEET_FIELDS.normalize("newField"), "newField");
    }

    #[test]
    fn test_fields_for() {
        assert_eq!(fields_for(StatementKind::BalanceSheet).len(), 38);
        assert_eq!(
            fields_for(StatementKind::IncomeStatement).get("ebitda"),
            Some("ebitda")
        );
    }
}
