//! The aggregation engine.
//!
//! Everything in this module is a pure function over the full transaction
//! list (plus bank accounts or configuration where stated). Derived views are
//! recomputed from scratch on every load; nothing here keeps state between
//! calls.

mod accounts;
mod dashboard;
mod groups;
mod personnel;

pub use accounts::{
    account_balances, converted_cash_total, reconciliation_report, unmatched_account_names,
    AccountBalance, ReconciliationReport,
};
pub use dashboard::{dashboard_stats, DashboardStats};
pub use groups::{
    expense_group_summaries, group_summaries, sort_group_summaries, ExpenseGroupSummary,
    FilteredExpenseView, GroupSort, GroupSummary,
};
pub use personnel::{personnel_summaries, personnel_summary, PersonnelSummary, QuarterlyStat};

use crate::model::Currency;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The label substituted for an empty `group` or `client` field.
pub const GENERAL_LABEL: &str = "Genel";

/// Exchange rates used to express foreign-currency balances in TRY.
///
/// The defaults are the rates the legacy dashboard had hardcoded. They are
/// stale by construction; operators should override them in config.json.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct FxRates {
    pub usd_try: Decimal,
    pub eur_try: Decimal,
}

impl Default for FxRates {
    fn default() -> Self {
        Self {
            usd_try: Decimal::new(345, 1),
            eur_try: Decimal::new(362, 1),
        }
    }
}

impl FxRates {
    /// Converts `value` in `currency` to its TRY equivalent.
    pub fn to_try(&self, value: Decimal, currency: Currency) -> Decimal {
        match currency {
            Currency::Try => value,
            Currency::Usd => value * self.usd_try,
            Currency::Eur => value * self.eur_try,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rates_match_legacy_constants() {
        let fx = FxRates::default();
        assert_eq!(fx.usd_try, Decimal::new(345, 1));
        assert_eq!(fx.eur_try, Decimal::new(362, 1));
    }

    #[test]
    fn test_to_try_conversion() {
        let fx = FxRates::default();
        assert_eq!(fx.to_try(Decimal::from(10), Currency::Try), Decimal::from(10));
        assert_eq!(
            fx.to_try(Decimal::from(10), Currency::Usd),
            Decimal::new(345, 0)
        );
        assert_eq!(
            fx.to_try(Decimal::from(10), Currency::Eur),
            Decimal::new(362, 0)
        );
    }
}
