//! Personnel summaries and quarterly profit share.
//!
//! The profit share ("hakediş") is a configured percentage of a person's
//! quarterly net: income minus expense over the Income/Expense transactions
//! attributed to them. Debt, Receivable and Current rows feed the personal
//! running account instead and never enter a quarter.

use crate::model::{Amount, Personnel, Transaction, TransactionKind};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// One calendar quarter of a person's operational activity.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct QuarterlyStat {
    pub year: i32,
    /// 1 through 4; January through March is Q1.
    pub quarter: u32,
    pub total_income: Amount,
    pub total_expense: Amount,
    /// `total_income - total_expense`.
    pub net_balance: Amount,
    /// `net_balance × bonus_percentage / 100`.
    pub share_amount: Amount,
}

/// Everything the personnel page shows for one staff member.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PersonnelSummary {
    pub name: String,
    pub income: Amount,
    pub expense: Amount,
    pub debt: Amount,
    pub receivable: Amount,
    /// `debt - receivable`. Positive means the person owes the office.
    pub current_balance: Amount,
    /// Most recent quarter first.
    pub quarters: Vec<QuarterlyStat>,
    /// Sum of `share_amount` over quarters in the given calendar year.
    pub current_year_share: Amount,
    /// Debt / Receivable / Current rows, the personal running-account view.
    pub ledger_transactions: Vec<Transaction>,
    /// Income / Expense rows, the operational view. Rendered separately from
    /// the ledger view, never merged.
    pub operational_transactions: Vec<Transaction>,
}

/// Splits an ISO date into (year, quarter). None when the string does not
/// start with a parsable `YYYY-MM`.
pub fn year_and_quarter(date: &str) -> Option<(i32, u32)> {
    let year: i32 = date.get(0..4)?.parse().ok()?;
    let month: u32 = date.get(5..7)?.parse().ok()?;
    if !(1..=12).contains(&month) {
        return None;
    }
    Some((year, (month - 1) / 3 + 1))
}

/// Computes the full summary for one person.
///
/// `current_year` is injected rather than read from the clock so the share
/// column is testable; callers pass the current calendar year.
pub fn personnel_summary(
    person: &Personnel,
    transactions: &[Transaction],
    current_year: i32,
) -> PersonnelSummary {
    let mut summary = PersonnelSummary {
        name: person.full_name.clone(),
        ..PersonnelSummary::default()
    };

    // (year, quarter) -> (income, expense). BTreeMap gives ascending order;
    // reversed below for the most-recent-first display order.
    let mut quarters: BTreeMap<(i32, u32), (Amount, Amount)> = BTreeMap::new();

    for t in transactions
        .iter()
        .filter(|t| t.is_counted() && t.personnel == person.full_name)
    {
        match t.kind {
            TransactionKind::Income | TransactionKind::Expense => {
                if t.kind == TransactionKind::Income {
                    summary.income += t.amount;
                } else {
                    summary.expense += t.amount;
                }
                match year_and_quarter(&t.date) {
                    Some(key) => {
                        let bucket = quarters.entry(key).or_default();
                        if t.kind == TransactionKind::Income {
                            bucket.0 += t.amount;
                        } else {
                            bucket.1 += t.amount;
                        }
                    }
                    None => warn!(
                        "Transaction {} has unusable date '{}', skipped for quarterly stats",
                        t.transaction_number, t.date
                    ),
                }
                summary.operational_transactions.push(t.clone());
            }
            TransactionKind::Debt => {
                summary.debt += t.amount;
                summary.ledger_transactions.push(t.clone());
            }
            TransactionKind::Receivable => {
                summary.receivable += t.amount;
                summary.ledger_transactions.push(t.clone());
            }
            TransactionKind::Current => {
                summary.ledger_transactions.push(t.clone());
            }
        }
    }

    summary.current_balance = summary.debt - summary.receivable;

    for ((year, quarter), (total_income, total_expense)) in quarters.into_iter().rev() {
        let net_balance = total_income - total_expense;
        let share_amount =
            Amount::new(net_balance.value() * person.bonus_percentage / Decimal::ONE_HUNDRED);
        if year == current_year {
            summary.current_year_share += share_amount;
        }
        summary.quarters.push(QuarterlyStat {
            year,
            quarter,
            total_income,
            total_expense,
            net_balance,
            share_amount,
        });
    }

    summary
}

/// Computes summaries for the whole roster.
pub fn personnel_summaries(
    roster: &[Personnel],
    transactions: &[Transaction],
    current_year: i32,
) -> Vec<PersonnelSummary> {
    roster
        .iter()
        .map(|p| personnel_summary(p, transactions, current_year))
        .collect()
}
