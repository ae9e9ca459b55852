//! Dashboard-wide totals.

use crate::aggregate::{account_balances, converted_cash_total, FxRates};
use crate::model::{Amount, BankAccount, Transaction, TransactionKind, TransactionStatus};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The headline numbers of the dashboard.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DashboardStats {
    pub income_total: Amount,
    pub expense_total: Amount,
    pub pending_income_total: Amount,
    pub pending_income_count: usize,
    /// Money owed back to the office across all clients, see
    /// [`total_client_receivable`](fn@total_client_receivable).
    pub total_client_receivable: Amount,
    /// TRY-equivalent cash position over non-credit-card accounts.
    pub cash_balance: Amount,
}

/// Computes the dashboard totals from the full transaction list.
pub fn dashboard_stats(
    transactions: &[Transaction],
    accounts: &[BankAccount],
    fx: &FxRates,
) -> DashboardStats {
    let mut stats = DashboardStats::default();

    for t in transactions {
        if t.kind == TransactionKind::Income && t.status == TransactionStatus::Pending {
            stats.pending_income_total += t.amount;
            stats.pending_income_count += 1;
        }
        if !t.is_counted() {
            continue;
        }
        match t.kind {
            TransactionKind::Income => stats.income_total += t.amount,
            TransactionKind::Expense => stats.expense_total += t.amount,
            _ => {}
        }
    }

    stats.total_client_receivable = total_client_receivable(transactions);

    let balances = account_balances(accounts, transactions);
    stats.cash_balance = converted_cash_total(&balances, fx);

    stats
}

/// Sums what clients owe the office.
///
/// Each client gets a running balance where Income adds, Expense subtracts
/// and Current adds its signed amount (Rejected excluded, empty clients
/// skipped). A client who ends up negative has cost the office more than they
/// paid; the total is the sum of those deficits as positive numbers. Clients
/// at zero or better contribute nothing.
pub fn total_client_receivable(transactions: &[Transaction]) -> Amount {
    let mut balances: HashMap<&str, Decimal> = HashMap::new();
    for t in transactions
        .iter()
        .filter(|t| t.is_counted() && !t.client.is_empty())
    {
        // Debt and Receivable never move a client's running balance; the
        // other three kinds contribute their directional value.
        match t.kind {
            TransactionKind::Income | TransactionKind::Expense | TransactionKind::Current => {
                *balances.entry(t.client.as_str()).or_default() += t.signed_amount();
            }
            TransactionKind::Receivable | TransactionKind::Debt => {}
        }
    }

    let owed: Decimal = balances.values().filter(|b| b.is_sign_negative()).map(|b| -b).sum();
    Amount::new(owed)
}
