//! Bank account reconciliation.
//!
//! A bank account's live balance is never stored; it is always
//! `opening_balance + money in - money out` over the transactions that
//! reference the account by name. Current ("cari") entries move personnel and
//! client running accounts only, never bank balances.

use crate::aggregate::FxRates;
use crate::model::{Amount, BankAccount, Transaction, TransactionKind};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::warn;

/// A bank account together with its reconciled flow and live balance.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AccountBalance {
    pub account: BankAccount,
    /// Sum of Income and Receivable amounts linked to this account.
    pub money_in: Amount,
    /// Sum of Expense and Debt amounts linked to this account.
    pub money_out: Amount,
    /// `opening_balance + money_in - money_out`.
    pub live_balance: Amount,
}

/// Reconciles every account against the transaction flow.
///
/// A transaction is linked to an account when its `account` field equals the
/// account's `bank_name` exactly. Rejected transactions are excluded.
pub fn account_balances(
    accounts: &[BankAccount],
    transactions: &[Transaction],
) -> Vec<AccountBalance> {
    accounts
        .iter()
        .map(|account| {
            let mut money_in = Amount::ZERO;
            let mut money_out = Amount::ZERO;
            for t in transactions
                .iter()
                .filter(|t| t.is_counted() && t.account == account.bank_name)
            {
                match t.kind {
                    TransactionKind::Income | TransactionKind::Receivable => {
                        money_in += t.amount;
                    }
                    TransactionKind::Expense | TransactionKind::Debt => {
                        money_out += t.amount;
                    }
                    TransactionKind::Current => {}
                }
            }
            AccountBalance {
                live_balance: account.opening_balance + money_in - money_out,
                account: account.clone(),
                money_in,
                money_out,
            }
        })
        .collect()
}

/// Collects account names referenced by transactions that match no known
/// bank account, and logs each at warn level.
///
/// The name-equality link silently drops flow on a renamed or misspelled
/// account; surfacing the orphans lets an operator fix the data.
pub fn unmatched_account_names(
    accounts: &[BankAccount],
    transactions: &[Transaction],
) -> Vec<String> {
    let known: HashSet<&str> = accounts.iter().map(|a| a.bank_name.as_str()).collect();
    let mut seen = HashSet::new();
    let mut unmatched = Vec::new();
    for t in transactions.iter().filter(|t| t.is_counted()) {
        if t.account.is_empty() || known.contains(t.account.as_str()) {
            continue;
        }
        if seen.insert(t.account.clone()) {
            warn!(
                "Transaction {} references unknown account '{}'",
                t.transaction_number, t.account
            );
            unmatched.push(t.account.clone());
        }
    }
    unmatched
}

/// The TRY-equivalent cash position: live balances of all non-credit-card
/// accounts, foreign currencies converted at the configured rates.
pub fn converted_cash_total(balances: &[AccountBalance], fx: &FxRates) -> Amount {
    balances
        .iter()
        .filter(|b| !b.account.is_credit_card())
        .map(|b| Amount::new(fx.to_try(b.live_balance.value(), b.account.currency)))
        .sum()
}

/// The ledger-versus-accounts reconciliation check shown to the user.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ReconciliationReport {
    /// Global income minus expense over the whole ledger.
    pub ledger_net: Amount,
    /// TRY-converted sum of non-credit-card live balances.
    pub accounts_total: Amount,
    /// `accounts_total - ledger_net`.
    pub discrepancy: Amount,
    /// True when `|discrepancy| < epsilon`.
    pub reconciled: bool,
}

/// Compares the computed cash position against the ledger-wide net.
///
/// The check is informational; nothing is enforced when it fails.
pub fn reconciliation_report(
    balances: &[AccountBalance],
    income_total: Amount,
    expense_total: Amount,
    fx: &FxRates,
    epsilon: Amount,
) -> ReconciliationReport {
    let accounts_total = converted_cash_total(balances, fx);
    let ledger_net = income_total - expense_total;
    let discrepancy = accounts_total - ledger_net;
    ReconciliationReport {
        ledger_net,
        accounts_total,
        discrepancy,
        reconciled: discrepancy.abs() < epsilon.abs(),
    }
}
