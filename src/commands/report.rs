//! The `defter report` views. Each view loads the full ledger and runs the
//! aggregation engine over it; nothing is read incrementally.

use crate::aggregate::{
    account_balances, dashboard_stats, expense_group_summaries, group_summaries,
    personnel_summaries, reconciliation_report, sort_group_summaries, unmatched_account_names,
    AccountBalance, DashboardStats, FilteredExpenseView, GroupSort, GroupSummary,
    PersonnelSummary, ReconciliationReport,
};
use crate::commands::Out;
use crate::model::Amount;
use crate::{Config, Result};
use anyhow::bail;
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Headline totals: income, expenses, pending income, client receivables and
/// the converted cash position.
pub async fn report_dashboard(config: &Config) -> Result<Out<DashboardStats>> {
    let transactions = config.store().list_transactions().await?;
    let accounts = config.store().list_accounts().await?;
    let stats = dashboard_stats(&transactions, &accounts, &config.fx());
    let message = format!(
        "Income {} | Expenses {} | Pending income {} ({}) | Client receivable {} | Cash {}",
        stats.income_total,
        stats.expense_total,
        stats.pending_income_total,
        stats.pending_income_count,
        stats.total_client_receivable,
        stats.cash_balance
    );
    Ok(Out::new(message, stats))
}

/// Per-group income/expense summaries in the requested sort order.
pub async fn report_groups(config: &Config, sort: GroupSort) -> Result<Out<Vec<GroupSummary>>> {
    let transactions = config.store().list_transactions().await?;
    let mut summaries = group_summaries(&transactions);
    sort_group_summaries(&mut summaries, sort);
    let message = format!("{} group(s)", summaries.len());
    Ok(Out::new(message, summaries))
}

/// One group's slice of the expense report.
///
/// The totals are always the group's unfiltered totals; the histogram and the
/// transaction list reflect any client exclusions.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ExpenseReport {
    pub name: String,
    pub total_income: Amount,
    pub total_expense: Amount,
    pub monthly_expenses: BTreeMap<String, Amount>,
    pub transaction_count: usize,
}

/// Expense breakdowns by group, optionally narrowed to one group and with
/// client exclusions applied to the histogram.
pub async fn report_expenses(
    config: &Config,
    group: Option<&str>,
    exclude_clients: &[String],
) -> Result<Out<Vec<ExpenseReport>>> {
    let transactions = config.store().list_transactions().await?;
    let summaries = expense_group_summaries(&transactions);

    if let Some(name) = group {
        if !summaries.iter().any(|s| s.name == name) {
            bail!("No group named '{name}'");
        }
    }

    let reports: Vec<ExpenseReport> = summaries
        .iter()
        .filter(|s| group.is_none_or(|name| s.name == name))
        .map(|s| {
            let FilteredExpenseView {
                monthly_expenses,
                transactions,
            } = s.excluding_clients(exclude_clients);
            ExpenseReport {
                name: s.name.clone(),
                total_income: s.total_income,
                total_expense: s.total_expense,
                monthly_expenses,
                transaction_count: transactions.len(),
            }
        })
        .collect();

    let message = format!("{} group(s) in the expense report", reports.len());
    Ok(Out::new(message, reports))
}

/// The accounts view: per-account balances, the orphaned account names and
/// the reconciliation check.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AccountsReport {
    pub balances: Vec<AccountBalance>,
    /// Account names referenced by transactions but registered nowhere.
    pub unmatched_accounts: Vec<String>,
    pub reconciliation: ReconciliationReport,
}

/// Bank account balances with the ledger-versus-accounts reconciliation check.
pub async fn report_accounts(config: &Config) -> Result<Out<AccountsReport>> {
    let transactions = config.store().list_transactions().await?;
    let accounts = config.store().list_accounts().await?;

    let balances = account_balances(&accounts, &transactions);
    let unmatched_accounts = unmatched_account_names(&accounts, &transactions);
    let stats = dashboard_stats(&transactions, &accounts, &config.fx());
    let reconciliation = reconciliation_report(
        &balances,
        stats.income_total,
        stats.expense_total,
        &config.fx(),
        config.reconcile_epsilon(),
    );

    let message = if reconciliation.reconciled {
        format!(
            "Accounts total {} matches the ledger net {}",
            reconciliation.accounts_total, reconciliation.ledger_net
        )
    } else {
        format!(
            "Accounts total {} differs from the ledger net {} by {}",
            reconciliation.accounts_total, reconciliation.ledger_net, reconciliation.discrepancy
        )
    };
    Ok(Out::new(
        message,
        AccountsReport {
            balances,
            unmatched_accounts,
            reconciliation,
        },
    ))
}

/// Quarterly profit shares and running accounts, for the whole roster or one
/// person.
pub async fn report_personnel(
    config: &Config,
    name: Option<&str>,
) -> Result<Out<Vec<PersonnelSummary>>> {
    let transactions = config.store().list_transactions().await?;
    let roster = config.store().list_personnel().await?;

    if let Some(name) = name {
        if !roster.iter().any(|p| p.full_name == name) {
            bail!("No personnel named '{name}'");
        }
    }

    let current_year = chrono::Local::now().year();
    let summaries: Vec<PersonnelSummary> = personnel_summaries(&roster, &transactions, current_year)
        .into_iter()
        .filter(|s| name.is_none_or(|n| s.name == n))
        .collect();

    let message = format!("{} personnel summarized", summaries.len());
    Ok(Out::new(message, summaries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        Amount, BankAccount, Currency, Personnel, Transaction, TransactionKind, TransactionStatus,
    };
    use crate::test::TestEnv;
    use std::str::FromStr;
    use uuid::Uuid;

    fn tx(kind: TransactionKind, amount: &str, group: &str, account: &str) -> Transaction {
        Transaction {
            id: Uuid::new_v4().to_string(),
            transaction_number: format!("T-{}", Uuid::new_v4().simple()),
            date: "2024-03-15".to_string(),
            amount: Amount::from_str(amount).unwrap(),
            kind,
            status: TransactionStatus::Approved,
            group: group.to_string(),
            account: account.to_string(),
            ..Transaction::default()
        }
    }

    #[tokio::test]
    async fn test_dashboard_report() {
        let env = TestEnv::new().await;
        let store = env.config.store();
        store
            .insert_transactions(&[
                tx(TransactionKind::Income, "1000", "Dava A", ""),
                tx(TransactionKind::Expense, "400", "Dava A", ""),
            ])
            .await
            .unwrap();

        let out = report_dashboard(&env.config).await.unwrap();
        let stats = out.structure().unwrap();
        assert_eq!(stats.income_total, Amount::from_str("1000").unwrap());
        assert_eq!(stats.expense_total, Amount::from_str("400").unwrap());
    }

    #[tokio::test]
    async fn test_accounts_report_reconciles() {
        let env = TestEnv::new().await;
        let store = env.config.store();
        store
            .insert_account(&BankAccount {
                bank_name: "Kasa".to_string(),
                opening_balance: Amount::ZERO,
                currency: Currency::Try,
                ..BankAccount::default()
            })
            .await
            .unwrap();
        store
            .insert_transactions(&[
                tx(TransactionKind::Income, "1000", "", "Kasa"),
                tx(TransactionKind::Expense, "400", "", "Kasa"),
            ])
            .await
            .unwrap();

        let out = report_accounts(&env.config).await.unwrap();
        let report = out.structure().unwrap();
        assert!(report.reconciliation.reconciled);
        assert_eq!(
            report.balances[0].live_balance,
            Amount::from_str("600").unwrap()
        );
        assert!(report.unmatched_accounts.is_empty());
    }

    #[tokio::test]
    async fn test_expenses_report_unknown_group() {
        let env = TestEnv::new().await;
        assert!(report_expenses(&env.config, Some("Yok"), &[])
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_personnel_report_unknown_name() {
        let env = TestEnv::new().await;
        env.config
            .store()
            .insert_personnel(&Personnel {
                id: Uuid::new_v4().to_string(),
                full_name: "Ali Veli".to_string(),
                bonus_percentage: rust_decimal::Decimal::from(40),
            })
            .await
            .unwrap();

        assert!(report_personnel(&env.config, Some("Kimse"))
            .await
            .is_err());
        let out = report_personnel(&env.config, Some("Ali Veli")).await.unwrap();
        assert_eq!(out.structure().unwrap().len(), 1);
    }
}
