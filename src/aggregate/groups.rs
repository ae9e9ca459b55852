//! Per-group (client / project / case) summaries.

use crate::aggregate::GENERAL_LABEL;
use crate::model::{Amount, Transaction, TransactionKind};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Running totals for one project / case group.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GroupSummary {
    pub name: String,
    pub total_income: Amount,
    pub total_expense: Amount,
    /// `total_income - total_expense`.
    pub balance: Amount,
    /// Distinct client names in first-seen order. An empty client shows up
    /// under the general placeholder.
    pub clients: Vec<String>,
    /// Lexicographic max of the ISO dates seen, i.e. the most recent one.
    pub last_transaction_date: String,
    pub transaction_count: usize,
}

/// Which view is asking for the group list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum GroupSort {
    /// Most recent activity first (the client/project page).
    #[default]
    RecentActivity,
    /// Largest total expense first (the expense page).
    ExpenseDesc,
}

serde_plain::derive_display_from_serialize!(GroupSort);
serde_plain::derive_fromstr_from_deserialize!(GroupSort);

/// Aggregates the ledger by `group`, excluding Rejected transactions.
/// Results come back in first-seen order; apply [`sort_group_summaries`] for
/// a display order.
pub fn group_summaries(transactions: &[Transaction]) -> Vec<GroupSummary> {
    let mut order: Vec<String> = Vec::new();
    let mut by_name: HashMap<String, GroupSummary> = HashMap::new();

    for t in transactions.iter().filter(|t| t.is_counted()) {
        let name = label_or_general(&t.group);
        let summary = by_name.entry(name.clone()).or_insert_with(|| {
            order.push(name.clone());
            GroupSummary {
                name,
                ..GroupSummary::default()
            }
        });

        match t.kind {
            TransactionKind::Income => summary.total_income += t.amount,
            TransactionKind::Expense => summary.total_expense += t.amount,
            _ => {}
        }

        let client = label_or_general(&t.client);
        if !summary.clients.contains(&client) {
            summary.clients.push(client);
        }
        if t.date > summary.last_transaction_date {
            summary.last_transaction_date = t.date.clone();
        }
        summary.transaction_count += 1;
    }

    let mut summaries: Vec<GroupSummary> = order
        .into_iter()
        .filter_map(|name| by_name.remove(&name))
        .collect();
    for s in &mut summaries {
        s.balance = s.total_income - s.total_expense;
    }
    summaries
}

/// Sorts group summaries per the requested view. Ties break on the group
/// name so the output is deterministic.
pub fn sort_group_summaries(summaries: &mut [GroupSummary], sort: GroupSort) {
    match sort {
        GroupSort::RecentActivity => summaries.sort_by(|a, b| {
            b.last_transaction_date
                .cmp(&a.last_transaction_date)
                .then_with(|| a.name.cmp(&b.name))
        }),
        GroupSort::ExpenseDesc => summaries.sort_by(|a, b| {
            b.total_expense
                .cmp(&a.total_expense)
                .then_with(|| a.name.cmp(&b.name))
        }),
    }
}

/// The expense-centric variant of the group summary.
///
/// Debt joins Expense on the outflow side (with a monthly histogram) and
/// Receivable joins Income on the inflow side. Current entries split by
/// sign: payments (negative) count as expense, accruals as income.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ExpenseGroupSummary {
    pub name: String,
    pub total_income: Amount,
    pub total_expense: Amount,
    /// Outflow bucketed by `YYYY-MM`.
    pub monthly_expenses: BTreeMap<String, Amount>,
    /// The group's transactions, kept so callers can layer client filters on
    /// top without re-running the aggregation.
    pub transactions: Vec<Transaction>,
}

/// A client-filtered view over one group's histogram and transaction list.
///
/// Filtering is presentation-only: the group's totals are the unfiltered
/// ones, and this view recomputes only the histogram and the list.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct FilteredExpenseView {
    pub monthly_expenses: BTreeMap<String, Amount>,
    pub transactions: Vec<Transaction>,
}

impl ExpenseGroupSummary {
    /// Recomputes the monthly histogram and transaction list with the given
    /// clients removed. Totals stay untouched.
    pub fn excluding_clients(&self, excluded: &[String]) -> FilteredExpenseView {
        let transactions: Vec<Transaction> = self
            .transactions
            .iter()
            .filter(|t| !excluded.contains(&t.client))
            .cloned()
            .collect();
        let mut monthly_expenses = BTreeMap::new();
        for t in &transactions {
            if let Some(outflow) = outflow_amount(t) {
                *monthly_expenses
                    .entry(month_key(&t.date))
                    .or_insert(Amount::ZERO) += outflow;
            }
        }
        FilteredExpenseView {
            monthly_expenses,
            transactions,
        }
    }
}

/// Aggregates the ledger by `group` for the expense page.
pub fn expense_group_summaries(transactions: &[Transaction]) -> Vec<ExpenseGroupSummary> {
    let mut order: Vec<String> = Vec::new();
    let mut by_name: HashMap<String, ExpenseGroupSummary> = HashMap::new();

    for t in transactions.iter().filter(|t| t.is_counted()) {
        let name = label_or_general(&t.group);
        let summary = by_name.entry(name.clone()).or_insert_with(|| {
            order.push(name.clone());
            ExpenseGroupSummary {
                name,
                ..ExpenseGroupSummary::default()
            }
        });

        if let Some(outflow) = outflow_amount(t) {
            summary.total_expense += outflow;
            *summary
                .monthly_expenses
                .entry(month_key(&t.date))
                .or_insert(Amount::ZERO) += outflow;
        } else {
            summary.total_income += inflow_amount(t);
        }
        summary.transactions.push(t.clone());
    }

    order
        .into_iter()
        .filter_map(|name| by_name.remove(&name))
        .collect()
}

/// The outflow magnitude of a transaction on the expense page, or None when
/// it lands on the income side.
fn outflow_amount(t: &Transaction) -> Option<Amount> {
    match t.kind {
        TransactionKind::Expense | TransactionKind::Debt => Some(t.amount),
        TransactionKind::Current if t.amount.is_negative() => Some(t.amount.abs()),
        _ => None,
    }
}

fn inflow_amount(t: &Transaction) -> Amount {
    match t.kind {
        TransactionKind::Income | TransactionKind::Receivable => t.amount,
        TransactionKind::Current => t.amount,
        _ => Amount::ZERO,
    }
}

/// `YYYY-MM` from an ISO date; shorter strings pass through as their own
/// bucket rather than being dropped.
fn month_key(date: &str) -> String {
    date.get(0..7).unwrap_or(date).to_string()
}

fn label_or_general(value: &str) -> String {
    if value.is_empty() {
        GENERAL_LABEL.to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TransactionStatus;
    use std::str::FromStr;

    fn tx(group: &str, client: &str, kind: TransactionKind, amount: &str, date: &str) -> Transaction {
        Transaction {
            group: group.to_string(),
            client: client.to_string(),
            kind,
            amount: Amount::from_str(amount).unwrap(),
            date: date.to_string(),
            ..Transaction::default()
        }
    }

    fn sample() -> Vec<Transaction> {
        vec![
            tx("Dava A", "Acme", TransactionKind::Income, "1000", "2024-01-10"),
            tx("Dava A", "Acme", TransactionKind::Expense, "400", "2024-02-05"),
            tx("Dava A", "Beta", TransactionKind::Expense, "100", "2024-02-20"),
            tx("", "", TransactionKind::Income, "50", "2024-03-01"),
        ]
    }

    #[test]
    fn test_group_totals_and_balance() {
        let summaries = group_summaries(&sample());
        let dava = summaries.iter().find(|s| s.name == "Dava A").unwrap();
        assert_eq!(dava.total_income, Amount::from_str("1000").unwrap());
        assert_eq!(dava.total_expense, Amount::from_str("500").unwrap());
        assert_eq!(dava.balance, Amount::from_str("500").unwrap());
        assert_eq!(dava.transaction_count, 3);
        assert_eq!(dava.last_transaction_date, "2024-02-20");
        assert_eq!(dava.clients, vec!["Acme".to_string(), "Beta".to_string()]);
    }

    #[test]
    fn test_empty_group_and_client_get_general_label() {
        let summaries = group_summaries(&sample());
        let genel = summaries.iter().find(|s| s.name == GENERAL_LABEL).unwrap();
        assert_eq!(genel.clients, vec![GENERAL_LABEL.to_string()]);
        assert_eq!(genel.total_income, Amount::from_str("50").unwrap());
    }

    #[test]
    fn test_rejected_excluded() {
        let mut transactions = sample();
        transactions[0].status = TransactionStatus::Rejected;
        let summaries = group_summaries(&transactions);
        let dava = summaries.iter().find(|s| s.name == "Dava A").unwrap();
        assert_eq!(dava.total_income, Amount::ZERO);
        assert_eq!(dava.transaction_count, 2);
    }

    #[test]
    fn test_sort_by_recent_activity() {
        let mut summaries = group_summaries(&sample());
        sort_group_summaries(&mut summaries, GroupSort::RecentActivity);
        assert_eq!(summaries[0].name, GENERAL_LABEL); // 2024-03-01
        assert_eq!(summaries[1].name, "Dava A");
    }

    #[test]
    fn test_sort_by_expense_desc() {
        let mut summaries = group_summaries(&sample());
        sort_group_summaries(&mut summaries, GroupSort::ExpenseDesc);
        assert_eq!(summaries[0].name, "Dava A");
    }

    #[test]
    fn test_idempotent_on_same_input() {
        let transactions = sample();
        assert_eq!(group_summaries(&transactions), group_summaries(&transactions));
    }

    #[test]
    fn test_expense_groups_bucket_debt_and_split_current() {
        let transactions = vec![
            tx("Dava A", "Acme", TransactionKind::Debt, "200", "2024-01-15"),
            tx("Dava A", "Acme", TransactionKind::Expense, "100", "2024-01-20"),
            tx("Dava A", "Acme", TransactionKind::Current, "-50", "2024-02-01"),
            tx("Dava A", "Acme", TransactionKind::Current, "80", "2024-02-02"),
            tx("Dava A", "Acme", TransactionKind::Receivable, "300", "2024-02-03"),
        ];
        let summaries = expense_group_summaries(&transactions);
        let dava = &summaries[0];
        assert_eq!(dava.total_expense, Amount::from_str("350").unwrap());
        assert_eq!(dava.total_income, Amount::from_str("380").unwrap());
        assert_eq!(
            dava.monthly_expenses.get("2024-01"),
            Some(&Amount::from_str("300").unwrap())
        );
        assert_eq!(
            dava.monthly_expenses.get("2024-02"),
            Some(&Amount::from_str("50").unwrap())
        );
    }

    #[test]
    fn test_client_exclusion_filters_histogram_not_totals() {
        let transactions = vec![
            tx("Dava A", "Acme", TransactionKind::Expense, "100", "2024-01-20"),
            tx("Dava A", "Beta", TransactionKind::Expense, "40", "2024-01-25"),
        ];
        let summaries = expense_group_summaries(&transactions);
        let view = summaries[0].excluding_clients(&["Beta".to_string()]);
        assert_eq!(view.transactions.len(), 1);
        assert_eq!(
            view.monthly_expenses.get("2024-01"),
            Some(&Amount::from_str("100").unwrap())
        );
        // The group totals are the unfiltered ones.
        assert_eq!(summaries[0].total_expense, Amount::from_str("140").unwrap());
    }
}
