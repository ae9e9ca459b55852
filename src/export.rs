//! CSV export of transactions and derived summaries.
//!
//! Summaries go out exactly as the aggregation engine computed them; there is
//! no extra transform between a report and its spreadsheet.

use crate::aggregate::{GroupSummary, PersonnelSummary};
use crate::model::Transaction;
use crate::Result;
use anyhow::Context;
use std::path::Path;

/// Writes the transaction list as a spreadsheet with a header row.
pub fn export_transactions(path: &Path, transactions: &[Transaction]) -> Result<()> {
    let mut wtr = writer(path)?;
    wtr.write_record([
        "Transaction Number",
        "Date",
        "Amount",
        "Kind",
        "Status",
        "Description",
        "Category",
        "Account",
        "Client",
        "Group",
        "Counterparty",
        "Personnel",
    ])?;
    for t in transactions {
        wtr.write_record([
            t.transaction_number.as_str(),
            t.date.as_str(),
            &t.amount.plain(),
            &t.kind.to_string(),
            &t.status.to_string(),
            t.description.as_str(),
            t.category.as_str(),
            t.account.as_str(),
            t.client.as_str(),
            t.group.as_str(),
            t.counterparty.as_str(),
            t.personnel.as_str(),
        ])?;
    }
    finish(wtr, path)
}

/// Writes per-group summaries as a spreadsheet.
pub fn export_group_summaries(path: &Path, summaries: &[GroupSummary]) -> Result<()> {
    let mut wtr = writer(path)?;
    wtr.write_record([
        "Group",
        "Total Income",
        "Total Expense",
        "Balance",
        "Clients",
        "Last Transaction",
        "Transaction Count",
    ])?;
    for s in summaries {
        wtr.write_record([
            s.name.as_str(),
            &s.total_income.plain(),
            &s.total_expense.plain(),
            &s.balance.plain(),
            &s.clients.join("; "),
            s.last_transaction_date.as_str(),
            &s.transaction_count.to_string(),
        ])?;
    }
    finish(wtr, path)
}

/// Writes personnel summaries as a spreadsheet, one row per quarter plus a
/// running-account row per person.
pub fn export_personnel(path: &Path, summaries: &[PersonnelSummary]) -> Result<()> {
    let mut wtr = writer(path)?;
    wtr.write_record([
        "Personnel",
        "Year",
        "Quarter",
        "Income",
        "Expense",
        "Net",
        "Share",
        "Debt",
        "Receivable",
        "Current Balance",
    ])?;
    for s in summaries {
        for q in &s.quarters {
            wtr.write_record([
                s.name.as_str(),
                &q.year.to_string(),
                &q.quarter.to_string(),
                &q.total_income.plain(),
                &q.total_expense.plain(),
                &q.net_balance.plain(),
                &q.share_amount.plain(),
                "",
                "",
                "",
            ])?;
        }
        wtr.write_record([
            s.name.as_str(),
            "",
            "",
            &s.income.plain(),
            &s.expense.plain(),
            "",
            &s.current_year_share.plain(),
            &s.debt.plain(),
            &s.receivable.plain(),
            &s.current_balance.plain(),
        ])?;
    }
    finish(wtr, path)
}

fn writer(path: &Path) -> Result<csv::Writer<std::fs::File>> {
    csv::Writer::from_path(path)
        .with_context(|| format!("Unable to create export file {}", path.display()))
}

fn finish(mut wtr: csv::Writer<std::fs::File>, path: &Path) -> Result<()> {
    wtr.flush()
        .with_context(|| format!("Unable to finish writing {}", path.display()))
}
