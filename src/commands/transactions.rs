//! Insert, update and delete handlers for ledger transactions.

use crate::args::{DeleteArgs, InsertArgs, UpdateArgs};
use crate::commands::Out;
use crate::model::{Amount, Transaction, TransactionKind};
use crate::{Config, Result};
use anyhow::{bail, Context};
use std::str::FromStr;
use uuid::Uuid;

/// Records a new transaction, assigning a fresh id and the next sequential
/// transaction number for its date.
pub async fn insert_transaction(config: &Config, args: InsertArgs) -> Result<Out<Transaction>> {
    let date = match args.date() {
        Some(date) => {
            // Dates are compared as strings everywhere, so a manual entry
            // must already be in ISO form.
            chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .with_context(|| format!("'{date}' is not a YYYY-MM-DD date"))?;
            date.to_string()
        }
        None => chrono::Local::now().date_naive().format("%Y-%m-%d").to_string(),
    };
    let amount = Amount::from_str(args.amount())
        .map_err(|e| anyhow::anyhow!("Unable to parse amount '{}': {e}", args.amount()))?;
    // Current entries carry their own sign; the other four kinds store
    // unsigned magnitudes.
    if amount.is_negative() && args.kind() != TransactionKind::Current {
        bail!("Amounts are entered as positive numbers; the kind decides the sign");
    }

    let transaction = Transaction {
        id: Uuid::new_v4().to_string(),
        transaction_number: config.store().next_transaction_number(&date).await?,
        date,
        amount,
        kind: args.kind(),
        status: args.status(),
        description: args.description().to_string(),
        category: args.category().to_string(),
        account: args.account().to_string(),
        client: args.client().to_string(),
        group: args.group().to_string(),
        counterparty: args.counterparty().to_string(),
        personnel: args.personnel().to_string(),
    };
    config.store().insert_transaction(&transaction).await?;

    Ok(Out::new(
        format!("Recorded transaction {}", transaction.transaction_number),
        transaction,
    ))
}

/// Applies the provided field changes to one transaction.
pub async fn update_transaction(config: &Config, args: UpdateArgs) -> Result<Out<()>> {
    let changes = args.changes();
    if changes.is_empty() {
        bail!("Nothing to update, provide at least one field flag");
    }
    for (column, value) in &changes {
        config
            .store()
            .update_transaction_field(args.id(), column, value)
            .await?;
    }
    Ok(format!("Updated {} field(s) of {}", changes.len(), args.id()).into())
}

/// Deletes the given transactions. Fails, changing nothing, when any id is
/// unknown.
pub async fn delete_transactions(config: &Config, args: DeleteArgs) -> Result<Out<()>> {
    let deleted = config.store().delete_transactions(args.ids()).await?;
    Ok(format!("Deleted {deleted} transaction(s)").into())
}
