//! Handlers for the bank account roster.

use crate::commands::Out;
use crate::model::{Amount, BankAccount, Currency};
use crate::{Config, Result};
use anyhow::bail;
use std::str::FromStr;

/// Registers a bank account. The name is the link key for transactions, so
/// it must be unique.
pub async fn account_add(
    config: &Config,
    bank_name: &str,
    account_number: &str,
    opening_balance: &str,
    currency: Currency,
    kind: &str,
) -> Result<Out<BankAccount>> {
    if bank_name.trim().is_empty() {
        bail!("The account name must not be empty");
    }
    let opening_balance = Amount::from_str(opening_balance)
        .map_err(|e| anyhow::anyhow!("Unable to parse opening balance '{opening_balance}': {e}"))?;

    let account = BankAccount {
        bank_name: bank_name.to_string(),
        account_number: account_number.to_string(),
        opening_balance,
        currency,
        kind: kind.to_string(),
    };
    config.store().insert_account(&account).await?;

    Ok(Out::new(
        format!("Registered account '{}'", account.bank_name),
        account,
    ))
}

/// Updates a registered bank account. The name is the key and stays fixed.
pub async fn account_update(
    config: &Config,
    bank_name: &str,
    account_number: &str,
    opening_balance: &str,
    currency: Currency,
    kind: &str,
) -> Result<Out<BankAccount>> {
    let opening_balance = Amount::from_str(opening_balance)
        .map_err(|e| anyhow::anyhow!("Unable to parse opening balance '{opening_balance}': {e}"))?;

    let account = BankAccount {
        bank_name: bank_name.to_string(),
        account_number: account_number.to_string(),
        opening_balance,
        currency,
        kind: kind.to_string(),
    };
    config.store().update_account(&account).await?;

    Ok(Out::new(
        format!("Updated account '{}'", account.bank_name),
        account,
    ))
}

/// Lists the registered bank accounts.
pub async fn account_list(config: &Config) -> Result<Out<Vec<BankAccount>>> {
    let accounts = config.store().list_accounts().await?;
    Ok(Out::new(format!("{} account(s)", accounts.len()), accounts))
}
