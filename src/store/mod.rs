//! The ledger store: a SQLite database holding transactions, bank accounts
//! and the personnel roster.
//!
//! The store is deliberately dumb: exact field-equality operations only, no
//! joins. All derived views come from the aggregation engine over a full
//! load. Row-to-model mapping also normalizes legacy rows (missing
//! transaction numbers, free-text amounts).

mod migrations;

use crate::model::{
    fallback_transaction_number, Amount, BankAccount, Personnel, Transaction, TransactionKind,
    TransactionStatus,
};
use crate::Result;
use anyhow::{bail, Context};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use std::path::Path;
use std::str::FromStr;
use tracing::warn;

/// Columns of the transactions table that the single-field update path may
/// touch. The inline-edit surface is restricted to these.
const EDITABLE_COLUMNS: &[&str] = &[
    "transaction_number",
    "date",
    "amount",
    "kind",
    "status",
    "description",
    "category",
    "account",
    "client",
    "group_name",
    "counterparty",
    "personnel",
];

#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Creates a new SQLite file at `path`, initializes the schema, and
    /// returns a connected store. Errors if a file already exists there.
    pub async fn init(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            bail!("A database file already exists at {}", path.display());
        }
        let pool = connect(path, true).await?;

        sqlx::query("CREATE TABLE schema_version (version INTEGER NOT NULL)")
            .execute(&pool)
            .await
            .context("Failed to create schema_version table")?;
        sqlx::query("INSERT INTO schema_version (version) VALUES (0)")
            .execute(&pool)
            .await
            .context("Failed to insert initial schema version")?;

        migrations::run(&pool, 0, migrations::CURRENT_VERSION).await?;
        Ok(Self { pool })
    }

    /// Opens an existing SQLite file at `path` and runs any pending
    /// migrations.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            bail!("The database file is missing '{}'", path.display());
        }
        let pool = connect(path, false).await?;

        let row: (i32,) = sqlx::query_as("SELECT MAX(version) FROM schema_version")
            .fetch_one(&pool)
            .await
            .context("Failed to read the database schema version")?;
        migrations::run(&pool, row.0, migrations::CURRENT_VERSION).await?;
        Ok(Self { pool })
    }

    // ------------------------------------------------------------------
    // Transactions
    // ------------------------------------------------------------------

    /// Loads the full transaction list, most recent date first, normalizing
    /// legacy rows on the way out.
    pub async fn list_transactions(&self) -> Result<Vec<Transaction>> {
        let rows = sqlx::query(
            "SELECT id, transaction_number, date, amount, kind, status, description, \
             category, account, client, group_name, counterparty, personnel \
             FROM transactions ORDER BY date DESC, id",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to load transactions")?;

        Ok(rows.iter().map(transaction_from_row).collect())
    }

    pub async fn insert_transaction(&self, transaction: &Transaction) -> Result<()> {
        insert_transaction_query(transaction)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to insert transaction {}", transaction.id))?;
        Ok(())
    }

    /// Inserts a batch of transactions within one database transaction, so a
    /// failed bulk import leaves nothing behind.
    pub async fn insert_transactions(&self, transactions: &[Transaction]) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin bulk insert")?;
        for transaction in transactions {
            insert_transaction_query(transaction)
                .execute(&mut *tx)
                .await
                .with_context(|| format!("Failed to insert transaction {}", transaction.id))?;
        }
        tx.commit().await.context("Failed to commit bulk insert")?;
        Ok(())
    }

    /// Single-field inline edit. Values for typed columns are validated
    /// before the write so a bad edit cannot poison the row.
    pub async fn update_transaction_field(
        &self,
        id: &str,
        column: &str,
        value: &str,
    ) -> Result<()> {
        if !EDITABLE_COLUMNS.contains(&column) {
            bail!("'{column}' is not an editable transaction field");
        }
        let value = match column {
            "amount" => Amount::from_str(value)
                .map_err(|e| anyhow::anyhow!("{e}"))?
                .plain(),
            "kind" => TransactionKind::from_str(value)
                .map_err(|_| anyhow::anyhow!("Unknown transaction kind '{value}'"))?
                .to_string(),
            "status" => TransactionStatus::from_str(value)
                .map_err(|_| anyhow::anyhow!("Unknown transaction status '{value}'"))?
                .to_string(),
            _ => value.to_string(),
        };

        // The column name is validated against the whitelist above; only the
        // value is bound.
        let sql = format!("UPDATE transactions SET {column} = ? WHERE id = ?");
        let result = sqlx::query(&sql)
            .bind(&value)
            .bind(id)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to update field '{column}' of transaction {id}"))?;
        if result.rows_affected() == 0 {
            bail!("No transaction with id '{id}'");
        }
        Ok(())
    }

    /// Deletes one or more transactions by id. Ids that match nothing are
    /// reported, not ignored.
    pub async fn delete_transactions(&self, ids: &[String]) -> Result<u64> {
        let mut tx = self.pool.begin().await.context("Failed to begin delete")?;
        let mut deleted = 0;
        for id in ids {
            let result = sqlx::query("DELETE FROM transactions WHERE id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await
                .with_context(|| format!("Failed to delete transaction {id}"))?;
            if result.rows_affected() == 0 {
                bail!("No transaction with id '{id}'");
            }
            deleted += result.rows_affected();
        }
        tx.commit().await.context("Failed to commit delete")?;
        Ok(deleted)
    }

    /// Produces the next `YYYYMMDD-NNN` number for a manual entry dated
    /// `date` (ISO). The sequence is scoped to the date and derived from the
    /// highest existing suffix, so deleting an entry never frees a number
    /// that a surviving entry still holds. Bulk-import numbers (`-BLK-`) do
    /// not advance it.
    pub async fn next_transaction_number(&self, date: &str) -> Result<String> {
        let compact = date.replace('-', "");
        let prefix = format!("{compact}-%");
        // The suffix begins right after the compact date and its dash.
        let suffix_start = (compact.len() + 2) as i64;
        let row: (i64,) = sqlx::query_as(
            "SELECT COALESCE(MAX(CAST(substr(transaction_number, ?) AS INTEGER)), 0) \
             FROM transactions \
             WHERE transaction_number LIKE ? AND transaction_number NOT LIKE '%-BLK-%'",
        )
        .bind(suffix_start)
        .bind(&prefix)
        .fetch_one(&self.pool)
        .await
        .context("Failed to read the transaction number sequence")?;
        Ok(format!("{compact}-{:03}", row.0 + 1))
    }

    // ------------------------------------------------------------------
    // Bank accounts
    // ------------------------------------------------------------------

    pub async fn list_accounts(&self) -> Result<Vec<BankAccount>> {
        let rows = sqlx::query(
            "SELECT bank_name, account_number, opening_balance, currency, kind \
             FROM bank_accounts ORDER BY bank_name",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to load bank accounts")?;

        Ok(rows
            .iter()
            .map(|row| BankAccount {
                bank_name: row.get("bank_name"),
                account_number: row.get("account_number"),
                opening_balance: Amount::parse_lenient(row.get::<String, _>("opening_balance").as_str()),
                currency: parse_or_default(row.get::<String, _>("currency").as_str(), "currency"),
                kind: row.get("kind"),
            })
            .collect())
    }

    pub async fn insert_account(&self, account: &BankAccount) -> Result<()> {
        sqlx::query(
            "INSERT INTO bank_accounts (bank_name, account_number, opening_balance, currency, kind) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&account.bank_name)
        .bind(&account.account_number)
        .bind(account.opening_balance.plain())
        .bind(account.currency.to_string())
        .bind(&account.kind)
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to insert account '{}'", account.bank_name))?;
        Ok(())
    }

    pub async fn update_account(&self, account: &BankAccount) -> Result<()> {
        let result = sqlx::query(
            "UPDATE bank_accounts SET account_number = ?, opening_balance = ?, currency = ?, \
             kind = ? WHERE bank_name = ?",
        )
        .bind(&account.account_number)
        .bind(account.opening_balance.plain())
        .bind(account.currency.to_string())
        .bind(&account.kind)
        .bind(&account.bank_name)
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to update account '{}'", account.bank_name))?;
        if result.rows_affected() == 0 {
            bail!("No account named '{}'", account.bank_name);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Personnel
    // ------------------------------------------------------------------

    pub async fn list_personnel(&self) -> Result<Vec<Personnel>> {
        let rows = sqlx::query(
            "SELECT id, full_name, bonus_percentage FROM personnel ORDER BY full_name",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to load personnel")?;

        Ok(rows
            .iter()
            .map(|row| Personnel {
                id: row.get("id"),
                full_name: row.get("full_name"),
                bonus_percentage: Amount::parse_lenient(
                    row.get::<String, _>("bonus_percentage").as_str(),
                )
                .value(),
            })
            .collect())
    }

    pub async fn insert_personnel(&self, person: &Personnel) -> Result<()> {
        sqlx::query("INSERT INTO personnel (id, full_name, bonus_percentage) VALUES (?, ?, ?)")
            .bind(&person.id)
            .bind(&person.full_name)
            .bind(person.bonus_percentage.to_string())
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to insert personnel '{}'", person.full_name))?;
        Ok(())
    }
}

async fn connect(path: &Path, create: bool) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display()))
        .context("Failed to parse SQLite connection string")?
        .create_if_missing(create);
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .with_context(|| format!("Failed to open SQLite database at {}", path.display()))
}

/// Shapes a raw row into a `Transaction`, filling the display number for
/// legacy rows stored without one and coercing free-text amounts.
fn transaction_from_row(row: &sqlx::sqlite::SqliteRow) -> Transaction {
    let id: String = row.get("id");
    let stored_number: String = row.get("transaction_number");
    let transaction_number = if stored_number.is_empty() {
        fallback_transaction_number(&id)
    } else {
        stored_number
    };
    Transaction {
        transaction_number,
        date: row.get("date"),
        amount: Amount::parse_lenient(row.get::<String, _>("amount").as_str()),
        kind: parse_or_default(row.get::<String, _>("kind").as_str(), "kind"),
        status: parse_or_default(row.get::<String, _>("status").as_str(), "status"),
        description: row.get("description"),
        category: row.get("category"),
        account: row.get("account"),
        client: row.get("client"),
        group: row.get("group_name"),
        counterparty: row.get("counterparty"),
        personnel: row.get("personnel"),
        id,
    }
}

/// Parses an enum column, falling back to the default variant on rows with
/// unexpected text. A bad enum cell must not take the whole load down.
fn parse_or_default<T>(value: &str, what: &str) -> T
where
    T: FromStr + Default,
{
    match T::from_str(value) {
        Ok(parsed) => parsed,
        Err(_) => {
            warn!("Unrecognized {what} '{value}', using the default");
            T::default()
        }
    }
}

fn insert_transaction_query(
    transaction: &Transaction,
) -> sqlx::query::Query<'_, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'_>> {
    sqlx::query(
        "INSERT INTO transactions (id, transaction_number, date, amount, kind, status, \
         description, category, account, client, group_name, counterparty, personnel) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&transaction.id)
    .bind(&transaction.transaction_number)
    .bind(&transaction.date)
    .bind(transaction.amount.plain())
    .bind(transaction.kind.to_string())
    .bind(transaction.status.to_string())
    .bind(&transaction.description)
    .bind(&transaction.category)
    .bind(&transaction.account)
    .bind(&transaction.client)
    .bind(&transaction.group)
    .bind(&transaction.counterparty)
    .bind(&transaction.personnel)
}
