//! The transaction ledger entry and its enums.

use crate::model::Amount;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single ledger entry.
///
/// Bank accounts, clients, cases and personnel are all referenced by name
/// (free text), not by id. Legacy data relies on that loose linking, so the
/// fields stay plain strings here.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Transaction {
    /// Opaque identity, a UUID for rows created by this program.
    pub id: String,
    /// Human-facing number, `YYYYMMDD-NNN` for manual entries. Legacy rows
    /// without one get a placeholder derived from the id, see
    /// [`fallback_transaction_number`].
    pub transaction_number: String,
    /// ISO `YYYY-MM-DD`. Date ordering throughout the crate is lexicographic
    /// string comparison, which is only correct for this padded format.
    pub date: String,
    /// Magnitude for Income/Expense/Receivable/Debt; signed for Current.
    /// Use [`Transaction::signed_amount`] wherever direction matters.
    pub amount: Amount,
    pub kind: TransactionKind,
    pub status: TransactionStatus,
    pub description: String,
    pub category: String,
    /// Bank or cash account name. Matches `BankAccount::bank_name` by string
    /// equality.
    pub account: String,
    pub client: String,
    /// Project / case name.
    pub group: String,
    pub counterparty: String,
    /// Staff member name. Matches `Personnel::full_name` by string equality.
    pub personnel: String,
}

impl Transaction {
    /// Whether this transaction counts toward financial aggregations.
    ///
    /// Rejected rows are excluded from every total but never deleted.
    pub fn is_counted(&self) -> bool {
        self.status != TransactionStatus::Rejected
    }

    /// The directional value of this transaction.
    ///
    /// Income and Receivable are inflows, Expense and Debt are outflows, and
    /// Current carries its own sign (positive = accrual, negative = payment).
    /// This is the single place the sign convention is derived.
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            TransactionKind::Income | TransactionKind::Receivable => self.amount.value(),
            TransactionKind::Expense | TransactionKind::Debt => -self.amount.value(),
            TransactionKind::Current => self.amount.value(),
        }
    }
}

/// Synthesizes a display number for legacy rows stored without one.
pub fn fallback_transaction_number(id: &str) -> String {
    if id.len() > 8 {
        let prefix: String = id.chars().take(6).collect();
        format!("ESKİ-{}", prefix.to_uppercase())
    } else {
        id.to_string()
    }
}

/// The five transaction kinds of the ledger.
#[derive(
    Default,
    Debug,
    Clone,
    Copy,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    #[default]
    Expense,
    Receivable,
    Debt,
    /// A running ("cari") account entry against a client or staff member.
    /// Never affects bank balances.
    Current,
}

serde_plain::derive_display_from_serialize!(TransactionKind);
serde_plain::derive_fromstr_from_deserialize!(TransactionKind);

#[derive(
    Default,
    Debug,
    Clone,
    Copy,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    #[default]
    Approved,
    Pending,
    Rejected,
}

serde_plain::derive_display_from_serialize!(TransactionStatus);
serde_plain::derive_fromstr_from_deserialize!(TransactionStatus);
