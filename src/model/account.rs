//! Bank and cash account types.

use crate::model::Amount;
use serde::{Deserialize, Serialize};

/// The substring that marks an account as a credit card. Credit-card accounts
/// are excluded from the cash position and from reconciliation.
pub const CREDIT_CARD_MARKER: &str = "Kredi Kartı";

/// A named money pool: a bank account, cash drawer, credit card or POS.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BankAccount {
    /// The account's display name. Transactions link to it by writing this
    /// exact string into their `account` field.
    pub bank_name: String,
    pub account_number: String,
    /// The opening balance, not the live balance. The live balance is always
    /// recomputed from transaction flow.
    pub opening_balance: Amount,
    pub currency: Currency,
    /// Free-text category: checking, cash drawer, credit card, POS, etc.
    pub kind: String,
}

impl BankAccount {
    pub fn is_credit_card(&self) -> bool {
        self.kind.contains(CREDIT_CARD_MARKER)
    }
}

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
#[serde(rename_all = "UPPERCASE")]
#[value(rename_all = "UPPER")]
pub enum Currency {
    #[default]
    Try,
    Usd,
    Eur,
}

serde_plain::derive_display_from_serialize!(Currency);
serde_plain::derive_fromstr_from_deserialize!(Currency);
