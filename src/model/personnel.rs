//! Personnel roster entry.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A staff member. Transactions attribute to a person by matching their
/// `personnel` field to `full_name` (string equality, same loose linking as
/// bank accounts).
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Personnel {
    pub id: String,
    pub full_name: String,
    /// Quarterly profit-share percentage as a whole number, e.g. 40 means the
    /// person receives 40% of their quarterly net.
    pub bonus_percentage: Decimal,
}
