//! Types that represent the core data model, such as `Transaction` and
//! `BankAccount`.
mod account;
mod amount;
mod personnel;
mod transaction;

pub use account::{BankAccount, Currency, CREDIT_CARD_MARKER};
pub use amount::{Amount, AmountError};
pub use personnel::Personnel;
pub use transaction::{
    fallback_transaction_number, Transaction, TransactionKind, TransactionStatus,
};
