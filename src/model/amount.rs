//! Amount type for monetary values.
//!
//! This module provides the `Amount` type which wraps `Decimal` and parses the
//! formats that show up in real ledger data: plain decimals (`1250.50`),
//! Turkish-formatted strings (`1.250,50`), and values with a currency symbol
//! or grouping noise mixed in.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;
use tracing::warn;

/// Represents a monetary amount.
///
/// Wraps `Decimal` with custom serialization so amounts survive round trips
/// through CSV and JSON as strings. Display uses Turkish separators
/// (`1.250,50`); `plain` gives the machine form (`1250.50`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    /// Creates a new Amount from a Decimal value.
    pub const fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the amount is negative.
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Returns the absolute value.
    pub fn abs(&self) -> Amount {
        Amount(self.0.abs())
    }

    /// The machine-readable form with a dot decimal separator and no grouping.
    pub fn plain(&self) -> String {
        self.0.to_string()
    }

    /// Parses a string, coercing anything unparsable to zero.
    ///
    /// Legacy rows carry free-text amounts; the original system ran them
    /// through a numeric cast that produced 0 for garbage, and every
    /// aggregation downstream relies on that.
    pub fn parse_lenient(s: &str) -> Amount {
        match Amount::from_str(s) {
            Ok(a) => a,
            Err(_) => {
                if !s.trim().is_empty() {
                    warn!("Unparsable amount '{s}' coerced to 0");
                }
                Amount::ZERO
            }
        }
    }
}

/// An error that can occur when parsing strings into `Amount` values.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct AmountError(String);

impl fmt::Display for AmountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid amount '{}'", self.0)
    }
}

impl std::error::Error for AmountError {}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(Amount::ZERO);
        }

        // Keep digits, sign and separators; drop currency symbols and spaces.
        let cleaned: String = trimmed
            .chars()
            .filter(|&c| c.is_ascii_digit() || c == '-' || c == '.' || c == ',')
            .collect();
        if cleaned.is_empty() {
            return Err(AmountError(s.to_string()));
        }

        let last_comma = cleaned.rfind(',');
        let last_dot = cleaned.rfind('.');

        // A comma after the last dot (or a comma with no dot at all) is a
        // decimal separator in the Turkish convention. Otherwise commas are
        // thousands grouping.
        let normalized = match (last_comma, last_dot) {
            (Some(c), Some(d)) if c > d => cleaned.replace('.', "").replace(',', "."),
            (Some(_), None) => cleaned.replace(',', "."),
            _ => cleaned.replace(',', ""),
        };

        Decimal::from_str(&normalized)
            .map(Amount)
            .map_err(|_| AmountError(s.to_string()))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // format_num gives us `1,250.50`; swap the separators for the
        // Turkish convention.
        let en = format_num::format_num!(",.2", self.0.to_f64().unwrap_or_default());
        let tr: String = en
            .chars()
            .map(|c| match c {
                ',' => '.',
                '.' => ',',
                other => other,
            })
            .collect();
        write!(f, "{tr}")
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.plain())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Amount::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Amount {
        Amount(self.0 + rhs.0)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Amount) {
        self.0 += rhs.0;
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(self, rhs: Amount) -> Amount {
        Amount(self.0 - rhs.0)
    }
}

impl SubAssign for Amount {
    fn sub_assign(&mut self, rhs: Amount) {
        self.0 -= rhs.0;
    }
}

impl Neg for Amount {
    type Output = Amount;

    fn neg(self) -> Amount {
        Amount(-self.0)
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Amount {
        iter.fold(Amount::ZERO, |acc, a| acc + a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain() {
        let amount = Amount::from_str("1250.50").unwrap();
        assert_eq!(amount.value(), Decimal::from_str("1250.50").unwrap());
    }

    #[test]
    fn test_parse_turkish_format() {
        let amount = Amount::from_str("1.250,50").unwrap();
        assert_eq!(amount.value(), Decimal::from_str("1250.50").unwrap());
    }

    #[test]
    fn test_parse_comma_decimal_without_grouping() {
        let amount = Amount::from_str("1250,50").unwrap();
        assert_eq!(amount.value(), Decimal::from_str("1250.50").unwrap());
    }

    #[test]
    fn test_parse_english_grouping() {
        let amount = Amount::from_str("1,250.50").unwrap();
        assert_eq!(amount.value(), Decimal::from_str("1250.50").unwrap());
    }

    #[test]
    fn test_parse_negative() {
        let amount = Amount::from_str("-500").unwrap();
        assert_eq!(amount.value(), Decimal::from_str("-500").unwrap());
    }

    #[test]
    fn test_parse_currency_symbol_stripped() {
        let amount = Amount::from_str("₺1.250,50").unwrap();
        assert_eq!(amount.value(), Decimal::from_str("1250.50").unwrap());
    }

    #[test]
    fn test_parse_empty_string_is_zero() {
        let amount = Amount::from_str("").unwrap();
        assert!(amount.is_zero());
    }

    #[test]
    fn test_parse_garbage_fails() {
        assert!(Amount::from_str("abc").is_err());
    }

    #[test]
    fn test_lenient_coerces_garbage_to_zero() {
        assert_eq!(Amount::parse_lenient("N/A"), Amount::ZERO);
    }

    #[test]
    fn test_display_turkish() {
        let amount = Amount::from_str("1250.5").unwrap();
        assert_eq!(amount.to_string(), "1.250,50");
    }

    #[test]
    fn test_display_negative() {
        let amount = Amount::from_str("-500").unwrap();
        assert_eq!(amount.to_string(), "-500,00");
    }

    #[test]
    fn test_plain_round_trip() {
        let amount = Amount::from_str("1.250,50").unwrap();
        let again = Amount::from_str(&amount.plain()).unwrap();
        assert_eq!(amount, again);
    }

    #[test]
    fn test_serde_round_trip() {
        let amount = Amount::from_str("-1250.50").unwrap();
        let json = serde_json::to_string(&amount).unwrap();
        assert_eq!(json, "\"-1250.50\"");
        let back: Amount = serde_json::from_str(&json).unwrap();
        assert_eq!(amount, back);
    }

    #[test]
    fn test_sum() {
        let amounts = vec![
            Amount::from_str("10").unwrap(),
            Amount::from_str("-2.5").unwrap(),
        ];
        let total: Amount = amounts.into_iter().sum();
        assert_eq!(total.value(), Decimal::from_str("7.5").unwrap());
    }
}
