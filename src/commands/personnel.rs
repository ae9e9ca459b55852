//! Handlers for the personnel roster.

use crate::commands::Out;
use crate::model::Personnel;
use crate::{Config, Result};
use anyhow::{bail, Context};
use rust_decimal::Decimal;
use std::str::FromStr;
use uuid::Uuid;

/// Registers a personnel member. The full name is the link key for
/// transactions, so it must be unique.
pub async fn personnel_add(
    config: &Config,
    full_name: &str,
    bonus_percentage: &str,
) -> Result<Out<Personnel>> {
    if full_name.trim().is_empty() {
        bail!("The personnel name must not be empty");
    }
    let bonus_percentage = Decimal::from_str(bonus_percentage)
        .with_context(|| format!("Unable to parse bonus percentage '{bonus_percentage}'"))?;
    if bonus_percentage < Decimal::ZERO || bonus_percentage > Decimal::ONE_HUNDRED {
        bail!("The bonus percentage must be between 0 and 100");
    }

    let person = Personnel {
        id: Uuid::new_v4().to_string(),
        full_name: full_name.to_string(),
        bonus_percentage,
    };
    config.store().insert_personnel(&person).await?;

    Ok(Out::new(
        format!("Registered personnel '{}'", person.full_name),
        person,
    ))
}

/// Lists the registered personnel.
pub async fn personnel_list(config: &Config) -> Result<Out<Vec<Personnel>>> {
    let roster = config.store().list_personnel().await?;
    Ok(Out::new(format!("{} personnel", roster.len()), roster))
}
