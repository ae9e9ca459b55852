use crate::commands::Out;
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the data directory with an initial `config.json` and an empty database.
///
/// # Arguments
/// - `defter_home` - The directory that will be the root of the data directory,
///   e.g. `$HOME/defter`
///
/// # Errors
/// - Returns an error if any file operations fail or if a database already exists there.
pub async fn init(defter_home: &Path) -> Result<Out<()>> {
    let config = Config::create(defter_home)
        .await
        .context("Unable to create the data directory and configs")?;
    Ok(format!(
        "Successfully created the defter directory at {}",
        config.root().display()
    )
    .into())
}
