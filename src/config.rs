//! Configuration file handling for defter.
//!
//! The configuration file is stored at `$DEFTER_HOME/config.json` and contains settings for
//! the application including the exchange rates used to convert foreign-currency accounts
//! into lira and the tolerance used by the reconciliation check.

use crate::aggregate::FxRates;
use crate::model::Amount;
use crate::store::Store;
use crate::{utils, Result};
use anyhow::{bail, Context};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "defter";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
const DEFTER_SQLITE: &str = "defter.sqlite";
const TEMPLATES_JSON: &str = "templates.json";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$DEFTER_HOME` and from there it loads `$DEFTER_HOME/config.json`. It provides
/// paths to other items that are expected in certain locations within the defter home directory.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    store: Store,
    sqlite_path: PathBuf,
    templates_path: PathBuf,
}

impl Config {
    /// Creates the data directory with an initial `config.json` holding the default settings
    /// and an empty SQLite database.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the root of the data directory, e.g. `$HOME/defter`
    ///
    /// # Errors
    /// - Returns an error if any file operations fail or if a database already exists in `dir`.
    pub async fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the defter home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        let config_file = ConfigFile::default();
        config_file.save(&config_path).await?;

        let sqlite_path = root.join(DEFTER_SQLITE);
        let store = Store::init(&sqlite_path)
            .await
            .context("Unable to create SQLite DB")?;

        Ok(Self {
            templates_path: root.join(TEMPLATES_JSON),
            root,
            config_path,
            config_file,
            store,
            sqlite_path,
        })
    }

    /// This will
    /// - validate that `defter_home` and the config file exist
    /// - load the config file
    /// - load the SQLite database, running any pending schema migrations
    /// - return the loaded configuration object
    pub async fn load(defter_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = defter_home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("Defter home is missing")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;

        let sqlite_path = root.join(DEFTER_SQLITE);
        let store = Store::load(&sqlite_path)
            .await
            .context("Unable to load SQLite DB")?;

        Ok(Self {
            templates_path: root.join(TEMPLATES_JSON),
            root,
            config_path,
            config_file,
            store,
            sqlite_path,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub(crate) fn store(&self) -> &Store {
        &self.store
    }

    pub fn sqlite_path(&self) -> &Path {
        &self.sqlite_path
    }

    /// Path of the saved column-mapping templates file for the importer.
    pub fn templates_path(&self) -> &Path {
        &self.templates_path
    }

    /// The configured exchange rates for converting foreign-currency balances to lira.
    pub fn fx(&self) -> FxRates {
        FxRates {
            usd_try: self.config_file.fx_usd_try,
            eur_try: self.config_file.fx_eur_try,
        }
    }

    /// The absolute discrepancy below which the books are considered reconciled.
    pub fn reconcile_epsilon(&self) -> Amount {
        Amount::new(self.config_file.reconcile_epsilon)
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "defter",
///   "config_version": 1,
///   "fx_usd_try": "34.5",
///   "fx_eur_try": "36.2",
///   "reconcile_epsilon": "5"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "defter"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Lira per US dollar, used when converting account balances.
    fx_usd_try: Decimal,

    /// Lira per euro, used when converting account balances.
    fx_eur_try: Decimal,

    /// Reconciliation tolerance in lira.
    reconcile_epsilon: Decimal,
}

impl Default for ConfigFile {
    fn default() -> Self {
        let fx = FxRates::default();
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            fx_usd_try: fx.usd_try,
            fx_eur_try: fx.eur_try,
            reconcile_epsilon: Decimal::from(5),
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile asynchronously from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path).await?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_config_create_and_load() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("defter_home");

        let created = Config::create(&home).await.unwrap();
        assert!(created.config_path().is_file());
        assert!(created.sqlite_path().is_file());
        assert_eq!(created.fx().usd_try, Decimal::from_str("34.5").unwrap());

        let loaded = Config::load(&home).await.unwrap();
        assert_eq!(loaded.reconcile_epsilon(), Amount::from_str("5").unwrap());
        assert_eq!(
            loaded.templates_path().file_name().unwrap(),
            TEMPLATES_JSON
        );
    }

    #[tokio::test]
    async fn test_config_load_missing_home() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        assert!(Config::load(&missing).await.is_err());
    }

    #[tokio::test]
    async fn test_config_file_rejects_wrong_app_name() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        let json = r#"{
            "app_name": "wrong_app",
            "config_version": 1,
            "fx_usd_try": "34.5",
            "fx_eur_try": "36.2",
            "reconcile_epsilon": "5"
        }"#;
        utils::write(&path, json).await.unwrap();

        let result = ConfigFile::load(&path).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid app_name"));
    }

    #[tokio::test]
    async fn test_config_file_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        let mut original = ConfigFile::default();
        original.fx_usd_try = Decimal::from_str("40.25").unwrap();
        original.save(&path).await.unwrap();

        let loaded = ConfigFile::load(&path).await.unwrap();
        assert_eq!(original, loaded);
    }
}
