//! The `defter import` handler: reads a CSV spreadsheet export, maps its
//! columns through a `ColumnMapping` and bulk-inserts the resulting
//! transactions.

use crate::args::ImportArgs;
use crate::commands::Out;
use crate::import::{build_transactions, read_rows, ColumnMapping, MappingTemplates};
use crate::{Config, Result};
use anyhow::{bail, Context};
use std::fs::File;

/// Imports a CSV file. The column mapping comes either from repeated
/// `--map field=Header` flags or from a saved template; `--save-template`
/// stores the flags for reuse.
pub async fn import(config: &Config, args: ImportArgs) -> Result<Out<usize>> {
    let mut templates = MappingTemplates::load(config.templates_path()).await;

    let mapping = match args.template() {
        Some(name) => templates
            .get(name)
            .cloned()
            .with_context(|| {
                format!(
                    "No mapping template named '{name}'. Saved templates: {}",
                    templates.names().join(", ")
                )
            })?,
        None => {
            if args.map().is_empty() {
                bail!("Provide --map entries or a --template name");
            }
            ColumnMapping::from_pairs(args.map())?
        }
    };

    if let Some(name) = args.save_template() {
        templates.insert(name, mapping.clone());
        templates.save(config.templates_path()).await?;
    }

    let file = File::open(args.file())
        .with_context(|| format!("Unable to open {}", args.file().display()))?;
    let (headers, rows) = read_rows(file)?;
    let today = chrono::Local::now().date_naive();
    let transactions = build_transactions(&mapping, &headers, &rows, today)?;

    config.store().insert_transactions(&transactions).await?;

    Ok(Out::new(
        format!(
            "Imported {} transaction(s) from {}",
            transactions.len(),
            args.file().display()
        ),
        transactions.len(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TransactionKind;
    use crate::test::TestEnv;
    use clap::Parser;

    const CSV: &str = "Tarih,Tutar,Açıklama,Tip\n\
        15.03.2024,\"1.250,50\",Dosya masrafı,Gider\n\
        16.03.2024,\"2.000,00\",Vekalet ücreti,Gelir\n";

    fn import_args(file: &std::path::Path, rest: &[&str]) -> ImportArgs {
        let mut argv = vec!["import".to_string(), file.display().to_string()];
        argv.extend(rest.iter().map(|s| s.to_string()));
        ImportArgs::parse_from(argv)
    }

    #[tokio::test]
    async fn test_import_with_map_flags() {
        let env = TestEnv::new().await;
        let csv_path = env.dir.path().join("bank.csv");
        std::fs::write(&csv_path, CSV).unwrap();

        let out = import(
            &env.config,
            import_args(
                &csv_path,
                &[
                    "--map",
                    "date=Tarih",
                    "--map",
                    "amount=Tutar",
                    "--map",
                    "description=Açıklama",
                    "--map",
                    "kind=Tip",
                ],
            ),
        )
        .await
        .unwrap();
        assert_eq!(out.structure(), Some(&2));

        let listed = env.config.store().list_transactions().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].date, "2024-03-16");
        assert_eq!(listed[0].kind, TransactionKind::Income);
        assert!(listed[0].transaction_number.contains("-BLK-"));
    }

    #[tokio::test]
    async fn test_import_save_and_reuse_template() {
        let env = TestEnv::new().await;
        let csv_path = env.dir.path().join("bank.csv");
        std::fs::write(&csv_path, CSV).unwrap();

        import(
            &env.config,
            import_args(
                &csv_path,
                &[
                    "--map",
                    "date=Tarih",
                    "--map",
                    "amount=Tutar",
                    "--map",
                    "description=Açıklama",
                    "--save-template",
                    "bank",
                ],
            ),
        )
        .await
        .unwrap();

        let out = import(&env.config, import_args(&csv_path, &["--template", "bank"]))
            .await
            .unwrap();
        assert_eq!(out.structure(), Some(&2));

        assert!(import(
            &env.config,
            import_args(&csv_path, &["--template", "missing"])
        )
        .await
        .is_err());
    }

    #[tokio::test]
    async fn test_import_requires_a_mapping() {
        let env = TestEnv::new().await;
        let csv_path = env.dir.path().join("bank.csv");
        std::fs::write(&csv_path, CSV).unwrap();

        assert!(import(&env.config, import_args(&csv_path, &[])).await.is_err());
    }
}
