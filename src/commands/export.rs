//! The `defter export` handler.

use crate::aggregate::{group_summaries, personnel_summaries, sort_group_summaries, GroupSort};
use crate::args::{ExportArgs, ExportKind};
use crate::commands::Out;
use crate::export::{export_group_summaries, export_personnel, export_transactions};
use crate::{Config, Result};
use chrono::Datelike;

/// Writes the requested dataset to a CSV file.
pub async fn export(config: &Config, args: ExportArgs) -> Result<Out<()>> {
    let transactions = config.store().list_transactions().await?;
    match args.what() {
        ExportKind::Transactions => export_transactions(args.out(), &transactions)?,
        ExportKind::Groups => {
            let mut summaries = group_summaries(&transactions);
            sort_group_summaries(&mut summaries, GroupSort::RecentActivity);
            export_group_summaries(args.out(), &summaries)?;
        }
        ExportKind::Personnel => {
            let roster = config.store().list_personnel().await?;
            let current_year = chrono::Local::now().year();
            let summaries = personnel_summaries(&roster, &transactions, current_year);
            export_personnel(args.out(), &summaries)?;
        }
    }
    Ok(format!("Exported {} to {}", args.what(), args.out().display()).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Amount, Transaction, TransactionKind, TransactionStatus};
    use crate::test::TestEnv;
    use clap::Parser;
    use std::str::FromStr;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_export_transactions() {
        let env = TestEnv::new().await;
        env.config
            .store()
            .insert_transaction(&Transaction {
                id: Uuid::new_v4().to_string(),
                transaction_number: "20240315-001".to_string(),
                date: "2024-03-15".to_string(),
                amount: Amount::from_str("1250.50").unwrap(),
                kind: TransactionKind::Income,
                status: TransactionStatus::Approved,
                description: "Vekalet ücreti".to_string(),
                ..Transaction::default()
            })
            .await
            .unwrap();

        let out_path = env.dir.path().join("out.csv");
        let args = ExportArgs::parse_from([
            "export",
            "transactions",
            out_path.to_str().unwrap(),
        ]);
        export(&env.config, args).await.unwrap();

        let written = std::fs::read_to_string(&out_path).unwrap();
        assert!(written.contains("20240315-001"));
        assert!(written.contains("1250.50"));
    }
}
