//! Spreadsheet (CSV) import with user-defined column mapping.
//!
//! The file's first row is headers; the user maps ledger fields to header
//! names (not positions). Values get light coercion on the way in: dates from
//! `DD.MM.YYYY`, amounts from Turkish-formatted strings, kinds from a small
//! Turkish/English vocabulary. Imported rows are always Approved.

use crate::model::{Amount, Transaction, TransactionKind, TransactionStatus};
use crate::Result;
use anyhow::{bail, Context};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use tracing::warn;
use uuid::Uuid;

/// The ledger fields a spreadsheet column can map onto.
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ImportField {
    Date,
    Amount,
    Description,
    Kind,
    Category,
    Account,
    Client,
    Group,
    Counterparty,
}

serde_plain::derive_display_from_serialize!(ImportField);
serde_plain::derive_fromstr_from_deserialize!(ImportField);

/// Fields that must be mapped before any row is transformed.
const REQUIRED_FIELDS: &[ImportField] = &[
    ImportField::Date,
    ImportField::Amount,
    ImportField::Description,
];

/// A user-defined field → header-name mapping.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnMapping {
    fields: BTreeMap<ImportField, String>,
}

impl ColumnMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: ImportField, header: impl Into<String>) {
        self.fields.insert(field, header.into());
    }

    pub fn get(&self, field: ImportField) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    /// Parses repeated `field=Header` CLI pairs, e.g. `date=Tarih`.
    pub fn from_pairs(pairs: &[String]) -> Result<Self> {
        let mut mapping = ColumnMapping::new();
        for pair in pairs {
            let (field, header) = pair
                .split_once('=')
                .with_context(|| format!("Mapping '{pair}' is not in field=Header form"))?;
            let field: ImportField = field
                .parse()
                .map_err(|_| anyhow::anyhow!("Unknown mapping field '{field}'"))?;
            mapping.set(field, header);
        }
        Ok(mapping)
    }

    /// Checks that every required field is mapped. Runs before any row is
    /// touched; the error names all missing fields at once.
    pub fn validate(&self) -> Result<()> {
        let missing: Vec<String> = REQUIRED_FIELDS
            .iter()
            .filter(|f| !self.fields.contains_key(f))
            .map(|f| f.to_string())
            .collect();
        if !missing.is_empty() {
            bail!("Required import fields are not mapped: {}", missing.join(", "));
        }
        Ok(())
    }
}

/// Reads a CSV file into a header row and data rows.
pub fn read_rows(reader: impl Read) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);
    let headers: Vec<String> = rdr
        .headers()
        .context("Unable to read the header row")?
        .iter()
        .map(|s| s.to_string())
        .collect();
    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record.context("Unable to read a data row")?;
        rows.push(record.iter().map(|s| s.to_string()).collect());
    }
    Ok((headers, rows))
}

/// Transforms raw rows into Approved transactions using the mapping.
///
/// `today` feeds the generated transaction numbers; callers pass the current
/// date.
pub fn build_transactions(
    mapping: &ColumnMapping,
    headers: &[String],
    rows: &[Vec<String>],
    today: NaiveDate,
) -> Result<Vec<Transaction>> {
    mapping.validate()?;

    // A required field mapped to a header the file does not have is the same
    // defect as an unmapped field: the import stops before transforming rows.
    let missing: Vec<String> = REQUIRED_FIELDS
        .iter()
        .filter_map(|f| mapping.get(*f))
        .filter(|h| !headers.iter().any(|header| header == h))
        .map(|h| format!("'{h}'"))
        .collect();
    if !missing.is_empty() {
        bail!(
            "Mapped columns are missing from the file: {}",
            missing.join(", ")
        );
    }

    let index_of = |field: ImportField| -> Option<usize> {
        let header = mapping.get(field)?;
        headers.iter().position(|h| h == header)
    };

    let compact_date = today.format("%Y%m%d").to_string();
    let mut transactions = Vec::with_capacity(rows.len());
    for row in rows {
        let cell = |field: ImportField| -> String {
            index_of(field)
                .and_then(|ix| row.get(ix))
                .cloned()
                .unwrap_or_default()
        };

        transactions.push(Transaction {
            id: Uuid::new_v4().to_string(),
            // The legacy scheme used a random 0-99999 suffix with no
            // collision check; a UUID keeps the recognizable prefix and is
            // unique by construction.
            transaction_number: format!("{compact_date}-BLK-{}", Uuid::new_v4().simple()),
            date: transform_date(&cell(ImportField::Date)),
            amount: transform_amount(&cell(ImportField::Amount)),
            kind: transform_kind(&cell(ImportField::Kind)),
            status: TransactionStatus::Approved,
            description: cell(ImportField::Description),
            category: cell(ImportField::Category),
            account: cell(ImportField::Account),
            client: cell(ImportField::Client),
            group: cell(ImportField::Group),
            counterparty: cell(ImportField::Counterparty),
            personnel: String::new(),
        });
    }
    Ok(transactions)
}

/// Rearranges `DD.MM.YYYY` into `YYYY-MM-DD`. Anything else passes through
/// unmodified; malformed dates are preserved as-is.
pub fn transform_date(raw: &str) -> String {
    let trimmed = raw.trim();
    let parts: Vec<&str> = trimmed.split('.').collect();
    if parts.len() == 3
        && parts[0].len() == 2
        && parts[1].len() == 2
        && parts[2].len() == 4
        && parts.iter().all(|p| p.chars().all(|c| c.is_ascii_digit()))
    {
        return format!("{}-{}-{}", parts[2], parts[1], parts[0]);
    }
    trimmed.to_string()
}

/// Coerces an amount cell, treating anything unparsable as zero.
pub fn transform_amount(raw: &str) -> Amount {
    Amount::parse_lenient(raw)
}

/// Maps free-text type cells onto a transaction kind by case-insensitive
/// substring against a small Turkish/English vocabulary:
/// gelir/income/alacak mean Income; gider/expense/borç mean Expense, which is
/// also the default for anything unrecognized.
pub fn transform_kind(raw: &str) -> TransactionKind {
    let lower = raw.to_lowercase();
    const INCOME_WORDS: &[&str] = &["gelir", "income", "alacak"];
    if INCOME_WORDS.iter().any(|w| lower.contains(w)) {
        TransactionKind::Income
    } else {
        TransactionKind::Expense
    }
}

/// Named, reusable column mappings stored as JSON in the data directory.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MappingTemplates {
    templates: BTreeMap<String, ColumnMapping>,
}

impl MappingTemplates {
    /// Loads the template file, degrading to an empty set when the file is
    /// missing or unreadable. Template loss never blocks an import.
    pub async fn load(path: &Path) -> Self {
        match crate::utils::deserialize::<MappingTemplates>(path).await {
            Ok(templates) => templates,
            Err(e) => {
                if path.exists() {
                    warn!("Unable to load mapping templates, starting empty: {e}");
                }
                MappingTemplates::default()
            }
        }
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        crate::utils::write(path, json).await
    }

    pub fn get(&self, name: &str) -> Option<&ColumnMapping> {
        self.templates.get(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, mapping: ColumnMapping) {
        self.templates.insert(name.into(), mapping);
    }

    pub fn names(&self) -> Vec<&str> {
        self.templates.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn mapping(pairs: &[&str]) -> ColumnMapping {
        let pairs: Vec<String> = pairs.iter().map(|s| s.to_string()).collect();
        ColumnMapping::from_pairs(&pairs).unwrap()
    }

    #[test]
    fn test_transform_date_turkish_format() {
        assert_eq!(transform_date("15.03.2024"), "2024-03-15");
    }

    #[test]
    fn test_transform_date_passthrough() {
        assert_eq!(transform_date("2024-03-15"), "2024-03-15");
        assert_eq!(transform_date("15/03/2024"), "15/03/2024");
        assert_eq!(transform_date("3.4.2024"), "3.4.2024");
    }

    #[test]
    fn test_transform_amount_turkish() {
        assert_eq!(
            transform_amount("1.250,50"),
            Amount::from_str("1250.50").unwrap()
        );
        assert_eq!(transform_amount("fıstık"), Amount::ZERO);
    }

    #[test]
    fn test_transform_kind_vocabulary() {
        assert_eq!(transform_kind("Gelir"), TransactionKind::Income);
        assert_eq!(transform_kind("tahsilat alacak"), TransactionKind::Income);
        assert_eq!(transform_kind("INCOME"), TransactionKind::Income);
        assert_eq!(transform_kind("Gider"), TransactionKind::Expense);
        assert_eq!(transform_kind("borç ödemesi"), TransactionKind::Expense);
        assert_eq!(transform_kind("bilinmeyen"), TransactionKind::Expense);
        assert_eq!(transform_kind(""), TransactionKind::Expense);
    }

    #[test]
    fn test_validate_lists_all_missing_fields() {
        let m = mapping(&["date=Tarih"]);
        let err = m.validate().unwrap_err().to_string();
        assert!(err.contains("amount"));
        assert!(err.contains("description"));
        assert!(!err.contains("date,"));
    }

    #[test]
    fn test_from_pairs_rejects_unknown_field() {
        assert!(ColumnMapping::from_pairs(&["tutar=Tutar".to_string()]).is_err());
        assert!(ColumnMapping::from_pairs(&["no-equals".to_string()]).is_err());
    }

    #[test]
    fn test_build_transactions_scenario() {
        let m = mapping(&["date=Col1", "amount=Col2", "description=Col3"]);
        let headers = vec!["Col1".to_string(), "Col2".to_string(), "Col3".to_string()];
        let rows = vec![vec![
            "15.03.2024".to_string(),
            "1.250,50".to_string(),
            "Test".to_string(),
        ]];
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let transactions = build_transactions(&m, &headers, &rows, today).unwrap();
        assert_eq!(transactions.len(), 1);
        let t = &transactions[0];
        assert_eq!(t.date, "2024-03-15");
        assert_eq!(t.amount, Amount::from_str("1250.50").unwrap());
        assert_eq!(t.kind, TransactionKind::Expense);
        assert_eq!(t.status, TransactionStatus::Approved);
        assert_eq!(t.description, "Test");
        assert!(t.transaction_number.starts_with("20240601-BLK-"));
    }

    #[test]
    fn test_build_transactions_unique_numbers() {
        let m = mapping(&["date=D", "amount=A", "description=X"]);
        let headers = vec!["D".to_string(), "A".to_string(), "X".to_string()];
        let rows: Vec<Vec<String>> = (0..50)
            .map(|i| vec!["01.01.2024".to_string(), "1".to_string(), format!("r{i}")])
            .collect();
        let today = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let transactions = build_transactions(&m, &headers, &rows, today).unwrap();
        let mut numbers: Vec<&str> = transactions
            .iter()
            .map(|t| t.transaction_number.as_str())
            .collect();
        numbers.sort_unstable();
        numbers.dedup();
        assert_eq!(numbers.len(), 50);
    }

    #[test]
    fn test_build_transactions_missing_header_in_file() {
        let m = mapping(&["date=Tarih", "amount=Tutar", "description=Açıklama"]);
        let headers = vec!["Tarih".to_string(), "Tutar".to_string()];
        let err = build_transactions(&m, &headers, &[], NaiveDate::MIN).unwrap_err();
        assert!(err.to_string().contains("Açıklama"));
    }

    #[test]
    fn test_read_rows() {
        let csv = "Tarih,Tutar,Açıklama\n15.03.2024,\"1.250,50\",Test\n";
        let (headers, rows) = read_rows(csv.as_bytes()).unwrap();
        assert_eq!(headers, vec!["Tarih", "Tutar", "Açıklama"]);
        assert_eq!(rows, vec![vec!["15.03.2024", "1.250,50", "Test"]]);
    }

    #[test]
    fn test_mapping_serde_round_trip() {
        let m = mapping(&["date=Tarih", "amount=Tutar", "description=Açıklama"]);
        let json = serde_json::to_string(&m).unwrap();
        let back: ColumnMapping = serde_json::from_str(&json).unwrap();
        assert_eq!(m, back);
    }
}
