//! These structs provide the CLI interface for the defter CLI.

use crate::aggregate::GroupSort;
use crate::model::{Currency, TransactionKind, TransactionStatus};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// defter: A command-line ledger for a small law office.
///
/// The program keeps income, expense, receivable, debt and current-account transactions in a
/// local SQLite datastore, imports bank spreadsheets exported as CSV, and produces the reports
/// the office runs on: the dashboard, case-group summaries, account balances with a
/// reconciliation check, and quarterly personnel profit shares.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory and initialize the configuration files.
    ///
    /// This is the first command you should run. Decide what directory you want to store data
    /// in and pass it as --defter-home. By default it will be $HOME/defter. The command creates
    /// the directory, a config.json with default exchange rates, and an empty database.
    Init,
    /// Produce one of the office reports from the stored transactions.
    Report(ReportArgs),
    /// Record a new transaction.
    Insert(InsertArgs),
    /// Edit fields of an existing transaction.
    Update(UpdateArgs),
    /// Delete one or more transactions by id.
    Delete(DeleteArgs),
    /// Manage the bank account roster.
    Account(AccountArgs),
    /// Manage the personnel roster.
    Personnel(PersonnelArgs),
    /// Import transactions from a CSV spreadsheet export.
    Import(ImportArgs),
    /// Export stored data to a CSV file.
    Export(ExportArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// none, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where defter data and configuration is held. Defaults to ~/defter
    #[arg(long, env = "DEFTER_HOME", default_value_t = default_defter_home())]
    defter_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, defter_home: PathBuf) -> Self {
        Self {
            log_level,
            defter_home: defter_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn defter_home(&self) -> &DisplayPath {
        &self.defter_home
    }
}

/// Args for the `defter report` command.
#[derive(Debug, Parser, Clone)]
pub struct ReportArgs {
    #[command(subcommand)]
    view: ReportView,
}

impl ReportArgs {
    pub fn view(&self) -> &ReportView {
        &self.view
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum ReportView {
    /// Headline totals: income, expenses, pending income, client receivables, cash balance.
    Dashboard,
    /// Per-case-group income and expense summaries.
    Groups {
        /// Sort order for the group list.
        #[arg(long, value_enum, default_value_t = GroupSort::RecentActivity)]
        sort: GroupSort,
    },
    /// Expense breakdowns by group with a monthly histogram.
    Expenses {
        /// Limit the report to one group.
        #[arg(long)]
        group: Option<String>,

        /// Exclude transactions belonging to these clients. Repeatable.
        #[arg(long)]
        exclude_client: Vec<String>,
    },
    /// Bank account balances, the converted cash total and the reconciliation check.
    Accounts,
    /// Quarterly profit shares and per-person ledgers.
    Personnel {
        /// Limit the report to one person (by full name).
        #[arg(long)]
        name: Option<String>,
    },
}

/// Args for the `defter insert` command.
#[derive(Debug, Parser, Clone)]
pub struct InsertArgs {
    /// Transaction date in ISO format (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    date: Option<String>,

    /// The amount, e.g. "1250.50" or "1.250,50". Positive for income, expense, receivable and
    /// debt; current entries carry their own sign, so a payment is entered negative.
    #[arg(long, allow_hyphen_values = true)]
    amount: String,

    #[arg(long, value_enum, default_value_t = TransactionKind::Expense)]
    kind: TransactionKind,

    #[arg(long, value_enum, default_value_t = TransactionStatus::Approved)]
    status: TransactionStatus,

    #[arg(long, default_value = "")]
    description: String,

    #[arg(long, default_value = "")]
    category: String,

    /// The bank account name this transaction moved through.
    #[arg(long, default_value = "")]
    account: String,

    #[arg(long, default_value = "")]
    client: String,

    /// The case group this transaction belongs to.
    #[arg(long, default_value = "")]
    group: String,

    #[arg(long, default_value = "")]
    counterparty: String,

    /// The personnel member this transaction belongs to (by full name).
    #[arg(long, default_value = "")]
    personnel: String,
}

impl InsertArgs {
    pub fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn status(&self) -> TransactionStatus {
        self.status
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn client(&self) -> &str {
        &self.client
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn counterparty(&self) -> &str {
        &self.counterparty
    }

    pub fn personnel(&self) -> &str {
        &self.personnel
    }
}

/// Args for the `defter update` command. Only the provided flags are changed.
#[derive(Debug, Parser, Clone)]
pub struct UpdateArgs {
    /// The id of the transaction to edit.
    id: String,

    #[arg(long)]
    date: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    amount: Option<String>,

    #[arg(long)]
    kind: Option<TransactionKind>,

    #[arg(long)]
    status: Option<TransactionStatus>,

    #[arg(long)]
    description: Option<String>,

    #[arg(long)]
    category: Option<String>,

    #[arg(long)]
    account: Option<String>,

    #[arg(long)]
    client: Option<String>,

    #[arg(long)]
    group: Option<String>,

    #[arg(long)]
    counterparty: Option<String>,

    #[arg(long)]
    personnel: Option<String>,
}

impl UpdateArgs {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The changed fields as `(column, value)` pairs, in a fixed column order.
    pub fn changes(&self) -> Vec<(&'static str, String)> {
        let mut changes = Vec::new();
        let mut push = |column: &'static str, value: &Option<String>| {
            if let Some(value) = value {
                changes.push((column, value.clone()));
            }
        };
        push("date", &self.date);
        push("amount", &self.amount);
        push("kind", &self.kind.map(|k| k.to_string()));
        push("status", &self.status.map(|s| s.to_string()));
        push("description", &self.description);
        push("category", &self.category);
        push("account", &self.account);
        push("client", &self.client);
        push("group_name", &self.group);
        push("counterparty", &self.counterparty);
        push("personnel", &self.personnel);
        changes
    }
}

/// Args for the `defter delete` command.
#[derive(Debug, Parser, Clone)]
pub struct DeleteArgs {
    /// The ids of the transactions to delete.
    #[arg(required = true)]
    ids: Vec<String>,
}

impl DeleteArgs {
    pub fn ids(&self) -> &[String] {
        &self.ids
    }
}

/// Args for the `defter account` command.
#[derive(Debug, Parser, Clone)]
pub struct AccountArgs {
    #[command(subcommand)]
    action: AccountAction,
}

impl AccountArgs {
    pub fn action(&self) -> &AccountAction {
        &self.action
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum AccountAction {
    /// Register a bank account.
    Add {
        /// The display name of the account. Transactions link to accounts by this exact name.
        #[arg(long)]
        bank_name: String,

        #[arg(long, default_value = "")]
        account_number: String,

        #[arg(long, default_value = "0")]
        opening_balance: String,

        #[arg(long, value_enum, default_value_t = Currency::Try)]
        currency: Currency,

        /// Free-form account kind. Accounts whose kind contains "Kredi Kartı" are
        /// excluded from the cash total.
        #[arg(long, default_value = "")]
        kind: String,
    },
    /// Update a registered bank account's details. The name itself cannot
    /// change, transactions link to it.
    Update {
        #[arg(long)]
        bank_name: String,

        #[arg(long, default_value = "")]
        account_number: String,

        #[arg(long, default_value = "0")]
        opening_balance: String,

        #[arg(long, value_enum, default_value_t = Currency::Try)]
        currency: Currency,

        #[arg(long, default_value = "")]
        kind: String,
    },
    /// List registered bank accounts.
    List,
}

/// Args for the `defter personnel` command.
#[derive(Debug, Parser, Clone)]
pub struct PersonnelArgs {
    #[command(subcommand)]
    action: PersonnelAction,
}

impl PersonnelArgs {
    pub fn action(&self) -> &PersonnelAction {
        &self.action
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum PersonnelAction {
    /// Register a personnel member.
    Add {
        /// The person's full name. Transactions link to personnel by this exact name.
        #[arg(long)]
        full_name: String,

        /// The quarterly profit-share percentage, e.g. "40" for 40%.
        #[arg(long, default_value = "0")]
        bonus_percentage: String,
    },
    /// List registered personnel.
    List,
}

/// Args for the `defter import` command.
#[derive(Debug, Parser, Clone)]
pub struct ImportArgs {
    /// The CSV file to import.
    file: PathBuf,

    /// A column mapping entry of the form `field=Header`, e.g. `date=Tarih`. Repeatable.
    /// Required unless --template is given.
    #[arg(long = "map")]
    map: Vec<String>,

    /// Use a saved column-mapping template instead of --map entries.
    #[arg(long, conflicts_with = "map")]
    template: Option<String>,

    /// Save the provided --map entries as a reusable template with this name.
    #[arg(long)]
    save_template: Option<String>,
}

impl ImportArgs {
    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn map(&self) -> &[String] {
        &self.map
    }

    pub fn template(&self) -> Option<&str> {
        self.template.as_deref()
    }

    pub fn save_template(&self) -> Option<&str> {
        self.save_template.as_deref()
    }
}

#[derive(Debug, Default, Copy, Clone, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ExportKind {
    #[default]
    Transactions,
    Groups,
    Personnel,
}

serde_plain::derive_display_from_serialize!(ExportKind);
serde_plain::derive_fromstr_from_deserialize!(ExportKind);

/// Args for the `defter export` command.
#[derive(Debug, Parser, Clone)]
pub struct ExportArgs {
    /// What to export.
    what: ExportKind,

    /// The CSV file to write.
    out: PathBuf,
}

impl ExportArgs {
    pub fn what(&self) -> ExportKind {
        self.what
    }

    pub fn out(&self) -> &Path {
        &self.out
    }
}

fn default_defter_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("defter"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --defter-home or DEFTER_HOME instead of relying on the default \
                defter home directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("defter")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}
