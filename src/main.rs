use clap::Parser;
use defter::args::{AccountAction, Args, Command, PersonnelAction, ReportView};
use defter::{commands, Config, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().defter_home().path();

    // Route to appropriate command handler
    let _: () = match args.command() {
        Command::Init => commands::init(home).await?.print(),

        Command::Report(report_args) => {
            let config = Config::load(home).await?;
            match report_args.view() {
                ReportView::Dashboard => commands::report_dashboard(&config).await?.print(),
                ReportView::Groups { sort } => {
                    commands::report_groups(&config, *sort).await?.print()
                }
                ReportView::Expenses {
                    group,
                    exclude_client,
                } => {
                    commands::report_expenses(&config, group.as_deref(), exclude_client)
                        .await?
                        .print()
                }
                ReportView::Accounts => commands::report_accounts(&config).await?.print(),
                ReportView::Personnel { name } => {
                    commands::report_personnel(&config, name.as_deref())
                        .await?
                        .print()
                }
            }
        }

        Command::Insert(insert_args) => {
            let config = Config::load(home).await?;
            commands::insert_transaction(&config, insert_args.clone())
                .await?
                .print()
        }

        Command::Update(update_args) => {
            let config = Config::load(home).await?;
            commands::update_transaction(&config, update_args.clone())
                .await?
                .print()
        }

        Command::Delete(delete_args) => {
            let config = Config::load(home).await?;
            commands::delete_transactions(&config, delete_args.clone())
                .await?
                .print()
        }

        Command::Account(account_args) => {
            let config = Config::load(home).await?;
            match account_args.action() {
                AccountAction::Add {
                    bank_name,
                    account_number,
                    opening_balance,
                    currency,
                    kind,
                } => {
                    commands::account_add(
                        &config,
                        bank_name,
                        account_number,
                        opening_balance,
                        *currency,
                        kind,
                    )
                    .await?
                    .print()
                }
                AccountAction::Update {
                    bank_name,
                    account_number,
                    opening_balance,
                    currency,
                    kind,
                } => {
                    commands::account_update(
                        &config,
                        bank_name,
                        account_number,
                        opening_balance,
                        *currency,
                        kind,
                    )
                    .await?
                    .print()
                }
                AccountAction::List => commands::account_list(&config).await?.print(),
            }
        }

        Command::Personnel(personnel_args) => {
            let config = Config::load(home).await?;
            match personnel_args.action() {
                PersonnelAction::Add {
                    full_name,
                    bonus_percentage,
                } => {
                    commands::personnel_add(&config, full_name, bonus_percentage)
                        .await?
                        .print()
                }
                PersonnelAction::List => commands::personnel_list(&config).await?.print(),
            }
        }

        Command::Import(import_args) => {
            let config = Config::load(home).await?;
            commands::import(&config, import_args.clone()).await?.print()
        }

        Command::Export(export_args) => {
            let config = Config::load(home).await?;
            commands::export(&config, export_args.clone()).await?.print()
        }
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_CRATE_NAME"),
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
