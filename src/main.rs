//! ledger-transfer - command line front end
//!
//! ```text
//! ┌──────────┐    ┌──────────┐    ┌──────────────────┐    ┌────────────┐
//! │   CLI    │───▶│  Config  │───▶│ TransferService  │───▶│ PostgreSQL │
//! │  (clap)  │    │  (YAML)  │    │ AccountService   │    │  (sqlx)    │
//! └──────────┘    └──────────┘    └──────────────────┘    └────────────┘
//! ```
//!
//! Results are printed to stdout as JSON. Failures print `CODE: message`
//! to stderr and exit with status 1.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use ledger_transfer::account::AccountService;
use ledger_transfer::cli::{Cli, Commands};
use ledger_transfer::config::AppConfig;
use ledger_transfer::db::Database;
use ledger_transfer::ledger::{TransferRequest, TransferResponse};
use ledger_transfer::store::postgres::init_schema;
use ledger_transfer::store::{AccountDb, LedgerDb, LedgerStore, PgTxBoundary};
use ledger_transfer::transfer::{TransferError, TransferService};

// ============================================================
// COMMANDS
// ============================================================

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize output")
}

async fn run(command: Commands, config: &AppConfig) -> Result<String> {
    let db = Database::connect(&config.postgres)
        .await
        .context("Failed to connect to PostgreSQL")?;
    let pool = db.pool().clone();

    let accounts = AccountService::new(AccountDb::new(pool.clone()), config.limits);
    let transfers = TransferService::new(
        PgTxBoundary::new(pool.clone()),
        AccountDb::new(pool.clone()),
        LedgerDb::new(pool.clone()),
        config.limits,
    );

    match command {
        Commands::InitSchema => {
            init_schema(&pool).await?;
            to_json(&serde_json::json!({ "schema": "ready" }))
        }
        Commands::Ping => {
            db.health_check()
                .await
                .context("Database health check failed")?;
            Ok("pong".to_string())
        }
        Commands::CreateAccount {
            id,
            initial_balance,
        } => to_json(&accounts.create(id, &initial_balance).await?),
        Commands::GetAccount { id } => to_json(&accounts.get(id).await?),
        Commands::Transfer {
            source,
            destination,
            amount,
        } => {
            let transaction_id = transfers.transfer(source, destination, &amount).await?;
            to_json(&TransferResponse { transaction_id })
        }
        Commands::TransferJson { json } => {
            let req: TransferRequest =
                serde_json::from_str(&json).context("Invalid transfer request body")?;
            let transaction_id = transfers.execute(&req).await?;
            to_json(&TransferResponse { transaction_id })
        }
        Commands::GetTransfer { id } => {
            let record = LedgerDb::new(pool)
                .get(id)
                .await
                .map_err(TransferError::from)?;
            to_json(&record)
        }
    }
}

// ============================================================
// MAIN
// ============================================================

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match AppConfig::load(&cli.env) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("CONFIG_ERROR: {:#}", e);
            return ExitCode::FAILURE;
        }
    };
    let _log_guard = ledger_transfer::logging::init_logging(&config);

    tracing::debug!(env = %cli.env, command = ?cli.command, "Starting ledger-transfer");

    match run(cli.command, &config).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            match e.downcast_ref::<TransferError>() {
                Some(err) => eprintln!("{}: {}", err.code(), err),
                None => eprintln!("ERROR: {:#}", e),
            }
            ExitCode::FAILURE
        }
    }
}
