use clap::{Parser, Subcommand};

use crate::core_types::{AccountId, RecordId};

/// Version string with the build's git hash
pub const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH"), ")");

/// Ledger transfer engine: move funds between accounts with optimistic locking
#[derive(Parser, Debug)]
#[command(name = "ledger-transfer")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config environment, loads config/<ENV>.yaml
    #[arg(short, long, global = true, default_value = "dev")]
    pub env: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the accounts and transactions tables if missing
    InitSchema,

    /// Check database connectivity
    Ping,

    /// Create an account
    CreateAccount {
        #[arg(value_name = "ID")]
        id: AccountId,

        /// Decimal string, at most 5 fractional digits
        #[arg(value_name = "INITIAL_BALANCE")]
        initial_balance: String,
    },

    /// Show an account's balance and version
    GetAccount {
        #[arg(value_name = "ID")]
        id: AccountId,
    },

    /// Transfer funds between two accounts
    Transfer {
        #[arg(value_name = "SOURCE_ID")]
        source: AccountId,

        #[arg(value_name = "DEST_ID")]
        destination: AccountId,

        /// Decimal string, at most 5 fractional digits
        #[arg(value_name = "AMOUNT", allow_hyphen_values = true)]
        amount: String,
    },

    /// Transfer funds using a JSON request body
    TransferJson {
        /// {"source_account_id":..,"destination_account_id":..,"amount":".."}
        #[arg(value_name = "JSON")]
        json: String,
    },

    /// Show a committed transfer record
    GetTransfer {
        #[arg(value_name = "RECORD_ID")]
        id: RecordId,
    },
}
