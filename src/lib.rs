//! Ledger Transfer - atomic two-account transfers
//!
//! Moves funds between two account balances inside one database transaction,
//! using a per-account version counter to detect concurrent modification
//! instead of row locks.
//!
//! # Modules
//!
//! - [`core_types`] - Core type definitions (AccountId, RecordId, Version)
//! - [`money`] - Exact decimal amounts and the amount parser
//! - [`account`] - Account rows and account provisioning
//! - [`ledger`] - Transfer records and requests
//! - [`store`] - Store capabilities, PostgreSQL and in-memory implementations
//! - [`transfer`] - Transfer orchestrator and error taxonomy
//! - [`db`] - PostgreSQL connection pool
//! - [`config`] - YAML configuration with environment overrides
//! - [`logging`] - tracing subscriber setup
//! - [`cli`] - Command line definition

// Core types - must be first!
pub mod core_types;

pub mod money;

// Domain
pub mod account;
pub mod ledger;
pub mod store;
pub mod transfer;

// Infrastructure
pub mod cli;
pub mod config;
pub mod db;
pub mod logging;

// Convenient re-exports at crate root
pub use account::{Account, AccountService};
pub use core_types::{AccountId, RecordId, Version};
pub use ledger::{TransferRecord, TransferRequest};
pub use money::{Amount, MoneyError, parse_amount};
pub use store::{AccountStore, LedgerStore, MemoryStore, StoreError, TransactionBoundary};
pub use transfer::{TransferError, TransferLimits, TransferService};
