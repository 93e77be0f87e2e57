//! Store capabilities consumed by the transfer engine
//!
//! Three small seams, each implemented for PostgreSQL ([`postgres`]) and
//! for an in-process map ([`memory`]):
//!
//! - [`AccountStore`] - point reads, inserts, and the conditional balance update
//! - [`LedgerStore`] - append-only transfer records
//! - [`TransactionBoundary`] - begin / commit / rollback
//!
//! The account and ledger stores name the transaction handle they write
//! through as an associated type, so the orchestrator can require all three
//! to agree on it (`A: AccountStore<Tx = B::Tx>`).
//!
//! # Optimistic locking
//!
//! [`AccountStore::update_balance`] is the only write path for balance and
//! version. It is conditioned on `(id, expected_version)`; a zero-row result
//! is reported as [`StoreError::VersionConflict`], never as "not found".

pub mod memory;
#[cfg(test)]
pub mod mock;
pub mod postgres;

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use thiserror::Error;

use crate::account::Account;
use crate::core_types::{AccountId, RecordId, Version};
use crate::ledger::TransferRecord;
use crate::money::{Amount, MoneyError};

pub use memory::{MemoryStore, MemoryTx};
pub use postgres::{AccountDb, LedgerDb, PgTx, PgTxBoundary};

/// Store error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    #[error("Transfer record not found: {0}")]
    RecordNotFound(RecordId),

    #[error("Account already exists: {0}")]
    Conflict(AccountId),

    #[error("Version conflict on account {id} (expected version {expected_version})")]
    VersionConflict {
        id: AccountId,
        expected_version: Version,
    },

    #[error("Value cannot be stored: {0}")]
    InvalidValue(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<MoneyError> for StoreError {
    fn from(e: MoneyError) -> Self {
        StoreError::InvalidValue(e.to_string())
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Unavailable(e.to_string())
            }
            _ => StoreError::Database(e.to_string()),
        }
    }
}

/// Transaction boundary: all-or-nothing visibility of a transfer's writes
///
/// A handle that is dropped without `commit` must discard its writes, so a
/// panic between `begin` and `commit` can never leave partial state.
#[async_trait]
pub trait TransactionBoundary: Send + Sync {
    type Tx: Send;

    async fn begin(&self) -> Result<Self::Tx, StoreError>;

    async fn commit(&self, tx: Self::Tx) -> Result<(), StoreError>;

    async fn rollback(&self, tx: Self::Tx) -> Result<(), StoreError>;
}

/// Durable account store keyed by account id
#[async_trait]
pub trait AccountStore: Send + Sync {
    type Tx: Send;

    /// Point read outside any transaction
    async fn get_by_id(&self, id: AccountId) -> Result<Account, StoreError>;

    /// Insert a new account at version 1
    ///
    /// Returns [`StoreError::Conflict`] if the id is taken.
    async fn create(
        &self,
        id: AccountId,
        initial_balance: Decimal,
    ) -> Result<Account, StoreError>;

    /// Set the balance of `id` iff its stored version is still `expected_version`
    ///
    /// On success the stored version becomes `expected_version + 1` in the
    /// same write and the updated row is returned.
    async fn update_balance(
        &self,
        tx: &mut Self::Tx,
        id: AccountId,
        expected_version: Version,
        new_balance: Decimal,
    ) -> Result<Account, StoreError>;
}

/// Durable append-only store of transfer records
#[async_trait]
pub trait LedgerStore: Send + Sync {
    type Tx: Send;

    /// Append a record inside `tx`, returning its generated id
    async fn append(
        &self,
        tx: &mut Self::Tx,
        source_account_id: AccountId,
        destination_account_id: AccountId,
        amount: Amount,
    ) -> Result<RecordId, StoreError>;

    /// Read a committed record
    async fn get(&self, id: RecordId) -> Result<TransferRecord, StoreError>;
}

// Shared handles: one store instance can fill several roles

#[async_trait]
impl<T: TransactionBoundary + ?Sized> TransactionBoundary for Arc<T> {
    type Tx = T::Tx;

    async fn begin(&self) -> Result<Self::Tx, StoreError> {
        (**self).begin().await
    }

    async fn commit(&self, tx: Self::Tx) -> Result<(), StoreError> {
        (**self).commit(tx).await
    }

    async fn rollback(&self, tx: Self::Tx) -> Result<(), StoreError> {
        (**self).rollback(tx).await
    }
}

#[async_trait]
impl<T: AccountStore + ?Sized> AccountStore for Arc<T> {
    type Tx = T::Tx;

    async fn get_by_id(&self, id: AccountId) -> Result<Account, StoreError> {
        (**self).get_by_id(id).await
    }

    async fn create(
        &self,
        id: AccountId,
        initial_balance: Decimal,
    ) -> Result<Account, StoreError> {
        (**self).create(id, initial_balance).await
    }

    async fn update_balance(
        &self,
        tx: &mut Self::Tx,
        id: AccountId,
        expected_version: Version,
        new_balance: Decimal,
    ) -> Result<Account, StoreError> {
        (**self)
            .update_balance(tx, id, expected_version, new_balance)
            .await
    }
}

#[async_trait]
impl<T: LedgerStore + ?Sized> LedgerStore for Arc<T> {
    type Tx = T::Tx;

    async fn append(
        &self,
        tx: &mut Self::Tx,
        source_account_id: AccountId,
        destination_account_id: AccountId,
        amount: Amount,
    ) -> Result<RecordId, StoreError> {
        (**self)
            .append(tx, source_account_id, destination_account_id, amount)
            .await
    }

    async fn get(&self, id: RecordId) -> Result<TransferRecord, StoreError> {
        (**self).get(id).await
    }
}
