//! In-memory stores
//!
//! A process-local implementation of all three store capabilities with the
//! same observable semantics as the PostgreSQL stores:
//!
//! - writes made through a [`MemoryTx`] are staged and invisible to readers
//!   until [`TransactionBoundary::commit`]
//! - `update_balance` is a CAS on the version the transaction currently sees
//! - commit re-validates every staged version against committed state under
//!   one lock and applies all writes or none
//! - dropping a [`MemoryTx`] without committing discards it
//!
//! Record ids are drawn from a sequence at append time, so rolled-back
//! appends leave gaps exactly like a BIGSERIAL column.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use super::{AccountStore, LedgerStore, StoreError, TransactionBoundary};
use crate::account::Account;
use crate::core_types::{AccountId, INITIAL_VERSION, RecordId, Version};
use crate::ledger::TransferRecord;
use crate::money::{Amount, normalize};

#[derive(Default)]
struct MemoryState {
    accounts: HashMap<AccountId, Account>,
    records: BTreeMap<RecordId, TransferRecord>,
}

/// Staged account write: the version first observed by this transaction and
/// the row as it will look after commit
#[derive(Debug, Clone)]
struct StagedWrite {
    base_version: Version,
    account: Account,
}

/// Transaction handle for [`MemoryStore`]
#[derive(Debug)]
pub struct MemoryTx {
    id: u64,
    writes: BTreeMap<AccountId, StagedWrite>,
    records: Vec<TransferRecord>,
}

/// In-memory account store, ledger store and transaction boundary
///
/// Cloning is cheap and every clone shares the same state.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
    next_record_id: Arc<AtomicI64>,
    next_tx_id: Arc<AtomicU64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed accounts directly (test setup)
    pub fn with_accounts(accounts: impl IntoIterator<Item = (AccountId, Decimal)>) -> Self {
        let store = Self::new();
        if let Ok(mut state) = store.state.lock() {
            for (id, balance) in accounts {
                let balance = normalize(balance).unwrap_or(balance);
                state
                    .accounts
                    .insert(id, Account::new(id, balance, INITIAL_VERSION));
            }
        }
        store
    }

    /// Number of committed transfer records
    pub fn record_count(&self) -> usize {
        self.lock().map(|s| s.records.len()).unwrap_or(0)
    }

    /// Sum of all committed balances
    pub fn total_balance(&self) -> Decimal {
        self.lock()
            .map(|s| s.accounts.values().map(|a| a.balance).sum())
            .unwrap_or(Decimal::ZERO)
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl TransactionBoundary for MemoryStore {
    type Tx = MemoryTx;

    async fn begin(&self) -> Result<MemoryTx, StoreError> {
        Ok(MemoryTx {
            id: self.next_tx_id.fetch_add(1, Ordering::SeqCst) + 1,
            writes: BTreeMap::new(),
            records: Vec::new(),
        })
    }

    async fn commit(&self, tx: MemoryTx) -> Result<(), StoreError> {
        let mut state = self.lock()?;

        // Validate everything before applying anything
        for (id, write) in &tx.writes {
            let current = state.accounts.get(id).map(|a| a.version);
            if current != Some(write.base_version) {
                tracing::debug!(
                    tx_id = tx.id,
                    account_id = id,
                    expected_version = write.base_version,
                    current_version = ?current,
                    "Commit rejected: account changed since it was read"
                );
                return Err(StoreError::VersionConflict {
                    id: *id,
                    expected_version: write.base_version,
                });
            }
        }

        for (id, write) in tx.writes {
            state.accounts.insert(id, write.account);
        }
        for record in tx.records {
            state.records.insert(record.id, record);
        }
        Ok(())
    }

    async fn rollback(&self, tx: MemoryTx) -> Result<(), StoreError> {
        tracing::debug!(tx_id = tx.id, "Discarding staged writes");
        Ok(())
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    type Tx = MemoryTx;

    async fn get_by_id(&self, id: AccountId) -> Result<Account, StoreError> {
        self.lock()?
            .accounts
            .get(&id)
            .cloned()
            .ok_or(StoreError::AccountNotFound(id))
    }

    async fn create(
        &self,
        id: AccountId,
        initial_balance: Decimal,
    ) -> Result<Account, StoreError> {
        let mut state = self.lock()?;
        if state.accounts.contains_key(&id) {
            return Err(StoreError::Conflict(id));
        }

        let account = Account::new(id, normalize(initial_balance)?, INITIAL_VERSION);
        state.accounts.insert(id, account.clone());
        Ok(account)
    }

    async fn update_balance(
        &self,
        tx: &mut MemoryTx,
        id: AccountId,
        expected_version: Version,
        new_balance: Decimal,
    ) -> Result<Account, StoreError> {
        // Read-your-own-writes, then committed state
        let (current, base_version) = match tx.writes.get(&id) {
            Some(write) => (Some(write.account.version), write.base_version),
            None => {
                let version = self.lock()?.accounts.get(&id).map(|a| a.version);
                (version, expected_version)
            }
        };

        if current != Some(expected_version) {
            return Err(StoreError::VersionConflict {
                id,
                expected_version,
            });
        }

        let account = Account::new(id, normalize(new_balance)?, expected_version + 1);
        tx.writes.insert(
            id,
            StagedWrite {
                base_version,
                account: account.clone(),
            },
        );
        Ok(account)
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    type Tx = MemoryTx;

    async fn append(
        &self,
        tx: &mut MemoryTx,
        source_account_id: AccountId,
        destination_account_id: AccountId,
        amount: Amount,
    ) -> Result<RecordId, StoreError> {
        let id = self.next_record_id.fetch_add(1, Ordering::SeqCst) + 1;
        tx.records.push(TransferRecord {
            id,
            source_account_id,
            destination_account_id,
            amount: amount.value(),
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn get(&self, id: RecordId) -> Result<TransferRecord, StoreError> {
        self.lock()?
            .records
            .get(&id)
            .cloned()
            .ok_or(StoreError::RecordNotFound(id))
    }
}
