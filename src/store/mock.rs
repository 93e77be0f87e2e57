//! Fault-injecting store for testing
//!
//! Wraps a [`MemoryStore`] and can fail any individual step of a transfer,
//! while counting begin / commit / rollback calls for verification.

use async_trait::async_trait;
use futures::future::BoxFuture;
use rust_decimal::Decimal;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{AccountStore, LedgerStore, MemoryStore, MemoryTx, StoreError, TransactionBoundary};
use crate::account::Account;
use crate::core_types::{AccountId, RecordId, Version};
use crate::ledger::TransferRecord;
use crate::money::Amount;

pub struct FaultyStore {
    inner: MemoryStore,
    /// Count of each operation type
    get_count: AtomicUsize,
    begin_count: AtomicUsize,
    update_count: AtomicUsize,
    commit_count: AtomicUsize,
    rollback_count: AtomicUsize,
    /// Configured behavior
    fail_begin: Mutex<bool>,
    fail_append: Mutex<bool>,
    /// 1-based index of the update_balance call that fails
    fail_update_call: Mutex<Option<usize>>,
    fail_commit: Mutex<bool>,
    fail_rollback: Mutex<bool>,
    /// Runs once, inside begin(), before the transaction is opened
    before_begin: Mutex<Option<BoxFuture<'static, ()>>>,
}

impl FaultyStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            get_count: AtomicUsize::new(0),
            begin_count: AtomicUsize::new(0),
            update_count: AtomicUsize::new(0),
            commit_count: AtomicUsize::new(0),
            rollback_count: AtomicUsize::new(0),
            fail_begin: Mutex::new(false),
            fail_append: Mutex::new(false),
            fail_update_call: Mutex::new(None),
            fail_commit: Mutex::new(false),
            fail_rollback: Mutex::new(false),
            before_begin: Mutex::new(None),
        }
    }

    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    pub fn set_fail_begin(&self, fail: bool) {
        *self.fail_begin.lock().unwrap() = fail;
    }

    pub fn set_fail_append(&self, fail: bool) {
        *self.fail_append.lock().unwrap() = fail;
    }

    pub fn set_fail_update_call(&self, call: Option<usize>) {
        *self.fail_update_call.lock().unwrap() = call;
    }

    pub fn set_fail_commit(&self, fail: bool) {
        *self.fail_commit.lock().unwrap() = fail;
    }

    pub fn set_fail_rollback(&self, fail: bool) {
        *self.fail_rollback.lock().unwrap() = fail;
    }

    /// Simulate a concurrent writer landing between the reads and `begin`
    pub fn set_before_begin(&self, hook: BoxFuture<'static, ()>) {
        *self.before_begin.lock().unwrap() = Some(hook);
    }

    pub fn get_count(&self) -> usize {
        self.get_count.load(Ordering::SeqCst)
    }

    pub fn begin_count(&self) -> usize {
        self.begin_count.load(Ordering::SeqCst)
    }

    pub fn update_count(&self) -> usize {
        self.update_count.load(Ordering::SeqCst)
    }

    pub fn commit_count(&self) -> usize {
        self.commit_count.load(Ordering::SeqCst)
    }

    pub fn rollback_count(&self) -> usize {
        self.rollback_count.load(Ordering::SeqCst)
    }

    fn injected(what: &str) -> StoreError {
        StoreError::Unavailable(format!("injected {} failure", what))
    }
}

#[async_trait]
impl TransactionBoundary for FaultyStore {
    type Tx = MemoryTx;

    async fn begin(&self) -> Result<MemoryTx, StoreError> {
        self.begin_count.fetch_add(1, Ordering::SeqCst);

        let hook = self.before_begin.lock().unwrap().take();
        if let Some(hook) = hook {
            hook.await;
        }

        if *self.fail_begin.lock().unwrap() {
            return Err(Self::injected("begin"));
        }
        self.inner.begin().await
    }

    async fn commit(&self, tx: MemoryTx) -> Result<(), StoreError> {
        self.commit_count.fetch_add(1, Ordering::SeqCst);
        if *self.fail_commit.lock().unwrap() {
            return Err(Self::injected("commit"));
        }
        self.inner.commit(tx).await
    }

    async fn rollback(&self, tx: MemoryTx) -> Result<(), StoreError> {
        self.rollback_count.fetch_add(1, Ordering::SeqCst);
        if *self.fail_rollback.lock().unwrap() {
            return Err(Self::injected("rollback"));
        }
        self.inner.rollback(tx).await
    }
}

#[async_trait]
impl AccountStore for FaultyStore {
    type Tx = MemoryTx;

    async fn get_by_id(&self, id: AccountId) -> Result<Account, StoreError> {
        self.get_count.fetch_add(1, Ordering::SeqCst);
        self.inner.get_by_id(id).await
    }

    async fn create(
        &self,
        id: AccountId,
        initial_balance: Decimal,
    ) -> Result<Account, StoreError> {
        self.inner.create(id, initial_balance).await
    }

    async fn update_balance(
        &self,
        tx: &mut MemoryTx,
        id: AccountId,
        expected_version: Version,
        new_balance: Decimal,
    ) -> Result<Account, StoreError> {
        let call = self.update_count.fetch_add(1, Ordering::SeqCst) + 1;
        if *self.fail_update_call.lock().unwrap() == Some(call) {
            return Err(Self::injected("update"));
        }
        self.inner
            .update_balance(tx, id, expected_version, new_balance)
            .await
    }
}

#[async_trait]
impl LedgerStore for FaultyStore {
    type Tx = MemoryTx;

    async fn append(
        &self,
        tx: &mut MemoryTx,
        source_account_id: AccountId,
        destination_account_id: AccountId,
        amount: Amount,
    ) -> Result<RecordId, StoreError> {
        if *self.fail_append.lock().unwrap() {
            return Err(Self::injected("append"));
        }
        self.inner
            .append(tx, source_account_id, destination_account_id, amount)
            .await
    }

    async fn get(&self, id: RecordId) -> Result<TransferRecord, StoreError> {
        self.inner.get(id).await
    }
}
