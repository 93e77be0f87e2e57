use std::str::FromStr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::future::BoxFuture;
use proptest::prelude::*;
use rust_decimal::Decimal;

use ledger_transfer::store::MemoryTx;
use ledger_transfer::{
    AccountService, AccountStore, LedgerStore, MemoryStore, StoreError, TransactionBoundary,
    TransferError, TransferLimits, TransferRequest, TransferService,
};

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn service(store: &MemoryStore) -> TransferService<MemoryStore, MemoryStore, MemoryStore> {
    TransferService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        TransferLimits::default(),
    )
}

/// Boundary that runs one injected future right before opening the
/// transaction, i.e. after the orchestrator has read both accounts
struct InterleavingBoundary {
    inner: MemoryStore,
    hook: Mutex<Option<BoxFuture<'static, ()>>>,
}

#[async_trait]
impl TransactionBoundary for InterleavingBoundary {
    type Tx = MemoryTx;

    async fn begin(&self) -> Result<MemoryTx, StoreError> {
        let hook = self.hook.lock().unwrap().take();
        if let Some(hook) = hook {
            hook.await;
        }
        self.inner.begin().await
    }

    async fn commit(&self, tx: MemoryTx) -> Result<(), StoreError> {
        self.inner.commit(tx).await
    }

    async fn rollback(&self, tx: MemoryTx) -> Result<(), StoreError> {
        self.inner.rollback(tx).await
    }
}

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test]
async fn transfer_moves_exact_amount() {
    let store = MemoryStore::new();
    let accounts = AccountService::new(store.clone(), TransferLimits::default());
    accounts.create(123, "300.10000").await.unwrap();
    accounts.create(456, "200.10000").await.unwrap();

    let record_id = service(&store)
        .execute(&TransferRequest::new(123, 456, "100.12345"))
        .await
        .unwrap();

    let source = accounts.get(123).await.unwrap();
    let destination = accounts.get(456).await.unwrap();
    assert_eq!(source.balance.to_string(), "199.97655");
    assert_eq!(source.version, 2);
    assert_eq!(destination.balance.to_string(), "300.22345");
    assert_eq!(destination.version, 2);

    let record = store.get(record_id).await.unwrap();
    assert_eq!(record.amount, dec("100.12345"));
    assert_eq!(store.record_count(), 1);
}

#[tokio::test]
async fn insufficient_funds_changes_nothing() {
    let store = MemoryStore::with_accounts([(123, dec("100.10000")), (456, dec("5"))]);
    let err = service(&store)
        .transfer(123, 456, "200.12345")
        .await
        .unwrap_err();
    assert_eq!(err, TransferError::InsufficientFunds);
    assert_eq!(store.get_by_id(123).await.unwrap().version, 1);
    assert_eq!(store.record_count(), 0);
}

#[tokio::test]
async fn invalid_amount_rejected_for_unknown_accounts() {
    let store = MemoryStore::new();
    let err = service(&store).transfer(1, 2, "abc").await.unwrap_err();
    assert_eq!(err.code(), "INVALID_AMOUNT");
}

#[tokio::test]
async fn missing_destination_leaves_source_untouched() {
    let store = MemoryStore::with_accounts([(123, dec("50"))]);
    let err = service(&store).transfer(123, 999, "10").await.unwrap_err();
    assert_eq!(err, TransferError::AccountNotFound(999));

    let source = store.get_by_id(123).await.unwrap();
    assert_eq!(source.balance, dec("50"));
    assert_eq!(source.version, 1);
}

#[tokio::test]
async fn interleaved_transfer_loses_with_conflict() {
    let store = MemoryStore::with_accounts([(123, dec("300")), (456, dec("200"))]);

    let first = service(&store);
    let boundary = InterleavingBoundary {
        inner: store.clone(),
        hook: Mutex::new(Some(Box::pin(async move {
            first.transfer(123, 456, "100").await.unwrap();
        }))),
    };
    let second = TransferService::new(
        boundary,
        store.clone(),
        store.clone(),
        TransferLimits::default(),
    );

    let err = second.transfer(123, 456, "40").await.unwrap_err();
    assert_eq!(err, TransferError::ConcurrentModification(123));
    assert!(err.is_retryable());

    // Only the first transfer is visible
    let source = store.get_by_id(123).await.unwrap();
    assert_eq!(source.balance, dec("200"));
    assert_eq!(source.version, 2);
    assert_eq!(store.get_by_id(456).await.unwrap().balance, dec("300"));
    assert_eq!(store.record_count(), 1);
}

// ============================================================================
// Concurrency
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_transfers_conserve_funds() {
    let ids: Vec<i64> = (1..=4).collect();
    let store = MemoryStore::with_accounts(ids.iter().map(|&id| (id, dec("1000"))));
    let svc = Arc::new(service(&store));

    let mut handles = Vec::new();
    for i in 0..200usize {
        let svc = svc.clone();
        let source = ids[i % 4];
        let destination = ids[(i + 1 + i / 4 % 3) % 4];
        handles.push(tokio::spawn(async move {
            svc.transfer(source, destination, "1.00001").await
        }));
    }

    let mut committed = 0i64;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => committed += 1,
            Err(TransferError::ConcurrentModification(_)) => {}
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }

    assert!(committed > 0);
    assert_eq!(store.total_balance(), dec("4000"));
    assert_eq!(store.record_count() as i64, committed);

    // Each committed transfer bumps exactly two versions
    let mut bumps = 0;
    for &id in &ids {
        bumps += store.get_by_id(id).await.unwrap().version - 1;
    }
    assert_eq!(bumps, committed * 2);
}

// ============================================================================
// Properties
// ============================================================================

fn amount_text(units: u64, fraction: u64) -> String {
    format!("{}.{:05}", units, fraction)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn sequential_transfers_conserve_total(
        ops in prop::collection::vec((0i64..3, 0i64..3, 0u64..300, 0u64..100_000), 1..20)
    ) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let store = MemoryStore::with_accounts([
                (0, dec("500.00000")),
                (1, dec("250.50000")),
                (2, dec("0.00001")),
            ]);
            let svc = service(&store);
            let total = store.total_balance();
            let mut committed = 0i64;

            for (source, destination, units, fraction) in ops {
                let before = store.get_by_id(source).await.unwrap();
                match svc.transfer(source, destination, &amount_text(units, fraction)).await {
                    Ok(_) => committed += 1,
                    Err(TransferError::SameAccount) => {
                        prop_assert_eq!(source, destination);
                    }
                    Err(TransferError::InsufficientFunds) => {
                        prop_assert!(before.balance < dec(&amount_text(units, fraction)));
                    }
                    Err(other) => {
                        prop_assert!(false, "unexpected error: {:?}", other);
                    }
                }
                prop_assert_eq!(store.total_balance(), total);
            }

            let mut bumps = 0;
            for id in 0..3 {
                let account = store.get_by_id(id).await.unwrap();
                prop_assert!(account.balance >= Decimal::ZERO);
                bumps += account.version - 1;
            }
            prop_assert_eq!(bumps, committed * 2);
            prop_assert_eq!(store.record_count() as i64, committed);
            Ok(())
        })?;
    }
}
