//! Transfer record table access (append-only)

use async_trait::async_trait;
use sqlx::PgPool;

use super::PgTx;
use crate::core_types::{AccountId, RecordId};
use crate::ledger::TransferRecord;
use crate::money::Amount;
use crate::store::{LedgerStore, StoreError};

/// Transfer ledger database operations
#[derive(Clone)]
pub struct LedgerDb {
    pool: PgPool,
}

impl LedgerDb {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LedgerStore for LedgerDb {
    type Tx = PgTx;

    async fn append(
        &self,
        tx: &mut PgTx,
        source_account_id: AccountId,
        destination_account_id: AccountId,
        amount: Amount,
    ) -> Result<RecordId, StoreError> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO transactions (source_account_id, destination_account_id, amount)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(source_account_id)
        .bind(destination_account_id)
        .bind(amount.value())
        .fetch_one(&mut **tx)
        .await?;

        Ok(id)
    }

    async fn get(&self, id: RecordId) -> Result<TransferRecord, StoreError> {
        let row: Option<TransferRecord> = sqlx::query_as(
            r#"
            SELECT id, source_account_id, destination_account_id, amount, created_at
            FROM transactions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or(StoreError::RecordNotFound(id))
    }
}
