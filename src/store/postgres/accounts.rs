//! Account table access
//!
//! Balance updates use an atomic CAS on the version column:
//! `UPDATE ... WHERE id = $2 AND version = $3`. Zero rows affected means a
//! concurrent writer got there first.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;

use super::PgTx;
use crate::account::Account;
use crate::core_types::{AccountId, Version};
use crate::money::normalize;
use crate::store::{AccountStore, StoreError};

/// Account database operations
#[derive(Clone)]
pub struct AccountDb {
    pool: PgPool,
}

impl AccountDb {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for AccountDb {
    type Tx = PgTx;

    async fn get_by_id(&self, id: AccountId) -> Result<Account, StoreError> {
        let row: Option<Account> =
            sqlx::query_as(r#"SELECT id, balance, version FROM accounts WHERE id = $1"#)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.ok_or(StoreError::AccountNotFound(id))
    }

    async fn create(
        &self,
        id: AccountId,
        initial_balance: Decimal,
    ) -> Result<Account, StoreError> {
        let result = sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (id, balance, version)
            VALUES ($1, $2, 1)
            RETURNING id, balance, version
            "#,
        )
        .bind(id)
        .bind(normalize(initial_balance)?)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(account) => {
                tracing::debug!(account_id = id, "Account row inserted");
                Ok(account)
            }
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(StoreError::Conflict(id))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn update_balance(
        &self,
        tx: &mut PgTx,
        id: AccountId,
        expected_version: Version,
        new_balance: Decimal,
    ) -> Result<Account, StoreError> {
        let row: Option<Account> = sqlx::query_as(
            r#"
            UPDATE accounts
            SET balance = $1, version = version + 1
            WHERE id = $2 AND version = $3
            RETURNING id, balance, version
            "#,
        )
        .bind(normalize(new_balance)?)
        .bind(id)
        .bind(expected_version)
        .fetch_optional(&mut **tx)
        .await?;

        row.ok_or(StoreError::VersionConflict {
            id,
            expected_version,
        })
    }
}
