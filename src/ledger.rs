//! Ledger - transfer records
//!
//! Every committed transfer leaves exactly one immutable record in the
//! append-only `transactions` table.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::core_types::{AccountId, RecordId};

/// Immutable transfer record
///
/// References both accounts but owns neither. `created_at` is assigned by
/// the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct TransferRecord {
    pub id: RecordId,
    pub source_account_id: AccountId,
    pub destination_account_id: AccountId,
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Inbound transfer request, alive for one orchestration call
///
/// `amount` stays text until the amount parser has validated it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub source_account_id: AccountId,
    pub destination_account_id: AccountId,
    pub amount: String,
}

impl TransferRequest {
    pub fn new(
        source_account_id: AccountId,
        destination_account_id: AccountId,
        amount: impl Into<String>,
    ) -> Self {
        Self {
            source_account_id,
            destination_account_id,
            amount: amount.into(),
        }
    }
}

/// Response body for a committed transfer
#[derive(Debug, Clone, Serialize)]
pub struct TransferResponse {
    pub transaction_id: RecordId,
}
