//! Data models for ledger accounts

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::core_types::{AccountId, Version};

/// Account row: balance plus optimistic-lock version
///
/// Balance and version are only ever written together, through the
/// conditional update path of the account store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Account {
    pub id: AccountId,
    pub balance: Decimal,
    pub version: Version,
}

impl Account {
    pub fn new(id: AccountId, balance: Decimal, version: Version) -> Self {
        Self {
            id,
            balance,
            version,
        }
    }
}

/// Account creation request (JSON shape used by outer transports)
///
/// `initial_balance` is a decimal string; JSON numbers are rejected so that
/// amounts never pass through binary floating point.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAccountRequest {
    pub account_id: AccountId,
    pub initial_balance: String,
}
