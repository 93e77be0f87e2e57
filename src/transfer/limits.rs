use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Balance and amount floors enforced by the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferLimits {
    /// Smallest amount a single transfer may move (inclusive)
    #[serde(default)]
    pub min_transaction_amount: Decimal,
    /// Smallest balance an account may hold (inclusive)
    #[serde(default)]
    pub min_account_balance: Decimal,
}

impl Default for TransferLimits {
    fn default() -> Self {
        Self {
            min_transaction_amount: Decimal::ZERO,
            min_account_balance: Decimal::ZERO,
        }
    }
}
