//! Account provisioning and lookup

use tracing::info;

use super::models::{Account, CreateAccountRequest};
use crate::core_types::AccountId;
use crate::money::parse_amount;
use crate::store::AccountStore;
use crate::transfer::{TransferError, TransferLimits};

/// Account service
///
/// Creation applies the same amount parsing and balance floor as transfers.
pub struct AccountService<A> {
    accounts: A,
    limits: TransferLimits,
}

impl<A: AccountStore> AccountService<A> {
    pub fn new(accounts: A, limits: TransferLimits) -> Self {
        Self { accounts, limits }
    }

    /// Create an account at version 1 with `initial_balance_text`
    pub async fn create(
        &self,
        id: AccountId,
        initial_balance_text: &str,
    ) -> Result<Account, TransferError> {
        let balance = parse_amount(initial_balance_text)?;
        if balance.value() < self.limits.min_account_balance {
            return Err(TransferError::BelowMinimumBalance);
        }

        let account = self.accounts.create(id, balance.value()).await?;
        info!(account_id = id, balance = %account.balance, "Account created");
        Ok(account)
    }

    pub async fn create_from_request(
        &self,
        req: &CreateAccountRequest,
    ) -> Result<Account, TransferError> {
        self.create(req.account_id, &req.initial_balance).await
    }

    pub async fn get(&self, id: AccountId) -> Result<Account, TransferError> {
        Ok(self.accounts.get_by_id(id).await?)
    }
}
