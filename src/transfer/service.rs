//! Transfer Service
//!
//! Moves funds between two accounts inside one store transaction.
//!
//! ```text
//! parse ─▶ check floor ─▶ read source ─▶ validate ─▶ read destination
//!                                                         │
//!           commit ◀─ credit ◀─ debit ◀─ append record ◀─ begin
//!              │
//!              └─ any failure after begin ─▶ rollback, return the error
//! ```
//!
//! No row locks are taken. Both balance writes are CAS updates against the
//! versions observed by the reads, so a concurrent writer on either account
//! turns this transfer into [`TransferError::ConcurrentModification`] and the
//! whole transaction is rolled back. Retrying is the caller's job.

use rust_decimal::Decimal;
use tracing::{debug, error, info, warn};

use super::error::TransferError;
use super::limits::TransferLimits;
use crate::account::Account;
use crate::core_types::{AccountId, RecordId};
use crate::ledger::TransferRequest;
use crate::money::{Amount, checked_credit, checked_debit, parse_amount};
use crate::store::{AccountStore, LedgerStore, TransactionBoundary};

/// Balances computed from the snapshot read before `begin`
struct TransferPlan {
    source: Account,
    destination: Account,
    amount: Amount,
    new_source_balance: Decimal,
    new_destination_balance: Decimal,
}

/// Transfer orchestrator
pub struct TransferService<B, A, L> {
    boundary: B,
    accounts: A,
    ledger: L,
    limits: TransferLimits,
}

impl<B, A, L> TransferService<B, A, L>
where
    B: TransactionBoundary,
    A: AccountStore<Tx = B::Tx>,
    L: LedgerStore<Tx = B::Tx>,
{
    pub fn new(boundary: B, accounts: A, ledger: L, limits: TransferLimits) -> Self {
        Self {
            boundary,
            accounts,
            ledger,
            limits,
        }
    }

    /// Execute a bound [`TransferRequest`]
    pub async fn execute(&self, req: &TransferRequest) -> Result<RecordId, TransferError> {
        self.transfer(req.source_account_id, req.destination_account_id, &req.amount)
            .await
    }

    /// Move `amount_text` from `source_id` to `destination_id`
    ///
    /// Returns the id of the ledger record written by the committed
    /// transaction. Input, lookup and business-rule errors are reported
    /// before any transaction is opened.
    pub async fn transfer(
        &self,
        source_id: AccountId,
        destination_id: AccountId,
        amount_text: &str,
    ) -> Result<RecordId, TransferError> {
        let plan = self.prepare(source_id, destination_id, amount_text).await?;

        let mut tx = self.boundary.begin().await.map_err(|e| {
            error!(source_id, destination_id, error = %e, "Failed to begin transaction");
            TransferError::from(e)
        })?;

        match self.apply(&mut tx, &plan).await {
            Ok(record_id) => {
                if let Err(e) = self.boundary.commit(tx).await {
                    error!(record_id, error = %e, "Commit failed, transfer not applied");
                    return Err(e.into());
                }
                info!(
                    record_id,
                    source_id,
                    destination_id,
                    amount = %plan.amount,
                    "Transfer committed"
                );
                Ok(record_id)
            }
            Err(e) => {
                warn!(
                    source_id,
                    destination_id,
                    amount = %plan.amount,
                    error = %e,
                    "Transfer failed inside transaction, rolling back"
                );
                if let Err(rollback_err) = self.boundary.rollback(tx).await {
                    error!(error = %rollback_err, "Rollback failed");
                }
                Err(e)
            }
        }
    }

    /// Steps before `begin`: parse, validate, read both accounts
    async fn prepare(
        &self,
        source_id: AccountId,
        destination_id: AccountId,
        amount_text: &str,
    ) -> Result<TransferPlan, TransferError> {
        let amount = parse_amount(amount_text).map_err(|e| {
            debug!(amount = amount_text, error = %e, "Rejected transfer amount");
            TransferError::from(e)
        })?;

        // Redundant with the parser for the default floor of zero
        if amount.value() < self.limits.min_transaction_amount {
            return Err(TransferError::InvalidAmount(format!(
                "amount {} is below minimum transaction amount {}",
                amount, self.limits.min_transaction_amount
            )));
        }

        if source_id == destination_id {
            return Err(TransferError::SameAccount);
        }

        let source = self.accounts.get_by_id(source_id).await?;
        validate_source(&source, amount, &self.limits)?;

        let destination = self.accounts.get_by_id(destination_id).await?;

        let new_source_balance = checked_debit(source.balance, amount)?;
        let new_destination_balance = checked_credit(destination.balance, amount)?;

        Ok(TransferPlan {
            source,
            destination,
            amount,
            new_source_balance,
            new_destination_balance,
        })
    }

    /// Steps inside the transaction: record, debit, credit
    async fn apply(&self, tx: &mut B::Tx, plan: &TransferPlan) -> Result<RecordId, TransferError> {
        let record_id = self
            .ledger
            .append(tx, plan.source.id, plan.destination.id, plan.amount)
            .await?;

        let debited = self
            .accounts
            .update_balance(
                tx,
                plan.source.id,
                plan.source.version,
                plan.new_source_balance,
            )
            .await?;
        debug!(
            account_id = debited.id,
            version = debited.version,
            balance = %debited.balance,
            "Source debited"
        );

        let credited = self
            .accounts
            .update_balance(
                tx,
                plan.destination.id,
                plan.destination.version,
                plan.new_destination_balance,
            )
            .await?;
        debug!(
            account_id = credited.id,
            version = credited.version,
            balance = %credited.balance,
            "Destination credited"
        );

        Ok(record_id)
    }
}

/// Source-side business rules against the snapshot balance
///
/// The floor check should never fire for an account that only changed
/// through this service; it fails loudly on a corrupt row instead.
fn validate_source(
    source: &Account,
    amount: Amount,
    limits: &TransferLimits,
) -> Result<(), TransferError> {
    if source.balance < amount.value() {
        return Err(TransferError::InsufficientFunds);
    }

    if source.balance < limits.min_account_balance {
        warn!(
            account_id = source.id,
            balance = %source.balance,
            "Account balance already below minimum"
        );
        return Err(TransferError::BelowMinimumBalance);
    }

    if source.balance - amount.value() < limits.min_account_balance {
        return Err(TransferError::BelowMinimumBalance);
    }

    Ok(())
}
