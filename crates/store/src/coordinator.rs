//! Transaction coordinator: the write-side entry points of the core.

use std::sync::Arc;

use tracing::instrument;

use coinshop_core::{AccountId, Coins};

use crate::error::{PurchaseError, TransferError};
use crate::store::Store;

/// Runs purchases and transfers as atomic units against the store.
///
/// The coordinator owns the business preconditions (positive amount, no
/// self-transfer); the per-backend `Store` implementations own the atomic
/// load-check-mutate-commit sequence. Failures are reported to the caller
/// as typed errors and never retried here.
#[derive(Clone)]
pub struct TransactionCoordinator {
    store: Arc<dyn Store>,
}

impl TransactionCoordinator {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Debit the item's price and grant the item, or do neither.
    #[instrument(skip(self), fields(account = %account_id, item = item_name), err)]
    pub async fn purchase(
        &self,
        account_id: AccountId,
        item_name: &str,
    ) -> Result<(), PurchaseError> {
        self.store.purchase(account_id, item_name).await
    }

    /// Move `amount` coins from sender to receiver and append one ledger
    /// entry, or do nothing.
    #[instrument(skip(self), fields(from = %from, to = %to, amount), err)]
    pub async fn transfer(
        &self,
        from: AccountId,
        to: AccountId,
        amount: i64,
    ) -> Result<(), TransferError> {
        if amount <= 0 {
            return Err(TransferError::InvalidAmount);
        }
        if from == to {
            return Err(TransferError::SelfTransfer);
        }
        let amount = Coins::new(amount).map_err(|_| TransferError::InvalidAmount)?;

        self.store.transfer(from, to, amount).await
    }
}
