//! Profile aggregator: the read-side entry point of the core.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::instrument;

use coinshop_accounts::Account;
use coinshop_core::AccountId;
use coinshop_inventory::InventoryEntry;
use coinshop_ledger::CoinHistory;

use crate::error::{AggregationError, StoreError};
use crate::store::Store;

/// Reads slower than this get a warn log (matches the original service's
/// slow-SQL threshold).
const SLOW_READ: Duration = Duration::from_millis(50);

/// A user's balance, inventory and transfer history, assembled from
/// independent reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub account: Account,
    pub inventory: Vec<InventoryEntry>,
    pub history: CoinHistory,
}

/// Fans out the three profile reads concurrently and merges the results.
#[derive(Clone)]
pub struct ProfileAggregator {
    store: Arc<dyn Store>,
}

impl ProfileAggregator {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Assemble a profile. The three reads run concurrently as structured
    /// tasks; the first failure fails the whole aggregation and no partial
    /// profile is returned.
    #[instrument(skip(self), fields(account = %account_id), err)]
    pub async fn profile(&self, account_id: AccountId) -> Result<Profile, AggregationError> {
        let (account, inventory, transfers) = tokio::try_join!(
            timed("account_by_id", self.store.account_by_id(account_id)),
            timed("inventory_for", self.store.inventory_for(account_id)),
            timed("transfers_for", self.store.transfers_for(account_id)),
        )?;

        let account = account.ok_or(AggregationError::AccountNotFound)?;
        let history = CoinHistory::partition(account_id, transfers);

        Ok(Profile {
            account,
            inventory,
            history,
        })
    }
}

async fn timed<T>(
    operation: &'static str,
    read: impl Future<Output = Result<T, StoreError>>,
) -> Result<T, AggregationError> {
    let start = Instant::now();
    let result = read.await;
    let elapsed = start.elapsed();
    if elapsed > SLOW_READ {
        tracing::warn!(operation, ?elapsed, "slow profile read");
    }
    result.map_err(AggregationError::Read)
}
