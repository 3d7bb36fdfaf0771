//! The storage seam shared by the coordinator and the aggregator.

use async_trait::async_trait;

use coinshop_accounts::{Account, Credential};
use coinshop_core::{AccountId, Coins};
use coinshop_inventory::InventoryEntry;
use coinshop_ledger::TransferRecord;

use crate::error::{PurchaseError, StoreError, TransferError};

/// One durable store holding accounts, catalog, inventory and ledger.
///
/// `purchase` and `transfer` are the coordinator's atomic units: each
/// backend must apply all of their steps or none, and must serialize the
/// balance check-and-mutate per affected account. Everything else is a plain
/// row read. Implementations: [`crate::PgStore`] (production) and
/// [`crate::MemoryStore`] (dev/test).
#[async_trait]
pub trait Store: Send + Sync {
    /// Look up an account (without its credential) by display name.
    async fn resolve_account_by_name(&self, name: &str) -> Result<Option<Account>, StoreError>;

    /// Look up the login credential for a display name.
    async fn credential_by_name(&self, name: &str) -> Result<Option<Credential>, StoreError>;

    /// Create an account with the starting balance. The display name must be
    /// free; a taken name is a constraint violation.
    async fn create_account(
        &self,
        name: &str,
        credential_digest: &str,
    ) -> Result<Account, StoreError>;

    async fn account_by_id(&self, id: AccountId) -> Result<Option<Account>, StoreError>;

    /// Atomic unit: load account and item, check the balance, debit the
    /// price, upsert the inventory row, commit.
    async fn purchase(&self, account_id: AccountId, item_name: &str) -> Result<(), PurchaseError>;

    /// Atomic unit: lock both balances, check the sender's, move `amount`,
    /// append one ledger entry, commit.
    async fn transfer(
        &self,
        from: AccountId,
        to: AccountId,
        amount: Coins,
    ) -> Result<(), TransferError>;

    async fn inventory_for(&self, account_id: AccountId)
    -> Result<Vec<InventoryEntry>, StoreError>;

    /// All ledger entries where the account is sender or receiver, joined
    /// with both parties' display names.
    async fn transfers_for(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<TransferRecord>, StoreError>;
}
