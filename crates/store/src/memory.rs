//! In-memory store implementation (dev/test).
//!
//! Mirrors the Postgres backend's atomicity contract: each mutating unit
//! stages its writes on a scratch copy of the state and swaps it in as the
//! commit, while holding the state lock for the whole unit. Holding the lock
//! serializes balance check-and-mutate exactly like the row locks do in
//! Postgres; an error return before the swap leaves the shared state
//! untouched.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::collections::btree_map::Entry as MapEntry;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use tokio::sync::Mutex;

use async_trait::async_trait;

use coinshop_accounts::{Account, Credential};
use coinshop_core::{AccountId, Coins};
use coinshop_inventory::InventoryEntry;
use coinshop_ledger::{LedgerEntry, TransferRecord};

use crate::error::{PurchaseError, StoreError, TransferError};
use crate::store::Store;

#[derive(Debug, Clone, Default)]
struct State {
    accounts: HashMap<AccountId, Account>,
    names: HashMap<String, AccountId>,
    digests: HashMap<AccountId, String>,
    catalog: BTreeMap<String, Coins>,
    inventory: BTreeMap<(AccountId, String), InventoryEntry>,
    ledger: Vec<LedgerEntry>,
}

/// In-memory store with the seeded catalog.
#[derive(Debug)]
pub struct MemoryStore {
    state: Mutex<State>,
    fail_next_commit: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        let mut state = State::default();
        for item in coinshop_catalog::seed() {
            state.catalog.insert(item.name, item.price);
        }
        Self {
            state: Mutex::new(state),
            fail_next_commit: AtomicBool::new(false),
        }
    }

    /// Test hook: make the next commit fail after the unit's writes are
    /// staged, exercising the rollback path.
    pub(crate) fn inject_commit_failure(&self) {
        self.fail_next_commit.store(true, Ordering::SeqCst);
    }

    fn commit_staged(
        &self,
        state: &mut State,
        staged: State,
        operation: &'static str,
    ) -> Result<(), StoreError> {
        if self.fail_next_commit.swap(false, Ordering::SeqCst) {
            return Err(StoreError::unavailable(operation, "injected commit failure"));
        }
        *state = staged;
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn resolve_account_by_name(&self, name: &str) -> Result<Option<Account>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .names
            .get(name)
            .and_then(|id| state.accounts.get(id))
            .cloned())
    }

    async fn credential_by_name(&self, name: &str) -> Result<Option<Credential>, StoreError> {
        let state = self.state.lock().await;
        let Some(id) = state.names.get(name) else {
            return Ok(None);
        };
        let digest = state
            .digests
            .get(id)
            .ok_or_else(|| StoreError::corrupt("credential_by_name", "account without digest"))?;
        Ok(Some(Credential {
            id: *id,
            name: name.to_string(),
            digest: digest.clone(),
        }))
    }

    async fn create_account(
        &self,
        name: &str,
        credential_digest: &str,
    ) -> Result<Account, StoreError> {
        let mut state = self.state.lock().await;
        if state.names.contains_key(name) {
            return Err(StoreError::constraint(
                "create_account",
                format!("name already taken: {name}"),
            ));
        }

        let account = Account::with_starting_balance(name)
            .map_err(|e| StoreError::constraint("create_account", e.to_string()))?;

        state.names.insert(account.name.clone(), account.id);
        state
            .digests
            .insert(account.id, credential_digest.to_string());
        state.accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn account_by_id(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.accounts.get(&id).cloned())
    }

    async fn purchase(&self, account_id: AccountId, item_name: &str) -> Result<(), PurchaseError> {
        let mut state = self.state.lock().await;

        if !state.accounts.contains_key(&account_id) {
            return Err(PurchaseError::AccountNotFound);
        }
        let price = *state
            .catalog
            .get(item_name)
            .ok_or_else(|| PurchaseError::ItemNotFound(item_name.to_string()))?;

        let mut staged = state.clone();
        let account = staged
            .accounts
            .get_mut(&account_id)
            .ok_or(PurchaseError::AccountNotFound)?;

        if account.balance < price {
            return Err(PurchaseError::InsufficientBalance {
                balance: account.balance.get(),
                price: price.get(),
            });
        }
        account
            .debit(price)
            .map_err(|e| StoreError::constraint("purchase", e.to_string()))?;

        match staged.inventory.entry((account_id, item_name.to_string())) {
            MapEntry::Occupied(mut entry) => entry
                .get_mut()
                .increment()
                .map_err(|e| StoreError::constraint("purchase", e.to_string()))?,
            MapEntry::Vacant(slot) => {
                slot.insert(InventoryEntry::first(account_id, item_name));
            }
        }

        self.commit_staged(&mut state, staged, "purchase")?;
        Ok(())
    }

    async fn transfer(
        &self,
        from: AccountId,
        to: AccountId,
        amount: Coins,
    ) -> Result<(), TransferError> {
        if amount.is_zero() {
            return Err(TransferError::InvalidAmount);
        }
        if from == to {
            return Err(TransferError::SelfTransfer);
        }

        let mut state = self.state.lock().await;
        if !state.accounts.contains_key(&to) {
            return Err(TransferError::ReceiverNotFound);
        }

        let mut staged = state.clone();
        let sender = staged
            .accounts
            .get_mut(&from)
            .ok_or(TransferError::SenderNotFound)?;

        if sender.balance < amount {
            return Err(TransferError::InsufficientBalance {
                balance: sender.balance.get(),
                amount: amount.get(),
            });
        }
        sender
            .debit(amount)
            .map_err(|e| StoreError::constraint("transfer", e.to_string()))?;

        let receiver = staged
            .accounts
            .get_mut(&to)
            .ok_or(TransferError::ReceiverNotFound)?;
        receiver
            .credit(amount)
            .map_err(|e| StoreError::constraint("transfer", e.to_string()))?;

        let entry = LedgerEntry::record(from, to, amount, Utc::now())
            .map_err(|_| TransferError::InvalidAmount)?;
        staged.ledger.push(entry);

        self.commit_staged(&mut state, staged, "transfer")?;
        Ok(())
    }

    async fn inventory_for(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<InventoryEntry>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .inventory
            .values()
            .filter(|entry| entry.account_id == account_id)
            .cloned()
            .collect())
    }

    async fn transfers_for(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<TransferRecord>, StoreError> {
        let state = self.state.lock().await;
        let name_of = |id: AccountId| -> Result<String, StoreError> {
            state
                .accounts
                .get(&id)
                .map(|a| a.name.clone())
                .ok_or_else(|| StoreError::corrupt("transfers_for", "ledger references unknown account"))
        };

        state
            .ledger
            .iter()
            .filter(|entry| entry.from == account_id || entry.to == account_id)
            .map(|entry| {
                Ok(TransferRecord {
                    entry: entry.clone(),
                    from_name: name_of(entry.from)?,
                    to_name: name_of(entry.to)?,
                })
            })
            .collect()
    }
}
