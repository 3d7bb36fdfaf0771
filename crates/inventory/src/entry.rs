use serde::{Deserialize, Serialize};

use coinshop_core::{AccountId, DomainError};

/// Owned quantity of one item for one account.
///
/// Entries come into existence on first purchase with quantity 1 and only
/// ever grow; nothing in the core decrements or deletes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryEntry {
    pub account_id: AccountId,
    pub item: String,
    pub quantity: i64,
}

impl InventoryEntry {
    /// Entry created by the first purchase of `item`.
    pub fn first(account_id: AccountId, item: impl Into<String>) -> Self {
        Self {
            account_id,
            item: item.into(),
            quantity: 1,
        }
    }

    /// Repeat purchase.
    pub fn increment(&mut self) -> Result<(), DomainError> {
        self.quantity = self
            .quantity
            .checked_add(1)
            .ok_or_else(|| DomainError::invariant("inventory quantity overflow"))?;
        Ok(())
    }
}
