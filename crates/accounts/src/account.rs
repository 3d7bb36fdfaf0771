use serde::{Deserialize, Serialize};

use coinshop_core::{AccountId, Coins, DomainError};

/// Balance granted to every account at registration.
pub const STARTING_BALANCE: Coins = Coins::from_raw(1000);

/// A user identity plus its coin balance.
///
/// Accounts are created at first authentication and never deleted. The
/// balance is mutated only through the transaction coordinator; the pure
/// `credit`/`debit` operations below encode the balance rules it relies on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    pub balance: Coins,
}

impl Account {
    pub fn new(name: impl Into<String>, balance: Coins) -> Result<Self, DomainError> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self {
            id: AccountId::new(),
            name,
            balance,
        })
    }

    /// New account with the registration grant.
    pub fn with_starting_balance(name: impl Into<String>) -> Result<Self, DomainError> {
        Self::new(name, STARTING_BALANCE)
    }

    pub fn credit(&mut self, amount: Coins) -> Result<(), DomainError> {
        self.balance = self.balance.checked_add(amount)?;
        Ok(())
    }

    /// Debit the balance, refusing to go negative.
    pub fn debit(&mut self, amount: Coins) -> Result<(), DomainError> {
        if self.balance < amount {
            return Err(DomainError::invariant("balance cannot go negative"));
        }
        self.balance = self.balance.checked_sub(amount)?;
        Ok(())
    }
}

/// Login credential: an account reference plus its opaque secret digest.
///
/// The digest is produced and verified by the auth collaborator; nothing in
/// the ledger core interprets it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub id: AccountId,
    pub name: String,
    pub digest: String,
}

/// Display names are unique, immutable keys; keep them printable and bounded.
pub fn validate_name(name: &str) -> Result<(), DomainError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation("name cannot be empty"));
    }
    if trimmed != name {
        return Err(DomainError::validation(
            "name cannot have leading or trailing whitespace",
        ));
    }
    if name.chars().count() > 64 {
        return Err(DomainError::validation("name cannot exceed 64 characters"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn new_account_gets_starting_balance() {
        let account = Account::with_starting_balance("alice").unwrap();
        assert_eq!(account.balance, STARTING_BALANCE);
    }

    #[test]
    fn debit_refuses_to_overdraw() {
        let mut account = Account::new("bob", Coins::from_raw(300)).unwrap();
        let err = account.debit(Coins::from_raw(500)).unwrap_err();
        assert_eq!(err, DomainError::invariant("balance cannot go negative"));
        assert_eq!(account.balance.get(), 300);
    }

    #[test]
    fn empty_and_padded_names_are_rejected() {
        assert!(Account::with_starting_balance("").is_err());
        assert!(Account::with_starting_balance("  ").is_err());
        assert!(Account::with_starting_balance(" alice").is_err());
    }

    proptest! {
        /// Property: no sequence of credits and debits can drive a balance
        /// negative; debits beyond the balance are rejected without effect.
        #[test]
        fn balance_never_goes_negative(
            start in 0i64..10_000,
            deltas in prop::collection::vec((any::<bool>(), 1i64..5_000), 0..50)
        ) {
            let mut account = Account::new("prop", Coins::new(start).unwrap()).unwrap();

            for (is_credit, amount) in deltas {
                let amount = Coins::new(amount).unwrap();
                let before = account.balance;
                let result = if is_credit {
                    account.credit(amount)
                } else {
                    account.debit(amount)
                };
                if result.is_err() {
                    prop_assert_eq!(account.balance, before);
                }
                prop_assert!(account.balance.get() >= 0);
            }
        }
    }
}
