use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use coinshop_core::{AccountId, Coins, DomainError, LedgerEntryId};

/// Immutable record of one completed transfer.
///
/// Entries are append-only and are the sole source of truth for transfer
/// history; purchases never produce one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: LedgerEntryId,
    pub from: AccountId,
    pub to: AccountId,
    pub amount: Coins,
    pub occurred_at: DateTime<Utc>,
}

impl LedgerEntry {
    pub fn record(
        from: AccountId,
        to: AccountId,
        amount: Coins,
        occurred_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        validate_transfer(from, to, amount.get())?;
        Ok(Self {
            id: LedgerEntryId::new(),
            from,
            to,
            amount,
            occurred_at,
        })
    }
}

/// Transfer rules: a positive amount between two distinct accounts.
pub fn validate_transfer(from: AccountId, to: AccountId, amount: i64) -> Result<Coins, DomainError> {
    if amount <= 0 {
        return Err(DomainError::validation("transfer amount must be positive"));
    }
    if from == to {
        return Err(DomainError::validation("cannot transfer coins to yourself"));
    }
    Coins::new(amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashMap;

    #[test]
    fn zero_and_negative_amounts_are_rejected() {
        let (a, b) = (AccountId::new(), AccountId::new());
        assert!(validate_transfer(a, b, 0).is_err());
        assert!(validate_transfer(a, b, -5).is_err());
        assert!(validate_transfer(a, b, 1).is_ok());
    }

    #[test]
    fn self_transfer_is_rejected_regardless_of_amount() {
        let a = AccountId::new();
        assert!(validate_transfer(a, a, 100).is_err());
    }

    #[test]
    fn record_rejects_invalid_transfers() {
        let a = AccountId::new();
        assert!(LedgerEntry::record(a, a, Coins::from_raw(10), Utc::now()).is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: applying any sequence of transfers (skipping the ones the
        /// rules or balances reject) conserves the total coin supply and never
        /// drives a balance negative.
        #[test]
        fn transfers_conserve_total_supply(
            balances in prop::collection::vec(0i64..10_000, 2..6),
            moves in prop::collection::vec((0usize..6, 0usize..6, 1i64..5_000), 0..40)
        ) {
            let ids: Vec<AccountId> = (0..balances.len()).map(|_| AccountId::new()).collect();
            let mut accounts: HashMap<AccountId, i64> =
                ids.iter().copied().zip(balances.iter().copied()).collect();
            let total: i64 = balances.iter().sum();

            for (from_idx, to_idx, amount) in moves {
                let from = ids[from_idx % ids.len()];
                let to = ids[to_idx % ids.len()];

                let Ok(amount) = validate_transfer(from, to, amount) else {
                    continue;
                };
                if accounts[&from] < amount.get() {
                    continue;
                }

                *accounts.get_mut(&from).unwrap() -= amount.get();
                *accounts.get_mut(&to).unwrap() += amount.get();
            }

            prop_assert_eq!(accounts.values().sum::<i64>(), total);
            prop_assert!(accounts.values().all(|b| *b >= 0));
        }
    }
}
