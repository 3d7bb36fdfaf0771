//! Coin amounts: the single integer currency unit of the system.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// A non-negative amount of coins.
///
/// `Coins` is a value object: balances, prices and transfer amounts are all
/// expressed in it, and the non-negativity invariant is enforced at
/// construction so a negative balance is unrepresentable in the domain layer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Coins(i64);

impl Coins {
    pub const ZERO: Coins = Coins(0);

    /// Construct from a raw unit count, rejecting negative values.
    pub fn new(value: i64) -> Result<Self, DomainError> {
        if value < 0 {
            return Err(DomainError::validation("coin amount cannot be negative"));
        }
        Ok(Self(value))
    }

    /// Const constructor for amounts known non-negative at compile time
    /// (seed data, test fixtures).
    pub const fn from_raw(value: i64) -> Self {
        assert!(value >= 0);
        Self(value)
    }

    pub fn get(self) -> i64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Coins) -> Result<Coins, DomainError> {
        self.0
            .checked_add(other.0)
            .map(Coins)
            .ok_or_else(|| DomainError::invariant("coin amount overflow"))
    }

    pub fn checked_sub(self, other: Coins) -> Result<Coins, DomainError> {
        if other.0 > self.0 {
            return Err(DomainError::invariant("coin amount cannot go negative"));
        }
        Ok(Coins(self.0 - other.0))
    }
}

impl core::fmt::Display for Coins {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_negative_amounts() {
        assert!(Coins::new(-1).is_err());
        assert_eq!(Coins::new(0).unwrap(), Coins::ZERO);
    }

    #[test]
    fn subtraction_cannot_underflow() {
        let a = Coins::new(10).unwrap();
        let b = Coins::new(20).unwrap();
        assert!(a.checked_sub(b).is_err());
        assert_eq!(b.checked_sub(a).unwrap().get(), 10);
    }

    #[test]
    fn addition_detects_overflow() {
        let max = Coins::new(i64::MAX).unwrap();
        assert!(max.checked_add(Coins::from_raw(1)).is_err());
    }
}
