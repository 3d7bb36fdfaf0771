use serde::{Deserialize, Serialize};

use coinshop_core::{Coins, DomainError};

/// A purchasable item: unique name, positive price.
///
/// Catalog data is static reference data; nothing in the core mutates it
/// after the seed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub name: String,
    pub price: Coins,
}

impl CatalogItem {
    pub fn new(name: impl Into<String>, price: Coins) -> Result<Self, DomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("item name cannot be empty"));
        }
        if price.is_zero() {
            return Err(DomainError::validation("item price must be positive"));
        }
        Ok(Self { name, price })
    }
}

/// The pre-seeded merch catalog.
pub fn seed() -> Vec<CatalogItem> {
    const ITEMS: &[(&str, i64)] = &[
        ("t-shirt", 80),
        ("cup", 20),
        ("book", 50),
        ("pen", 10),
        ("powerbank", 200),
        ("hoody", 300),
        ("umbrella", 200),
        ("socks", 10),
        ("wallet", 50),
        ("pink-hoody", 500),
    ];

    ITEMS
        .iter()
        .map(|(name, price)| CatalogItem {
            name: (*name).to_string(),
            price: Coins::from_raw(*price),
        })
        .collect()
}
