//! `coinshop-inventory` — per-account owned item quantities.

pub mod entry;

pub use entry::InventoryEntry;
