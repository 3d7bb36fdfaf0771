//! `coinshop-ledger` — the append-only transfer record and its rules.

pub mod entry;
pub mod history;

pub use entry::{LedgerEntry, validate_transfer};
pub use history::{CoinHistory, ReceivedTransfer, SentTransfer, TransferRecord};
