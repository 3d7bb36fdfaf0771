use serde::{Deserialize, Serialize};

use coinshop_core::{AccountId, Coins};

use crate::entry::LedgerEntry;

/// A ledger entry joined with both parties' display names, as read back for
/// presentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRecord {
    pub entry: LedgerEntry,
    pub from_name: String,
    pub to_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceivedTransfer {
    pub from: String,
    pub amount: Coins,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentTransfer {
    pub to: String,
    pub amount: Coins,
}

/// An account's transfer history, split by direction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinHistory {
    pub received: Vec<ReceivedTransfer>,
    pub sent: Vec<SentTransfer>,
}

impl CoinHistory {
    /// Partition the records touching `account` by direction, keeping the
    /// counterparty's display name. Direction is decided on account ids, not
    /// names.
    pub fn partition(
        account: AccountId,
        records: impl IntoIterator<Item = TransferRecord>,
    ) -> Self {
        let mut history = CoinHistory::default();

        for record in records {
            if record.entry.to == account {
                history.received.push(ReceivedTransfer {
                    from: record.from_name,
                    amount: record.entry.amount,
                });
            } else if record.entry.from == account {
                history.sent.push(SentTransfer {
                    to: record.to_name,
                    amount: record.entry.amount,
                });
            }
        }

        history
    }
}
