use serde::{Deserialize, Serialize};

use coinshop_store::Profile;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct AuthRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SendCoinRequest {
    #[serde(rename = "toUser")]
    pub to_user: String,
    pub amount: i64,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct InventoryItemResponse {
    #[serde(rename = "type")]
    pub item_type: String,
    pub quantity: i64,
}

#[derive(Debug, Serialize)]
pub struct ReceivedTransferResponse {
    #[serde(rename = "fromUser")]
    pub from_user: String,
    pub amount: i64,
}

#[derive(Debug, Serialize)]
pub struct SentTransferResponse {
    #[serde(rename = "toUser")]
    pub to_user: String,
    pub amount: i64,
}

#[derive(Debug, Serialize)]
pub struct CoinHistoryResponse {
    pub received: Vec<ReceivedTransferResponse>,
    pub sent: Vec<SentTransferResponse>,
}

#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub coin: i64,
    pub inventory: Vec<InventoryItemResponse>,
    #[serde(rename = "coinHistory")]
    pub coin_history: CoinHistoryResponse,
}

pub fn profile_to_response(profile: Profile) -> InfoResponse {
    InfoResponse {
        coin: profile.account.balance.get(),
        inventory: profile
            .inventory
            .into_iter()
            .map(|entry| InventoryItemResponse {
                item_type: entry.item,
                quantity: entry.quantity,
            })
            .collect(),
        coin_history: CoinHistoryResponse {
            received: profile
                .history
                .received
                .into_iter()
                .map(|t| ReceivedTransferResponse {
                    from_user: t.from,
                    amount: t.amount.get(),
                })
                .collect(),
            sent: profile
                .history
                .sent
                .into_iter()
                .map(|t| SentTransferResponse {
                    to_user: t.to,
                    amount: t.amount.get(),
                })
                .collect(),
        },
    }
}
