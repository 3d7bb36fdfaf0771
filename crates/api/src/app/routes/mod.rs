use axum::{
    Router,
    routing::{get, post},
};

pub mod auth;
pub mod coins;
pub mod info;
pub mod shop;
pub mod system;

/// Router for all authenticated endpoints (mounted under `/api`).
pub fn router() -> Router {
    Router::new()
        .route("/info", get(info::get_info))
        .route("/buy/:item", get(shop::buy_item))
        .route("/sendCoin", post(coins::send_coin))
}
