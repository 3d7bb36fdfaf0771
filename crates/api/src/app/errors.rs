use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use coinshop_store::{AggregationError, PurchaseError, TransferError};

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn purchase_error_to_response(err: PurchaseError) -> axum::response::Response {
    match err {
        PurchaseError::AccountNotFound => {
            json_error(StatusCode::BAD_REQUEST, "account_not_found", err.to_string())
        }
        PurchaseError::ItemNotFound(_) => {
            json_error(StatusCode::BAD_REQUEST, "item_not_found", err.to_string())
        }
        PurchaseError::InsufficientBalance { .. } => {
            json_error(StatusCode::BAD_REQUEST, "insufficient_balance", err.to_string())
        }
        PurchaseError::Transaction(e) => {
            tracing::error!(error = %e, "purchase transaction failed");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "transaction_failed",
                "transaction failed",
            )
        }
    }
}

pub fn transfer_error_to_response(err: TransferError) -> axum::response::Response {
    match err {
        TransferError::InvalidAmount => {
            json_error(StatusCode::BAD_REQUEST, "invalid_amount", err.to_string())
        }
        TransferError::SelfTransfer => {
            json_error(StatusCode::BAD_REQUEST, "self_transfer", err.to_string())
        }
        TransferError::SenderNotFound => {
            json_error(StatusCode::BAD_REQUEST, "sender_not_found", err.to_string())
        }
        TransferError::ReceiverNotFound => {
            json_error(StatusCode::BAD_REQUEST, "receiver_not_found", err.to_string())
        }
        TransferError::InsufficientBalance { .. } => {
            json_error(StatusCode::BAD_REQUEST, "insufficient_balance", err.to_string())
        }
        TransferError::Transaction(e) => {
            tracing::error!(error = %e, "transfer transaction failed");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "transaction_failed",
                "transaction failed",
            )
        }
    }
}

pub fn aggregation_error_to_response(err: AggregationError) -> axum::response::Response {
    match err {
        AggregationError::AccountNotFound => {
            json_error(StatusCode::NOT_FOUND, "not_found", "account not found")
        }
        AggregationError::Read(e) => {
            tracing::error!(error = %e, "profile aggregation failed");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "aggregation_failed",
                "failed to fetch data",
            )
        }
    }
}
