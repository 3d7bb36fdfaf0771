use std::sync::Arc;

use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};

use crate::app::{dto, errors, services::AppServices};
use crate::context::AccountContext;

pub async fn send_coin(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AccountContext>,
    Json(body): Json<dto::SendCoinRequest>,
) -> axum::response::Response {
    if body.amount <= 0 {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_amount",
            "amount must be positive",
        );
    }

    let receiver = match services.store.resolve_account_by_name(&body.to_user).await {
        Ok(Some(account)) => account,
        Ok(None) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "receiver_not_found",
                "receiver not found",
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "receiver lookup failed");
            return errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "store_error",
                "failed to fetch receiver",
            );
        }
    };

    match services
        .coordinator
        .transfer(ctx.account_id(), receiver.id, body.amount)
        .await
    {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e) => errors::transfer_error_to_response(e),
    }
}
