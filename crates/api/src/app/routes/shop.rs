use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
};

use crate::app::{errors, services::AppServices};
use crate::context::AccountContext;

pub async fn buy_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AccountContext>,
    Path(item): Path<String>,
) -> axum::response::Response {
    match services.coordinator.purchase(ctx.account_id(), &item).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e) => errors::purchase_error_to_response(e),
    }
}
