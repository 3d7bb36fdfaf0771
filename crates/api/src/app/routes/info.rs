use std::sync::Arc;

use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};

use crate::app::{dto, errors, services::AppServices};
use crate::context::AccountContext;

pub async fn get_info(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AccountContext>,
) -> axum::response::Response {
    match services.aggregator.profile(ctx.account_id()).await {
        Ok(profile) => (StatusCode::OK, Json(dto::profile_to_response(profile))).into_response(),
        Err(e) => errors::aggregation_error_to_response(e),
    }
}
