use std::sync::Arc;

use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};
use chrono::Utc;

use coinshop_auth::{digest_secret, verify_secret};
use coinshop_store::StoreError;

use crate::app::{dto, errors, services::AppServices};

/// Login-or-register.
///
/// An unknown display name is registered on the spot with the starting
/// balance and gets a token; a known name must present the matching secret.
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::AuthRequest>,
) -> axum::response::Response {
    if body.username.trim().is_empty() || body.password.is_empty() {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation",
            "username and password are required",
        );
    }

    let credential = match services.store.credential_by_name(&body.username).await {
        Ok(credential) => credential,
        Err(e) => {
            tracing::error!(error = %e, "credential lookup failed");
            return errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "store_error",
                "failed to fetch account",
            );
        }
    };

    let account_id = match credential {
        Some(credential) => {
            if !verify_secret(&body.password, &credential.digest) {
                return errors::json_error(
                    StatusCode::UNAUTHORIZED,
                    "invalid_credentials",
                    "invalid password",
                );
            }
            credential.id
        }
        None => {
            let digest = digest_secret(&body.password);
            match services.store.create_account(&body.username, &digest).await {
                Ok(account) => account.id,
                Err(StoreError::Constraint { message, .. }) => {
                    return errors::json_error(StatusCode::BAD_REQUEST, "validation", message);
                }
                Err(e) => {
                    tracing::error!(error = %e, "account creation failed");
                    return errors::json_error(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "store_error",
                        "failed to create account",
                    );
                }
            }
        }
    };

    match services.tokens.issue(account_id, Utc::now()) {
        Ok(token) => (StatusCode::OK, Json(dto::AuthResponse { token })).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "token issuance failed");
            errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "token_error",
                "failed to issue token",
            )
        }
    }
}
