use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use coinshop_core::AccountId;

use crate::claims::{Claims, TokenValidationError, validate_claims};

/// Token lifetime handed out at login.
pub fn token_ttl() -> Duration {
    Duration::hours(24)
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("malformed or badly signed token: {0}")]
    Verification(#[source] jsonwebtoken::errors::Error),

    #[error("token signing failed: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),

    #[error(transparent)]
    Claims(#[from] TokenValidationError),
}

/// Verification seam consumed by the HTTP middleware.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError>;
}

/// HS256 signer/verifier over a shared secret.
///
/// Claim-time checks are done deterministically by [`validate_claims`] rather
/// than by the JWT library's wall-clock validation, so the same code path is
/// exercised in tests with a pinned `now`.
pub struct Hs256TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl Hs256TokenCodec {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    pub fn issue(&self, account_id: AccountId, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = Claims::for_account(account_id, now, token_ttl());
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(TokenError::Signing)
    }
}

impl TokenVerifier for Hs256TokenCodec {
    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation)
            .map_err(TokenError::Verification)?;

        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_tokens_verify_and_carry_the_account() {
        let codec = Hs256TokenCodec::new(b"test-secret");
        let account_id = AccountId::new();
        let now = Utc::now();

        let token = codec.issue(account_id, now).unwrap();
        let claims = codec.verify(&token, now).unwrap();
        assert_eq!(claims.sub, account_id);
    }

    #[test]
    fn tokens_signed_with_another_secret_are_rejected() {
        let codec = Hs256TokenCodec::new(b"test-secret");
        let other = Hs256TokenCodec::new(b"other-secret");
        let now = Utc::now();

        let token = other.issue(AccountId::new(), now).unwrap();
        assert!(matches!(
            codec.verify(&token, now),
            Err(TokenError::Verification(_))
        ));
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let codec = Hs256TokenCodec::new(b"test-secret");
        let issued = Utc::now() - Duration::hours(48);

        let token = codec.issue(AccountId::new(), issued).unwrap();
        assert!(matches!(
            codec.verify(&token, Utc::now()),
            Err(TokenError::Claims(TokenValidationError::Expired))
        ));
    }
}
