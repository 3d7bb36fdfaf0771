//! `coinshop-auth` — authentication boundary (tokens + credential digests).
//!
//! This crate is intentionally decoupled from HTTP and storage.

pub mod claims;
pub mod digest;
pub mod token;

pub use claims::{Claims, TokenValidationError, validate_claims};
pub use digest::{digest_secret, verify_secret};
pub use token::{Hs256TokenCodec, TokenError, TokenVerifier, token_ttl};
