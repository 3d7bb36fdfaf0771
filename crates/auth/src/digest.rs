use sha2::{Digest, Sha256};

/// Digest a credential secret for storage.
///
/// The store only ever sees this opaque hex digest; the plaintext secret
/// never leaves the login path.
pub fn digest_secret(secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Compare a presented secret against a stored digest.
pub fn verify_secret(secret: &str, stored_digest: &str) -> bool {
    digest_secret(secret) == stored_digest
}
