//! PKCE (Proof Key for Code Exchange) primitives for OAuth 2.0
//!
//! Implements RFC 7636 for binding authorization codes to a client-held
//! secret. Only the SHA-256 derived challenge ever travels in the
//! authorization URL; the verifier stays server-side until token exchange.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::Rng;
use sha2::{Digest, Sha256};

/// Generate a cryptographically secure code verifier.
///
/// Returns a URL-safe base64-encoded random string of 32 bytes (43
/// characters). Per RFC 7636, verifiers must be 43-128 characters long.
#[must_use]
pub fn generate_code_verifier() -> String {
    random_token()
}

/// Generate a random state token for CSRF protection.
///
/// Same shape as the code verifier: 32 random bytes, base64url without
/// padding.
#[must_use]
pub fn generate_state() -> String {
    random_token()
}

/// Derive the S256 code challenge from a verifier.
///
/// Per RFC 7636, the challenge is `BASE64URL(SHA256(ASCII(verifier)))` with
/// trailing `=` padding stripped.
#[must_use]
pub fn code_challenge(verifier: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}

fn random_token() -> String {
    let mut rng = rand::thread_rng();
    let random_bytes: Vec<u8> = (0..32).map(|_| rng.gen()).collect();
    URL_SAFE_NO_PAD.encode(random_bytes)
}
