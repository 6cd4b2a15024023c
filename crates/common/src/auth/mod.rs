//! OAuth 2.0 PKCE infrastructure
//!
//! Building blocks for PKCE-protected authorization flows (RFC 7636):
//! cryptographically random verifiers and state tokens, and the S256
//! challenge derivation. Flow orchestration lives with the integrations
//! that use it; this module only provides the primitives.

pub mod pkce;

pub use pkce::{code_challenge, generate_code_verifier, generate_state};
