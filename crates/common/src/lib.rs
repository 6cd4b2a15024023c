//! Modular common utilities shared across HubLink crates.
//!
//! - [`auth`]: OAuth 2.0 PKCE primitives (verifier, challenge, state tokens)
//! - [`cache`]: async key-value store abstraction with per-entry TTL

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod auth;
pub mod cache;

pub use cache::{KvStore, MemoryKvStore, MokaKvStore, StoreError};
