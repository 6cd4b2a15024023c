//! Async key-value store abstraction with per-entry TTL
//!
//! Transient OAuth flow state and one-shot credentials live in an external
//! store with `put`/`get`/`delete-with-expiry` semantics. The [`KvStore`]
//! trait captures that contract; [`MokaKvStore`] is the in-process
//! production implementation and [`MemoryKvStore`] a plain deterministic
//! one for tests.

pub mod store;

pub use store::{KvStore, MemoryKvStore, MokaKvStore, StoreError};
