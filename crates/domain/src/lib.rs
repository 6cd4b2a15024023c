//! # HubLink Domain
//!
//! Business domain types and models for HubLink.
//!
//! This crate contains:
//! - The integration error taxonomy and Result definition
//! - The normalized `IntegrationItem` record shared by all integrations
//!
//! ## Architecture
//! - No dependencies on other HubLink crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod errors;
pub mod types;

// Re-export commonly used items
pub use errors::{IntegrationError, Result};
pub use types::IntegrationItem;
