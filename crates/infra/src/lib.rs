//! # HubLink Infrastructure
//!
//! Infrastructure implementations for HubLink.
//!
//! This crate contains:
//! - HTTP client construction
//! - Configuration loading
//! - External service integrations (HubSpot)
//!
//! ## Architecture
//! - Depends on `hublink-common` and `hublink-domain`
//! - Contains all "impure" code (I/O, network, environment)

pub mod config;
pub mod http;
pub mod integrations;

// Re-export commonly used items
pub use config::HubSpotSettings;
pub use integrations::hubspot::{hubspot_router, HubSpotOAuth};
