//! Shared reqwest client construction.

use std::time::Duration;

use hublink_domain::{IntegrationError, Result};
use reqwest::Client;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Build the outbound HTTP client used for token exchange and CRM calls.
///
/// A single 30-second request timeout is the only policy applied here; the
/// flow itself never retries.
pub fn build_http_client() -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
        .build()
        .map_err(|err| IntegrationError::Config(format!("failed to build HTTP client: {err}")))
}
