//! Configuration loader
//!
//! Loads HubSpot app configuration from environment variables. The settings
//! object is constructed once at process start and injected into every
//! operation; nothing reads configuration from module scope.
//!
//! ## Environment Variables
//! - `HUBLINK_HUBSPOT_CLIENT_ID`: OAuth app client id (required)
//! - `HUBLINK_HUBSPOT_CLIENT_SECRET`: OAuth app client secret (required)
//! - `HUBLINK_HUBSPOT_REDIRECT_URI`: registered callback URL (required)
//! - `HUBLINK_HUBSPOT_AUTHORIZATION_URL`: override for the authorize endpoint
//! - `HUBLINK_HUBSPOT_TOKEN_URL`: override for the token endpoint
//! - `HUBLINK_HUBSPOT_API_BASE_URL`: override for the CRM API base
//! - `HUBLINK_HUBSPOT_SCOPES`: space-separated scope override
//!
//! A `.env` file in the working directory is honored (best effort) before
//! the environment is read.

use hublink_domain::{IntegrationError, Result};

const DEFAULT_AUTHORIZATION_URL: &str = "https://app.hubspot.com/oauth/authorize";
const DEFAULT_TOKEN_URL: &str = "https://api.hubapi.com/oauth/v1/token";
const DEFAULT_API_BASE_URL: &str = "https://api.hubapi.com";
const DEFAULT_SCOPES: [&str; 3] = [
    "crm.objects.contacts.read",
    "crm.objects.companies.read",
    "crm.objects.deals.read",
];

/// Configuration for the HubSpot OAuth app and CRM API.
#[derive(Debug, Clone)]
pub struct HubSpotSettings {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub authorization_url: String,
    pub token_url: String,
    /// Base URL for CRM object endpoints; overridable so tests can point at
    /// a mock server.
    pub api_base_url: String,
    pub scopes: Vec<String>,
}

impl HubSpotSettings {
    /// Load settings from the environment.
    ///
    /// # Errors
    /// Returns `IntegrationError::Config` if a required variable is missing.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            client_id: required_var("HUBLINK_HUBSPOT_CLIENT_ID")?,
            client_secret: required_var("HUBLINK_HUBSPOT_CLIENT_SECRET")?,
            redirect_uri: required_var("HUBLINK_HUBSPOT_REDIRECT_URI")?,
            authorization_url: optional_var(
                "HUBLINK_HUBSPOT_AUTHORIZATION_URL",
                DEFAULT_AUTHORIZATION_URL,
            ),
            token_url: optional_var("HUBLINK_HUBSPOT_TOKEN_URL", DEFAULT_TOKEN_URL),
            api_base_url: optional_var("HUBLINK_HUBSPOT_API_BASE_URL", DEFAULT_API_BASE_URL),
            scopes: std::env::var("HUBLINK_HUBSPOT_SCOPES")
                .map(|raw| raw.split_whitespace().map(str::to_owned).collect())
                .unwrap_or_else(|_| DEFAULT_SCOPES.iter().map(|s| (*s).to_owned()).collect()),
        })
    }

    /// Space-separated scope list as it appears in the authorization URL.
    #[must_use]
    pub fn scope_string(&self) -> String {
        self.scopes.join(" ")
    }
}

fn required_var(name: &str) -> Result<String> {
    std::env::var(name)
        .map_err(|_| IntegrationError::Config(format!("missing environment variable {name}")))
}

fn optional_var(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_owned())
}
