//! Post-authorization item fetching.
//!
//! Walks the three CRM object collections with a bearer credential and maps
//! every record into the normalized item shape. A failing collection only
//! costs its own items: the error goes to the log and the fetch continues.

use hublink_domain::{IntegrationError, IntegrationItem, Result};
use reqwest::StatusCode;
use tracing::{debug, warn};

use super::oauth::HubSpotOAuth;
use super::types::{HubSpotCredentials, RecordPage, ResourceKind};

/// Page-size limit applied to every collection request.
const PAGE_LIMIT: &str = "100";

impl HubSpotOAuth {
    /// Fetch items from a serialized credential (one decode step).
    ///
    /// # Errors
    /// `InvalidInput` for malformed JSON, then everything
    /// [`fetch_items`](Self::fetch_items) can return.
    pub async fn fetch_items_from_json(&self, raw: &str) -> Result<Vec<IntegrationItem>> {
        let credentials = HubSpotCredentials::from_json(raw)?;
        self.fetch_items(&credentials).await
    }

    /// Fetch contacts, companies and deals and normalize them.
    ///
    /// Output order is all contacts, then all companies, then all deals,
    /// each in remote response order. Per-collection failures are logged
    /// and contribute zero items; partial results are expected.
    ///
    /// # Errors
    /// `MissingAccessToken` if the credential has no usable access token;
    /// in that case no network call is issued.
    pub async fn fetch_items(
        &self,
        credentials: &HubSpotCredentials,
    ) -> Result<Vec<IntegrationItem>> {
        let token = credentials.require_access_token()?;

        let mut items = Vec::new();
        for kind in ResourceKind::ALL {
            match self.fetch_kind(kind, token).await {
                Ok(batch) => items.extend(batch),
                Err(err) => {
                    warn!(kind = kind.object_path(), error = %err, "skipping collection after fetch failure");
                }
            }
        }

        debug!(count = items.len(), "fetched HubSpot integration items");
        Ok(items)
    }

    async fn fetch_kind(
        &self,
        kind: ResourceKind,
        token: &str,
    ) -> Result<Vec<IntegrationItem>> {
        let url = format!(
            "{}/crm/v3/objects/{}",
            self.settings().api_base_url,
            kind.object_path()
        );

        let response = self
            .http()
            .get(&url)
            .bearer_auth(token)
            .query(&[("limit", PAGE_LIMIT)])
            .send()
            .await
            .map_err(|err| IntegrationError::Network(err.to_string()))?;

        if response.status() != StatusCode::OK {
            return Err(IntegrationError::Network(format!(
                "{} endpoint returned status {}",
                kind.object_path(),
                response.status()
            )));
        }

        let page: RecordPage = response
            .json()
            .await
            .map_err(|err| IntegrationError::Network(err.to_string()))?;

        Ok(page.results.into_iter().map(|record| record.into_item(kind)).collect())
    }
}
