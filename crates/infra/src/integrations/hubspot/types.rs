//! Wire types for the HubSpot integration.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::DateTime;
use hublink_domain::{IntegrationError, IntegrationItem, Result};
use serde::{Deserialize, Serialize};

/// Transient CSRF-protection token plus flow context.
///
/// Travels to the provider and back as base64url(JSON) in the `state` query
/// parameter; a mirrored copy is persisted server-side for the duration of
/// one authorization attempt. The two must match exactly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowState {
    pub state: String,
    pub user_id: String,
    pub org_id: String,
}

impl FlowState {
    /// Encode for safe inclusion as a URL query parameter.
    ///
    /// # Errors
    /// Returns `IntegrationError::StateDecode` if JSON serialization fails.
    pub fn encode(&self) -> Result<String> {
        let json = serde_json::to_vec(self)
            .map_err(|err| IntegrationError::StateDecode(err.to_string()))?;
        Ok(URL_SAFE_NO_PAD.encode(json))
    }

    /// Decode the `state` parameter returned by the provider.
    ///
    /// # Errors
    /// Returns `IntegrationError::StateDecode` if the value is not
    /// base64url-encoded JSON of the expected shape.
    pub fn decode(raw: &str) -> Result<Self> {
        let bytes = URL_SAFE_NO_PAD
            .decode(raw.trim_end_matches('='))
            .map_err(|err| IntegrationError::StateDecode(err.to_string()))?;
        serde_json::from_slice(&bytes)
            .map_err(|err| IntegrationError::StateDecode(err.to_string()))
    }
}

/// Query parameters delivered to the OAuth callback endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// HubSpot token response, treated as an opaque bearer secret.
///
/// `access_token` is the only field the fetcher needs; everything else the
/// provider returns is carried along untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubSpotCredentials {
    pub access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl HubSpotCredentials {
    /// Parse a serialized credential (the one decode step allowed by the
    /// fetcher contract).
    ///
    /// # Errors
    /// Returns `IntegrationError::InvalidInput` for malformed JSON.
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw)
            .map_err(|err| IntegrationError::InvalidInput(format!("invalid credentials: {err}")))
    }

    /// Access token, or `MissingAccessToken` if absent or empty.
    pub fn require_access_token(&self) -> Result<&str> {
        match self.access_token.as_deref() {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(IntegrationError::MissingAccessToken),
        }
    }
}

/// The three CRM object collections the fetcher walks, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Contacts,
    Companies,
    Deals,
}

impl ResourceKind {
    pub const ALL: [Self; 3] = [Self::Contacts, Self::Companies, Self::Deals];

    /// Path segment under `/crm/v3/objects/`.
    #[must_use]
    pub fn object_path(self) -> &'static str {
        match self {
            Self::Contacts => "contacts",
            Self::Companies => "companies",
            Self::Deals => "deals",
        }
    }

    /// Type tag suffixed onto normalized item ids.
    #[must_use]
    pub fn item_type(self) -> &'static str {
        match self {
            Self::Contacts => "Contact",
            Self::Companies => "Company",
            Self::Deals => "Deal",
        }
    }
}

/// One page of CRM objects as returned by the v3 list endpoints.
#[derive(Debug, Deserialize)]
pub struct RecordPage {
    #[serde(default)]
    pub results: Vec<HubSpotRecord>,
}

/// Subset of record properties the normalizer cares about.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordProperties {
    pub name: Option<String>,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
}

/// One remote CRM record. Timestamps arrive as epoch milliseconds.
#[derive(Debug, Clone, Deserialize)]
pub struct HubSpotRecord {
    pub id: String,
    #[serde(default)]
    pub properties: RecordProperties,
    #[serde(rename = "createdAt")]
    pub created_at: Option<i64>,
    #[serde(rename = "updatedAt")]
    pub updated_at: Option<i64>,
}

impl HubSpotRecord {
    /// Normalize into the shared item shape.
    ///
    /// `name` uses the primary property when present, falls back to joining
    /// `firstname`/`lastname`, and otherwise stays empty. Timestamps missing
    /// from the record stay unset.
    #[must_use]
    pub fn into_item(self, kind: ResourceKind) -> IntegrationItem {
        IntegrationItem {
            id: format!("{}_{}", self.id, kind.item_type()),
            name: self.properties.display_name(),
            item_type: kind.item_type().to_owned(),
            parent_id: None,
            parent_path_or_name: None,
            creation_time: self.created_at.and_then(DateTime::from_timestamp_millis),
            last_modified_time: self.updated_at.and_then(DateTime::from_timestamp_millis),
        }
    }
}

impl RecordProperties {
    fn display_name(&self) -> String {
        if let Some(name) = self.name.as_deref() {
            if !name.is_empty() {
                return name.to_owned();
            }
        }
        let joined = format!(
            "{} {}",
            self.firstname.as_deref().unwrap_or(""),
            self.lastname.as_deref().unwrap_or("")
        );
        joined.trim().to_owned()
    }
}
