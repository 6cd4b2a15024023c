//! HubSpot CRM integration
//!
//! Three-legged OAuth2/PKCE authorization against HubSpot, transient flow
//! state in the key-value store, one-shot credential retrieval, and a
//! post-authorization fetch that normalizes contacts, companies and deals
//! into [`hublink_domain::IntegrationItem`]s.
//!
//! Flow: [`HubSpotOAuth::authorize`] → user authenticates at HubSpot →
//! [`HubSpotOAuth::handle_callback`] → [`HubSpotOAuth::get_credentials`] →
//! [`HubSpotOAuth::fetch_items`].

pub mod items;
pub mod oauth;
pub mod routes;
pub mod types;

pub use oauth::HubSpotOAuth;
pub use routes::hubspot_router;
pub use types::{CallbackParams, FlowState, HubSpotCredentials, ResourceKind};
