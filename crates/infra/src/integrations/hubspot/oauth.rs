//! OAuth2/PKCE authorization flow against HubSpot.
//!
//! Implements the three flow operations: building the authorization URL
//! (with transient state and PKCE verifier persisted to the key-value
//! store), handling the provider callback (CSRF state check, code-for-token
//! exchange, credential persistence), and one-shot credential retrieval.

use std::sync::Arc;
use std::time::Duration;

use hublink_common::auth::pkce;
use hublink_common::cache::{KvStore, StoreError};
use hublink_domain::{IntegrationError, Result};
use reqwest::{Client, StatusCode};
use tracing::{debug, info};
use url::Url;

use super::types::{CallbackParams, FlowState, HubSpotCredentials};
use crate::config::HubSpotSettings;
use crate::http::build_http_client;

/// Flow state and PKCE verifier live for 10 minutes.
const STATE_TTL: Duration = Duration::from_secs(600);
/// Stored credentials live for an hour and are consumed on first read.
const CREDENTIALS_TTL: Duration = Duration::from_secs(3600);

/// Page returned to the browser tab that hosted the flow. Its sole behavior
/// is closing the popup window.
const CLOSE_WINDOW_PAGE: &str = "<html>\n    <script>\n        window.close();\n    </script>\n</html>\n";

/// HubSpot OAuth flow orchestrator.
///
/// Holds the injected app settings, the shared key-value store, and the
/// outbound HTTP client. Stateless across flows: everything transient lives
/// in the store, keyed per `(org_id, user_id)`. Concurrent flows for the
/// same key race on last-write-wins store semantics.
pub struct HubSpotOAuth {
    settings: HubSpotSettings,
    store: Arc<dyn KvStore>,
    http: Client,
}

impl HubSpotOAuth {
    /// Create a flow orchestrator from settings and a store.
    ///
    /// # Errors
    /// Returns `IntegrationError::Config` if the HTTP client cannot be built.
    pub fn new(settings: HubSpotSettings, store: Arc<dyn KvStore>) -> Result<Self> {
        let http = build_http_client()?;
        Ok(Self { settings, store, http })
    }

    /// Settings this flow was constructed with.
    #[must_use]
    pub fn settings(&self) -> &HubSpotSettings {
        &self.settings
    }

    /// Build the provider authorization URL and persist transient flow state.
    ///
    /// Generates a random CSRF state token and a PKCE verifier, stores both
    /// (with a 10-minute expiry) under keys scoped by `(org_id, user_id)`,
    /// and returns the URL the user's browser should be sent to.
    ///
    /// # Errors
    /// Propagates store failures; nothing else can fail.
    pub async fn authorize(&self, user_id: &str, org_id: &str) -> Result<String> {
        let flow = FlowState {
            state: pkce::generate_state(),
            user_id: user_id.to_owned(),
            org_id: org_id.to_owned(),
        };
        let encoded_state = flow.encode()?;
        let flow_json = serde_json::to_string(&flow)
            .map_err(|err| IntegrationError::Store(err.to_string()))?;

        let verifier = pkce::generate_code_verifier();
        let challenge = pkce::code_challenge(&verifier);

        let state_key = self.state_key(org_id, user_id);
        let verifier_key = self.verifier_key(org_id, user_id);
        tokio::try_join!(
            self.store.put(&state_key, flow_json, STATE_TTL),
            self.store.put(&verifier_key, verifier, STATE_TTL),
        )
        .map_err(store_err)?;

        let mut url = Url::parse(&self.settings.authorization_url)
            .map_err(|err| IntegrationError::Config(format!("invalid authorization URL: {err}")))?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.settings.client_id)
            .append_pair("redirect_uri", &self.settings.redirect_uri)
            .append_pair("scope", &self.settings.scope_string())
            .append_pair("state", &encoded_state)
            .append_pair("code_challenge", &challenge)
            .append_pair("code_challenge_method", "S256");

        debug!(user_id, org_id, "built HubSpot authorization URL");
        Ok(url.into())
    }

    /// Handle the OAuth callback from HubSpot.
    ///
    /// Validates the returned state against the stored copy, exchanges the
    /// authorization code for tokens (form-encoded POST with the PKCE
    /// verifier), cleans up the transient entries, and persists the raw
    /// token response for one-shot retrieval. Returns the HTML page that
    /// closes the popup window.
    ///
    /// # Errors
    /// `AuthorizationDenied`, `MalformedCallback`, `StateDecode`,
    /// `StateMismatch` or `TokenExchangeFailed` per the callback contract,
    /// plus store/network carriers.
    pub async fn handle_callback(&self, params: &CallbackParams) -> Result<&'static str> {
        if let Some(error) = &params.error {
            let detail = params.error_description.clone().unwrap_or_else(|| error.clone());
            return Err(IntegrationError::AuthorizationDenied(detail));
        }

        let (code, encoded_state) = match (&params.code, &params.state) {
            (Some(code), Some(state)) => (code.as_str(), state.as_str()),
            _ => return Err(IntegrationError::MalformedCallback),
        };

        let flow = FlowState::decode(encoded_state)?;
        let state_key = self.state_key(&flow.org_id, &flow.user_id);
        let verifier_key = self.verifier_key(&flow.org_id, &flow.user_id);

        let (saved_state, verifier) =
            tokio::try_join!(self.store.get(&state_key), self.store.get(&verifier_key))
                .map_err(store_err)?;

        // CSRF defense: the stored copy must exist and its token must equal
        // the one echoed back by the provider. Reject rather than guess.
        let state_matches = saved_state
            .as_deref()
            .and_then(|raw| serde_json::from_str::<FlowState>(raw).ok())
            .is_some_and(|saved| saved.state == flow.state);
        if !state_matches {
            return Err(IntegrationError::StateMismatch);
        }
        let verifier = verifier.ok_or(IntegrationError::StateMismatch)?;

        let body = self.exchange_code(code, &verifier).await?;

        // Cleanup happens regardless of what callers do next.
        tokio::try_join!(self.store.delete(&state_key), self.store.delete(&verifier_key))
            .map_err(store_err)?;

        self.store
            .put(&self.credentials_key(&flow.org_id, &flow.user_id), body, CREDENTIALS_TTL)
            .await
            .map_err(store_err)?;

        info!(user_id = %flow.user_id, org_id = %flow.org_id, "HubSpot authorization complete");
        Ok(CLOSE_WINDOW_PAGE)
    }

    /// Retrieve and invalidate the stored credential (one-time use).
    ///
    /// # Errors
    /// `NoCredential` if nothing is stored (or it already expired).
    pub async fn get_credentials(
        &self,
        user_id: &str,
        org_id: &str,
    ) -> Result<HubSpotCredentials> {
        let key = self.credentials_key(org_id, user_id);
        let raw = self
            .store
            .get(&key)
            .await
            .map_err(store_err)?
            .ok_or(IntegrationError::NoCredential)?;
        self.store.delete(&key).await.map_err(store_err)?;

        debug!(user_id, org_id, "HubSpot credentials handed off");
        HubSpotCredentials::from_json(&raw)
    }

    async fn exchange_code(&self, code: &str, verifier: &str) -> Result<String> {
        let form = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.settings.redirect_uri.as_str()),
            ("client_id", self.settings.client_id.as_str()),
            ("client_secret", self.settings.client_secret.as_str()),
            ("code_verifier", verifier),
        ];

        let response = self
            .http
            .post(&self.settings.token_url)
            .form(&form)
            .send()
            .await
            .map_err(|err| IntegrationError::Network(err.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| IntegrationError::Network(err.to_string()))?;

        if status != StatusCode::OK {
            return Err(IntegrationError::TokenExchangeFailed(body));
        }
        Ok(body)
    }

    pub(super) fn http(&self) -> &Client {
        &self.http
    }

    fn state_key(&self, org_id: &str, user_id: &str) -> String {
        format!("hubspot:state:{org_id}:{user_id}")
    }

    fn verifier_key(&self, org_id: &str, user_id: &str) -> String {
        format!("hubspot:verifier:{org_id}:{user_id}")
    }

    fn credentials_key(&self, org_id: &str, user_id: &str) -> String {
        format!("hubspot:credentials:{org_id}:{user_id}")
    }
}

fn store_err(err: StoreError) -> IntegrationError {
    IntegrationError::Store(err.to_string())
}

#[cfg(test)]
mod tests {
    //! Unit tests for hubspot::oauth.
    use std::collections::HashMap;

    use hublink_common::cache::MemoryKvStore;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn test_settings(token_url: &str) -> HubSpotSettings {
        HubSpotSettings {
            client_id: "test-client".into(),
            client_secret: "test-secret".into(),
            redirect_uri: "http://localhost:8000/integrations/hubspot/oauth2callback".into(),
            authorization_url: "https://app.hubspot.com/oauth/authorize".into(),
            token_url: token_url.into(),
            api_base_url: "https://api.hubapi.com".into(),
            scopes: vec!["crm.objects.contacts.read".into()],
        }
    }

    fn flow_with_store(token_url: &str) -> (HubSpotOAuth, Arc<MemoryKvStore>) {
        let store = Arc::new(MemoryKvStore::new());
        let flow = HubSpotOAuth::new(test_settings(token_url), store.clone()).expect("flow");
        (flow, store)
    }

    fn query_params(url: &str) -> HashMap<String, String> {
        Url::parse(url)
            .expect("parse url")
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    #[tokio::test]
    async fn authorize_builds_url_and_persists_flow_state() {
        let (flow, store) = flow_with_store("https://api.hubapi.com/oauth/v1/token");

        let url = flow.authorize("user-1", "org-1").await.expect("authorize");
        let params = query_params(&url);

        assert_eq!(params["client_id"], "test-client");
        assert_eq!(params["code_challenge_method"], "S256");
        assert_eq!(params["scope"], "crm.objects.contacts.read");

        // The state parameter round-trips the caller's identifiers.
        let decoded = FlowState::decode(&params["state"]).expect("decode state");
        assert_eq!(decoded.user_id, "user-1");
        assert_eq!(decoded.org_id, "org-1");

        // The challenge in the URL is S256 of the verifier stored under the
        // matching key.
        let verifier = store
            .get("hubspot:verifier:org-1:user-1")
            .await
            .expect("get verifier")
            .expect("verifier stored");
        assert_eq!(params["code_challenge"], pkce::code_challenge(&verifier));

        let saved = store
            .get("hubspot:state:org-1:user-1")
            .await
            .expect("get state")
            .expect("state stored");
        let saved: FlowState = serde_json::from_str(&saved).expect("stored state json");
        assert_eq!(saved.state, decoded.state);

        // Both transient entries carry the 10-minute expiry.
        assert_eq!(store.ttl_of("hubspot:state:org-1:user-1").await, Some(STATE_TTL));
        assert_eq!(store.ttl_of("hubspot:verifier:org-1:user-1").await, Some(STATE_TTL));
    }

    #[tokio::test]
    async fn callback_with_provider_error_is_denied() {
        let (flow, _) = flow_with_store("https://api.hubapi.com/oauth/v1/token");

        let params = CallbackParams {
            error: Some("access_denied".into()),
            error_description: Some("User did not authorize".into()),
            ..CallbackParams::default()
        };

        let err = flow.handle_callback(&params).await.expect_err("must fail");
        assert!(matches!(err, IntegrationError::AuthorizationDenied(detail) if detail == "User did not authorize"));
    }

    #[tokio::test]
    async fn callback_without_code_fails_before_store_access() {
        let (flow, _) = flow_with_store("https://api.hubapi.com/oauth/v1/token");

        let params = CallbackParams {
            state: Some("whatever".into()),
            ..CallbackParams::default()
        };

        let err = flow.handle_callback(&params).await.expect_err("must fail");
        assert!(matches!(err, IntegrationError::MalformedCallback));
    }

    #[tokio::test]
    async fn callback_with_undecodable_state_fails() {
        let (flow, _) = flow_with_store("https://api.hubapi.com/oauth/v1/token");

        let params = CallbackParams {
            code: Some("auth-code".into()),
            state: Some("%%% not base64 %%%".into()),
            ..CallbackParams::default()
        };

        let err = flow.handle_callback(&params).await.expect_err("must fail");
        assert!(matches!(err, IntegrationError::StateDecode(_)));
    }

    #[tokio::test]
    async fn mismatched_state_is_rejected_without_token_exchange() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/v1/token"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let (flow, _) = flow_with_store(&format!("{}/oauth/v1/token", server.uri()));
        flow.authorize("user-1", "org-1").await.expect("authorize");

        // Forge a state blob with the right identifiers but a wrong token.
        let forged = FlowState {
            state: "attacker-controlled".into(),
            user_id: "user-1".into(),
            org_id: "org-1".into(),
        };
        let params = CallbackParams {
            code: Some("auth-code".into()),
            state: Some(forged.encode().expect("encode")),
            ..CallbackParams::default()
        };

        let err = flow.handle_callback(&params).await.expect_err("must fail");
        assert!(matches!(err, IntegrationError::StateMismatch));
    }

    #[tokio::test]
    async fn callback_with_no_persisted_state_is_a_mismatch() {
        let (flow, _) = flow_with_store("https://api.hubapi.com/oauth/v1/token");

        let orphan = FlowState {
            state: "never-stored".into(),
            user_id: "user-9".into(),
            org_id: "org-9".into(),
        };
        let params = CallbackParams {
            code: Some("auth-code".into()),
            state: Some(orphan.encode().expect("encode")),
            ..CallbackParams::default()
        };

        let err = flow.handle_callback(&params).await.expect_err("must fail");
        assert!(matches!(err, IntegrationError::StateMismatch));
    }

    #[tokio::test]
    async fn successful_callback_stores_credentials_and_cleans_up() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/v1/token"))
            .and(body_string_contains("grant_type=authorization_code"))
            .and(body_string_contains("code=auth-code"))
            .and(body_string_contains("client_id=test-client"))
            .and(body_string_contains("code_verifier="))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"access_token":"tok","refresh_token":"ref","expires_in":1800}"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let (flow, store) = flow_with_store(&format!("{}/oauth/v1/token", server.uri()));
        let url = flow.authorize("user-1", "org-1").await.expect("authorize");
        let state = query_params(&url).remove("state").expect("state param");

        let params = CallbackParams {
            code: Some("auth-code".into()),
            state: Some(state),
            ..CallbackParams::default()
        };
        let page = flow.handle_callback(&params).await.expect("callback");
        assert!(page.contains("window.close()"));

        // Transient entries are gone, the credential is present.
        assert_eq!(store.get("hubspot:state:org-1:user-1").await.expect("get"), None);
        assert_eq!(store.get("hubspot:verifier:org-1:user-1").await.expect("get"), None);
        let raw = store
            .get("hubspot:credentials:org-1:user-1")
            .await
            .expect("get")
            .expect("credential stored");
        assert!(raw.contains("\"access_token\":\"tok\""));

        // The credential is written with the one-hour expiry.
        assert_eq!(
            store.ttl_of("hubspot:credentials:org-1:user-1").await,
            Some(CREDENTIALS_TTL)
        );
    }

    #[tokio::test]
    async fn failed_exchange_carries_provider_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/v1/token"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_string(r#"{"status":"error","message":"bad code"}"#),
            )
            .mount(&server)
            .await;

        let (flow, _) = flow_with_store(&format!("{}/oauth/v1/token", server.uri()));
        let url = flow.authorize("user-1", "org-1").await.expect("authorize");
        let state = query_params(&url).remove("state").expect("state param");

        let params = CallbackParams {
            code: Some("auth-code".into()),
            state: Some(state),
            ..CallbackParams::default()
        };

        let err = flow.handle_callback(&params).await.expect_err("must fail");
        assert!(matches!(err, IntegrationError::TokenExchangeFailed(body) if body.contains("bad code")));
    }

    /// Store double whose every operation fails, for exercising the
    /// store-failure error channel.
    struct FailingKvStore;

    #[async_trait::async_trait]
    impl KvStore for FailingKvStore {
        async fn put(
            &self,
            _: &str,
            _: String,
            _: Duration,
        ) -> std::result::Result<(), StoreError> {
            Err(StoreError::Unavailable("cache offline".into()))
        }

        async fn get(&self, _: &str) -> std::result::Result<Option<String>, StoreError> {
            Err(StoreError::Unavailable("cache offline".into()))
        }

        async fn delete(&self, _: &str) -> std::result::Result<(), StoreError> {
            Err(StoreError::Unavailable("cache offline".into()))
        }
    }

    #[tokio::test]
    async fn authorize_propagates_store_failures() {
        let settings = test_settings("https://api.hubapi.com/oauth/v1/token");
        let flow = HubSpotOAuth::new(settings, Arc::new(FailingKvStore)).expect("flow");

        let err = flow.authorize("user-1", "org-1").await.expect_err("must fail");
        assert!(matches!(err, IntegrationError::Store(detail) if detail.contains("cache offline")));
    }

    #[tokio::test]
    async fn callback_propagates_store_failures_on_state_lookup() {
        let settings = test_settings("https://api.hubapi.com/oauth/v1/token");
        let flow = HubSpotOAuth::new(settings, Arc::new(FailingKvStore)).expect("flow");

        let state = FlowState {
            state: "token".into(),
            user_id: "user-1".into(),
            org_id: "org-1".into(),
        };
        let params = CallbackParams {
            code: Some("auth-code".into()),
            state: Some(state.encode().expect("encode")),
            ..CallbackParams::default()
        };

        let err = flow.handle_callback(&params).await.expect_err("must fail");
        assert!(matches!(err, IntegrationError::Store(_)));
    }

    #[tokio::test]
    async fn credentials_are_one_time_use() {
        let (flow, store) = flow_with_store("https://api.hubapi.com/oauth/v1/token");
        store
            .put(
                "hubspot:credentials:org-1:user-1",
                r#"{"access_token":"tok"}"#.into(),
                Duration::from_secs(3600),
            )
            .await
            .expect("seed credential");

        let first = flow.get_credentials("user-1", "org-1").await.expect("first read");
        assert_eq!(first.require_access_token().expect("token"), "tok");

        let second = flow.get_credentials("user-1", "org-1").await.expect_err("second read");
        assert!(matches!(second, IntegrationError::NoCredential));
    }
}
