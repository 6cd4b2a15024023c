//! HTTP surface for the HubSpot integration.
//!
//! Thin axum layer over [`HubSpotOAuth`]; routing and request parsing live
//! here, protocol logic does not. Errors render as `{"detail": ...}` with
//! the status code from the error taxonomy.

use std::sync::Arc;

use axum::extract::{Form, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use hublink_domain::{IntegrationError, IntegrationItem};
use serde::Deserialize;

use super::oauth::HubSpotOAuth;
use super::types::{CallbackParams, HubSpotCredentials};

/// Router exposing the four HubSpot flow operations.
pub fn hubspot_router(flow: Arc<HubSpotOAuth>) -> Router {
    Router::new()
        .route("/integrations/hubspot/authorize", post(authorize))
        .route("/integrations/hubspot/oauth2callback", get(oauth2_callback))
        .route("/integrations/hubspot/credentials", post(credentials))
        .route("/integrations/hubspot/load", post(load_items))
        .with_state(flow)
}

#[derive(Debug, Deserialize)]
struct FlowRequest {
    user_id: String,
    org_id: String,
}

#[derive(Debug, Deserialize)]
struct LoadRequest {
    /// Serialized credential as handed out by the credentials endpoint.
    credentials: String,
}

struct ApiError(IntegrationError);

impl From<IntegrationError> for ApiError {
    fn from(err: IntegrationError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = Json(serde_json::json!({ "detail": self.0.to_string() }));
        (status, body).into_response()
    }
}

async fn authorize(
    State(flow): State<Arc<HubSpotOAuth>>,
    Form(req): Form<FlowRequest>,
) -> Result<Json<String>, ApiError> {
    Ok(Json(flow.authorize(&req.user_id, &req.org_id).await?))
}

async fn oauth2_callback(
    State(flow): State<Arc<HubSpotOAuth>>,
    Query(params): Query<CallbackParams>,
) -> Result<Html<&'static str>, ApiError> {
    Ok(Html(flow.handle_callback(&params).await?))
}

async fn credentials(
    State(flow): State<Arc<HubSpotOAuth>>,
    Form(req): Form<FlowRequest>,
) -> Result<Json<HubSpotCredentials>, ApiError> {
    Ok(Json(flow.get_credentials(&req.user_id, &req.org_id).await?))
}

async fn load_items(
    State(flow): State<Arc<HubSpotOAuth>>,
    Form(req): Form<LoadRequest>,
) -> Result<Json<Vec<IntegrationItem>>, ApiError> {
    Ok(Json(flow.fetch_items_from_json(&req.credentials).await?))
}
