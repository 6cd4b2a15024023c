//! HubLink API server
//!
//! Wires the HubSpot integration router to an in-process TTL store and
//! serves it. Listen address comes from `HUBLINK_LISTEN_ADDR`
//! (default `127.0.0.1:8000`).

use std::sync::Arc;

use hublink_common::cache::MokaKvStore;
use hublink_infra::integrations::hubspot::{hubspot_router, HubSpotOAuth};
use hublink_infra::HubSpotSettings;
use tracing::info;

const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8000";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let settings = HubSpotSettings::from_env()?;
    let store = Arc::new(MokaKvStore::default());
    let flow = Arc::new(HubSpotOAuth::new(settings, store)?);

    let app = hubspot_router(flow);

    let addr = std::env::var("HUBLINK_LISTEN_ADDR")
        .unwrap_or_else(|_| DEFAULT_LISTEN_ADDR.to_owned());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "hublink-api listening");

    axum::serve(listener, app).await?;
    Ok(())
}
