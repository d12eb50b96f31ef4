mod config;
mod convert;
mod db;
mod document;
mod documents;
mod errors;
mod extraction;
mod llm_client;
mod models;
mod persistence;
mod preview;
mod render;
mod routes;
mod schema;
mod session;
mod state;
mod validation;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::extraction::PdfResumeExtractor;
use crate::llm_client::LlmClient;
use crate::persistence::PgGateway;
use crate::routes::build_router;
use crate::session::SessionStore;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Configuration first: a missing required variable aborts startup.
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Vitae API v{}", env!("CARGO_PKG_VERSION"));

    let db = create_pool(&config.database_url, config.database_max_connections).await?;

    // Build the schema and renderer pool up front so a broken built-in fails
    // at startup rather than on the first request.
    let registry = render::default_registry();
    info!(
        "Renderer pool ready: {} renderers, schema with {} sections",
        registry.len(),
        schema::resume_schema()
            .as_object()
            .map_or(0, |o| o.properties.len())
    );

    let llm = LlmClient::new(config.anthropic_api_key.clone());
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let state = AppState {
        gateway: Arc::new(PgGateway::new(db)),
        extractor: Arc::new(PdfResumeExtractor::new(llm, config.max_upload_bytes)),
        sessions: SessionStore::new(config.session_idle_ttl),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the editor front-end has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
