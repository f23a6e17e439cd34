mod assessment;
mod config;
mod document;
mod errors;
mod llm_client;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::assessment::chunker::TextChunker;
use crate::assessment::pipeline::Assessor;
use crate::config::Config;
use crate::document::PdfReader;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting O-1A assessor v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    let llm = LlmClient::new(
        config.openai_api_key.clone(),
        config.openai_model.clone(),
        &config.openai_base_url,
    )?;
    info!("LLM client initialized (model: {})", llm.model());

    let chunker = TextChunker::new(config.chunk_window, config.chunk_stride)?;
    info!(
        "Chunking: window={} stride={} overlap={}",
        chunker.window(),
        chunker.stride(),
        chunker.overlap()
    );
    info!("Count source: {:?}", config.count_source);

    // Build app state
    let state = AppState {
        assessor: Arc::new(Assessor::new(Arc::new(llm), chunker, config.count_source)),
        reader: Arc::new(PdfReader),
    };

    // Build router
    let app = build_router(state, config.max_upload_bytes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
