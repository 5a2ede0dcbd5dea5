mod config;
mod errors;
mod llm_client;
mod routes;
mod state;
mod tagging;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::tagging::dictionary::{DictionaryStore, TagDictionary};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting study tags API v{}", env!("CARGO_PKG_VERSION"));

    // Load the tag dictionary; never serve with a partial one
    let dictionary = TagDictionary::load_dir(&config.dictionary_dir).with_context(|| {
        format!(
            "Failed to load tag dictionary from {}",
            config.dictionary_dir.display()
        )
    })?;
    let dictionaries = Arc::new(DictionaryStore::new(dictionary));

    // Initialize LLM client
    let llm = LlmClient::new(
        config.dashscope_api_key.clone(),
        &config.llm_base_url,
        config.llm_timeout,
    )
    .context("Failed to build LLM HTTP client")?;
    info!(
        "LLM client initialized (endpoint: {}, default model: {})",
        llm.base_url(),
        config.default_model
    );

    // Build app state
    let state = AppState {
        llm: Arc::new(llm),
        dictionaries,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
