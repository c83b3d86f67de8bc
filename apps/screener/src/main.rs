mod archive;
mod config;
mod documents;
mod errors;
mod interview;
mod llm_client;
mod prompts;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::archive::ResultArchive;
use crate::config::Config;
use crate::interview::store::SessionStore;
use crate::llm_client::LlmClient;
use crate::prompts::{PromptLoader, GENERATE_QUESTIONS_PROMPT, SCORE_ANSWER_PROMPT};
use crate::routes::build_router;
use crate::state::AppState;

const SESSION_EVICTION_PERIOD: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on a missing API key)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Screener v{}", env!("CARGO_PKG_VERSION"));

    // Prompt templates are re-read on every call; this only warns early.
    let prompts = PromptLoader::new(config.prompts_dir.clone());
    for name in [GENERATE_QUESTIONS_PROMPT, SCORE_ANSWER_PROMPT] {
        if !prompts.dir().join(name).is_file() {
            warn!(
                "Prompt template '{}' not found in {}",
                name,
                prompts.dir().display()
            );
        }
    }

    let archive = ResultArchive::new(config.data_dir.clone());
    archive
        .ensure_dir()
        .await
        .context("Failed to create the results directory")?;
    info!("Saving results to {}", archive.dir().display());

    let llm = LlmClient::new(
        config.anthropic_api_key.clone(),
        Duration::from_secs(config.llm_timeout_secs),
    )
    .context("Failed to build HTTP client")?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let sessions = SessionStore::new(Duration::from_secs(config.session_ttl_secs));
    let _eviction = sessions.spawn_eviction(SESSION_EVICTION_PERIOD);
    info!("Idle sessions expire after {}s", config.session_ttl_secs);

    let state = AppState {
        llm: Arc::new(llm),
        prompts,
        sessions,
        archive,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
