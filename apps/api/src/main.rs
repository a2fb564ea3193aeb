mod assistant;
mod config;
mod db;
mod documents;
mod errors;
mod extraction;
mod llm_client;
mod models;
mod prompts;
mod resumes;
mod routes;
mod scoring;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::assistant::AssistantService;
use crate::config::Config;
use crate::db::{create_pool, ensure_schema};
use crate::documents::DocumentTextExtractor;
use crate::extraction::ResumeExtractor;
use crate::llm_client::LlmGateway;
use crate::prompts::PromptRegistry;
use crate::resumes::{PgResumeRepository, ResumeService};
use crate::routes::build_router;
use crate::scoring::Rubric;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing or malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting cvscore v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    ensure_schema(&db).await?;

    // One gateway per process: owns the response cache and the provider client
    let gateway = Arc::new(LlmGateway::new(config.gateway_settings()));
    info!(
        model = gateway.default_model(),
        cache_enabled = config.llm_cache_enabled,
        cache_ttl_s = config.llm_cache_ttl_s,
        "LLM gateway initialized"
    );
    if config.openai_api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY is not set; analysis requests will fail until it is configured");
    }

    let prompts = PromptRegistry::new(config.prompts_dir.clone());
    let rubric = Rubric::for_version(&config.scoring_version)
        .with_context(|| format!("Invalid SCORING_VERSION '{}'", config.scoring_version))?;
    info!("Scoring rubric: {}", rubric.version());

    let resumes = ResumeService::new(
        Arc::new(DocumentTextExtractor),
        ResumeExtractor::new(gateway.clone(), prompts.clone()),
        Arc::new(PgResumeRepository::new(db)),
        rubric,
    );
    let assistant = AssistantService::new(gateway, prompts);

    // Build app state
    let state = AppState {
        resumes: Arc::new(resumes),
        assistant: Arc::new(assistant),
        max_upload_bytes: config.max_upload_bytes(),
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
