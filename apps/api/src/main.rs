mod archive;
mod ats;
mod config;
mod db;
mod diff;
mod errors;
mod export;
mod ingest;
mod llm_client;
mod models;
mod rate_limit;
mod rewrite;
mod routes;
mod state;

use anyhow::{Context, Result};
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::ats::keywords::CapitalizedPhraseMatcher;
use crate::config::Config;
use crate::db::create_pool;
use crate::ingest::job_fetcher::JobFetcher;
use crate::llm_client::retry::RetryPolicy;
use crate::llm_client::GeminiClient;
use crate::rate_limit::DailyLimiter;
use crate::rewrite::engine::RewriteEngine;
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

    info!("Starting Hunter API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL (runs migrations)
    let db = create_pool(&config.database_url, config.database_max_connections).await?;

    // Initialize Redis-backed daily limiter
    let redis = redis::Client::open(config.redis_url.clone())?;
    let limiter = DailyLimiter::new(redis, config.daily_request_limit);
    if limiter.is_enabled() {
        info!(
            "Daily limit: {} generation requests per client",
            config.daily_request_limit
        );
    } else {
        info!("Daily limit disabled");
    }

    // Initialize S3 / MinIO
    let s3 = build_s3_client(&config).await;
    info!("S3 client initialized");

    // Initialize completion client and rewrite engine
    let completion = GeminiClient::new(config.gemini_api_key.clone())
        .context("Failed to build completion client")?;
    let engine = RewriteEngine::new(Arc::new(completion), RetryPolicy::default());
    info!("Rewrite engine initialized (model: {})", llm_client::MODEL);

    let job_fetcher = JobFetcher::new().context("Failed to build job fetcher")?;

    // Build app state
    let state = AppState {
        db,
        s3,
        config: config.clone(),
        engine: Arc::new(engine),
        keyword_matcher: Arc::new(CapitalizedPhraseMatcher),
        limiter,
        job_fetcher,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the web client's host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "hunter-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&config.s3_endpoint)
        .load()
        .await;

    aws_sdk_s3::Client::new(&s3_config)
}
