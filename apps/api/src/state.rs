use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use sqlx::PgPool;

use crate::ats::keywords::KeywordMatcher;
use crate::config::Config;
use crate::ingest::job_fetcher::JobFetcher;
use crate::rate_limit::DailyLimiter;
use crate::rewrite::engine::RewriteEngine;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub s3: S3Client,
    pub config: Config,
    pub engine: Arc<RewriteEngine>,
    /// Pluggable keyword strategy for the scorer. Default: CapitalizedPhraseMatcher.
    pub keyword_matcher: Arc<dyn KeywordMatcher>,
    /// Daily quota on generation endpoints, backed by Redis.
    pub limiter: DailyLimiter,
    pub job_fetcher: JobFetcher,
}
