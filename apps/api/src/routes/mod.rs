pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::archive::handlers as archive;
use crate::ats::handlers as ats;
use crate::export::handlers as export;
use crate::ingest::handlers as ingest;
use crate::rewrite::handlers as rewrite;
use crate::state::AppState;

const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Analysis (pure, unmetered)
        .route(
            "/api/v1/cv/upload",
            post(ingest::handle_upload).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/api/v1/cv/gaps", post(ats::handle_gaps))
        .route("/api/v1/cv/score", post(ats::handle_score))
        .route("/api/v1/cv/diff", post(rewrite::handle_diff))
        // Generation (daily limit applies)
        .route("/api/v1/cv/assess", post(rewrite::handle_assess))
        .route("/api/v1/cv/tailor", post(rewrite::handle_tailor))
        .route("/api/v1/cv/improve", post(rewrite::handle_improve))
        .route("/api/v1/cover-letter", post(rewrite::handle_cover_letter))
        // Collaborators
        .route("/api/v1/jobs/fetch", post(ingest::handle_fetch_job))
        .route("/api/v1/cv/docx", post(export::handle_docx))
        .route(
            "/api/v1/applications",
            post(archive::handle_submit).get(archive::handle_list),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use crate::ats::keywords::CapitalizedPhraseMatcher;
    use crate::config::Config;
    use crate::ingest::job_fetcher::JobFetcher;
    use crate::llm_client::retry::RetryPolicy;
    use crate::llm_client::{CompletionError, CompletionService};
    use crate::rate_limit::DailyLimiter;
    use crate::rewrite::engine::RewriteEngine;

    /// Replies with `reply`, or reports a safety block when it is `None`.
    struct CannedCompletion {
        reply: Option<&'static str>,
    }

    #[async_trait]
    impl CompletionService for CannedCompletion {
        async fn complete(&self, _prompt: &str) -> Result<String, CompletionError> {
            self.reply
                .map(str::to_string)
                .ok_or(CompletionError::SafetyBlocked)
        }
    }

    fn test_config() -> Config {
        Config {
            database_url: "postgres://localhost/hunter_test".to_string(),
            redis_url: "redis://127.0.0.1:1/".to_string(),
            s3_bucket: "applications".to_string(),
            s3_endpoint: "http://127.0.0.1:1".to_string(),
            aws_access_key_id: "test".to_string(),
            aws_secret_access_key: "test".to_string(),
            gemini_api_key: "test".to_string(),
            port: 0,
            rust_log: "info".to_string(),
            daily_request_limit: 0,
            database_max_connections: 1,
        }
    }

    fn app(reply: Option<&'static str>) -> Router {
        let config = test_config();
        let db = PgPoolOptions::new()
            .max_connections(1)
            .connect_lazy(&config.database_url)
            .unwrap();
        let s3_config = aws_sdk_s3::Config::builder()
            .behavior_version(aws_sdk_s3::config::BehaviorVersion::latest())
            .region(aws_sdk_s3::config::Region::new("us-east-1"))
            .build();
        let redis = redis::Client::open(config.redis_url.clone()).unwrap();

        build_router(AppState {
            db,
            s3: aws_sdk_s3::Client::from_conf(s3_config),
            limiter: DailyLimiter::new(redis, config.daily_request_limit),
            config,
            engine: Arc::new(RewriteEngine::new(
                Arc::new(CannedCompletion { reply }),
                RetryPolicy::default(),
            )),
            keyword_matcher: Arc::new(CapitalizedPhraseMatcher),
            job_fetcher: JobFetcher::new().unwrap(),
        })
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(None)
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_score_endpoint() {
        let response = app(None)
            .oneshot(post_json(
                "/api/v1/cv/score",
                json!({ "cv_text": "just some words" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["grade"], "F");
        assert_eq!(body["passed"], false);
        assert!(body["recommendations"].as_array().unwrap().len() > 3);
    }

    #[tokio::test]
    async fn test_gaps_endpoint() {
        let response = app(None)
            .oneshot(post_json(
                "/api/v1/cv/gaps",
                json!({ "cv_text": "(555) 123-4567" }),
            ))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["has_gaps"], true);
        let missing = body["missing_elements"].as_array().unwrap();
        assert!(!missing.contains(&json!("phone")));
        assert!(missing.contains(&json!("linkedin")));
    }

    #[tokio::test]
    async fn test_tailor_returns_scored_rewrite() {
        let response = app(Some("## Skills\n- Rust"))
            .oneshot(post_json(
                "/api/v1/cv/tailor",
                json!({
                    "cv_text": "## Skills\n- rust",
                    "job_description": "Rust engineer",
                    "additional_info": { "phone": "(555) 123-4567" }
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["tailored_cv"], "## Skills\n- Rust");
        assert!(body["score"]["score"].as_u64().is_some());
    }

    #[tokio::test]
    async fn test_safety_block_maps_to_422() {
        let response = app(None)
            .oneshot(post_json(
                "/api/v1/cv/tailor",
                json!({ "cv_text": "cv", "job_description": "jd" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body_json(response).await["error"]["code"], "SAFETY_BLOCKED");
    }

    #[tokio::test]
    async fn test_empty_cv_is_rejected() {
        let response = app(Some("unused"))
            .oneshot(post_json(
                "/api/v1/cv/assess",
                json!({ "cv_text": "   " }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_improve_step() {
        let response = app(Some("## Summary\nImproved"))
            .oneshot(post_json(
                "/api/v1/cv/improve",
                json!({ "cv_text": "plain text resume" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["outcome"], "improved");
        assert_eq!(body["resume"], "## Summary\nImproved");
        assert!(body["previous"]["score"].as_u64().is_some());
    }

    #[tokio::test]
    async fn test_diff_endpoint() {
        let response = app(None)
            .oneshot(post_json(
                "/api/v1/cv/diff",
                json!({ "old_text": "a\nb\n", "new_text": "a\nc\n" }),
            ))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(
            body["lines"],
            json!([
                { "kind": "unchanged", "text": "a" },
                { "kind": "removed", "text": "b" },
                { "kind": "added", "text": "c" }
            ])
        );
    }

    #[tokio::test]
    async fn test_docx_attachment() {
        let response = app(None)
            .oneshot(post_json(
                "/api/v1/cv/docx",
                json!({ "cv_text": "# Jane Doe\n## Skills\n- Rust", "job_title": "SRE" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let disposition = response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert_eq!(disposition, "attachment; filename=\"Jane_Doe_SRE_CV.docx\"");
    }

    #[tokio::test]
    async fn test_fetch_job_rejects_non_http_url() {
        let response = app(None)
            .oneshot(post_json(
                "/api/v1/jobs/fetch",
                json!({ "url": "file:///etc/passwd" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
