//! Axum route handlers for résumé upload and job fetching.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::ats::gaps::{detect_gaps, GapReport};
use crate::ats::scorer::{score, ScoreReport};
use crate::errors::AppError;
use crate::ingest::pdf::extract_text;
use crate::models::job::JobPosting;
use crate::state::AppState;

const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub text: String,
    pub gaps: GapReport,
    pub score: ScoreReport,
}

#[derive(Debug, Deserialize)]
pub struct FetchJobRequest {
    pub url: String,
}

/// POST /api/v1/cv/upload
///
/// Multipart upload with a `file` field holding a PDF. Returns the extracted
/// text with its gap report and a score without job-description context.
pub async fn handle_upload(mut multipart: Multipart) -> Result<Json<UploadResponse>, AppError> {
    let mut file_bytes = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() == Some(FILE_FIELD) {
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Could not read upload: {e}")))?;
            file_bytes = Some(data);
        }
    }

    let bytes = file_bytes
        .ok_or_else(|| AppError::Validation(format!("Missing '{FILE_FIELD}' field")))?;

    let text = tokio::task::spawn_blocking(move || extract_text(&bytes))
        .await
        .map_err(|e| AppError::Internal(e.into()))?;

    if text.trim().is_empty() {
        return Err(AppError::Validation(
            "Could not extract any text from the uploaded PDF".to_string(),
        ));
    }

    let gaps = detect_gaps(&text);
    // No job description yet, so the keyword matcher is never consulted.
    let score = score(&text, None);
    info!(
        "Uploaded CV: {} chars, {} gaps, score {}",
        text.len(),
        gaps.missing_elements.len(),
        score.score
    );

    Ok(Json(UploadResponse { text, gaps, score }))
}

/// POST /api/v1/jobs/fetch
///
/// Scrapes a job page into a posting the user can edit before tailoring.
pub async fn handle_fetch_job(
    State(state): State<AppState>,
    Json(request): Json<FetchJobRequest>,
) -> Result<Json<JobPosting>, AppError> {
    let url = request.url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(AppError::Validation(
            "url must be an http(s) URL".to_string(),
        ));
    }

    state
        .job_fetcher
        .fetch(url)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Could not extract job details from {url}")))
}
