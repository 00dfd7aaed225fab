//! Axum route handlers for the rewrite engine and the diff view.

use axum::{extract::State, http::HeaderMap, Json};
use serde::{Deserialize, Serialize};

use crate::ats::scorer::{score_with, ScoreReport};
use crate::diff::{diff_lines, DiffLine};
use crate::errors::AppError;
use crate::models::job::JobPosting;
use crate::models::resume::AdditionalInfo;
use crate::rewrite::improvement::{improve_once, ImprovementOutcome};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AssessRequest {
    pub cv_text: String,
}

#[derive(Debug, Serialize)]
pub struct AssessResponse {
    pub assessment: String,
}

#[derive(Debug, Deserialize)]
pub struct TailorRequest {
    pub cv_text: String,
    pub job_description: String,
    #[serde(default)]
    pub additional_info: Option<AdditionalInfo>,
}

#[derive(Debug, Serialize)]
pub struct TailorResponse {
    pub tailored_cv: String,
    pub score: ScoreReport,
}

#[derive(Debug, Deserialize)]
pub struct ImproveRequest {
    pub cv_text: String,
    pub job_description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CoverLetterRequest {
    pub cv_text: String,
    pub job: JobPosting,
}

#[derive(Debug, Serialize)]
pub struct CoverLetterResponse {
    pub cover_letter: String,
}

#[derive(Debug, Deserialize)]
pub struct DiffRequest {
    pub old_text: String,
    pub new_text: String,
}

#[derive(Debug, Serialize)]
pub struct DiffResponse {
    pub lines: Vec<DiffLine>,
}

fn require_cv(cv_text: &str) -> Result<(), AppError> {
    if cv_text.trim().is_empty() {
        return Err(AppError::Validation("cv_text cannot be empty".to_string()));
    }
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/cv/assess
pub async fn handle_assess(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<AssessRequest>,
) -> Result<Json<AssessResponse>, AppError> {
    require_cv(&request.cv_text)?;
    state.limiter.enforce(&headers).await?;

    let assessment = state.engine.assess(&request.cv_text).await?;
    Ok(Json(AssessResponse { assessment }))
}

/// POST /api/v1/cv/tailor
///
/// Rewrites the CV for the job description and scores the result against it.
pub async fn handle_tailor(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<TailorRequest>,
) -> Result<Json<TailorResponse>, AppError> {
    require_cv(&request.cv_text)?;
    if request.job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "job_description cannot be empty".to_string(),
        ));
    }
    state.limiter.enforce(&headers).await?;

    let tailored_cv = state
        .engine
        .tailor(
            &request.cv_text,
            &request.job_description,
            request.additional_info.as_ref(),
        )
        .await?;
    let score = score_with(
        &tailored_cv,
        Some(&request.job_description),
        state.keyword_matcher.as_ref(),
    );

    Ok(Json(TailorResponse { tailored_cv, score }))
}

/// POST /api/v1/cv/improve
///
/// One improvement step. Scores the submitted CV first; if it already meets
/// the target nothing is generated.
pub async fn handle_improve(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<ImproveRequest>,
) -> Result<Json<ImprovementOutcome>, AppError> {
    require_cv(&request.cv_text)?;

    let job_description = request.job_description.as_deref();
    let matcher = state.keyword_matcher.as_ref();
    let report = score_with(&request.cv_text, job_description, matcher);
    if report.meets_target() {
        return Ok(Json(ImprovementOutcome::AlreadyMeetsTarget { report }));
    }

    state.limiter.enforce(&headers).await?;
    let outcome = improve_once(
        &state.engine,
        matcher,
        &request.cv_text,
        job_description,
        report,
    )
    .await?;
    Ok(Json(outcome))
}

/// POST /api/v1/cover-letter
pub async fn handle_cover_letter(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CoverLetterRequest>,
) -> Result<Json<CoverLetterResponse>, AppError> {
    require_cv(&request.cv_text)?;
    state.limiter.enforce(&headers).await?;

    let cover_letter = state
        .engine
        .generate_cover_letter(&request.cv_text, &request.job)
        .await?;
    Ok(Json(CoverLetterResponse { cover_letter }))
}

/// POST /api/v1/cv/diff
pub async fn handle_diff(Json(request): Json<DiffRequest>) -> Json<DiffResponse> {
    Json(DiffResponse {
        lines: diff_lines(&request.old_text, &request.new_text),
    })
}
