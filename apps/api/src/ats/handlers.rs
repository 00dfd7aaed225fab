//! Axum route handlers for scoring and gap detection.

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::ats::gaps::{detect_gaps, GapReport};
use crate::ats::scorer::{score_with, ScoreReport};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GapsRequest {
    pub cv_text: String,
}

#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    pub cv_text: String,
    pub job_description: Option<String>,
}

/// POST /api/v1/cv/gaps
pub async fn handle_gaps(Json(request): Json<GapsRequest>) -> Json<GapReport> {
    Json(detect_gaps(&request.cv_text))
}

/// POST /api/v1/cv/score
///
/// Any text is accepted; weak input scores low rather than failing.
pub async fn handle_score(
    State(state): State<AppState>,
    Json(request): Json<ScoreRequest>,
) -> Json<ScoreReport> {
    Json(score_with(
        &request.cv_text,
        request.job_description.as_deref(),
        state.keyword_matcher.as_ref(),
    ))
}
