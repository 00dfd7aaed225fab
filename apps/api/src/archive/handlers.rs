//! Axum route handlers for archiving submitted applications.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::archive::log::{append_application, list_applications};
use crate::archive::storage::upload_text;
use crate::errors::AppError;
use crate::models::application::{ApplicationRow, NewApplication};
use crate::state::AppState;

const DEFAULT_LIST_LIMIT: i64 = 50;

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub company: String,
    pub job_title: String,
    #[serde(default)]
    pub job_link: String,
    pub cv_text: String,
    pub cover_letter: String,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub status: &'static str,
    pub cv_link: String,
    pub cover_letter_link: String,
    /// False when the files were stored but the log row could not be written.
    pub logged: bool,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
}

/// POST /api/v1/applications
///
/// Stores the CV and cover letter as text objects and appends a row to the
/// application log.
pub async fn handle_submit(
    State(state): State<AppState>,
    Json(request): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>, AppError> {
    if request.company.trim().is_empty() || request.job_title.trim().is_empty() {
        return Err(AppError::Validation(
            "company and job_title cannot be empty".to_string(),
        ));
    }

    let now = Utc::now();
    let timestamp = now.format("%Y%m%d_%H%M%S").to_string();
    let (cv_name, cover_letter_name) = object_names(&request.company, &timestamp);

    let bucket = &state.config.s3_bucket;
    let endpoint = &state.config.s3_endpoint;
    let cover_letter_link =
        upload_text(&state.s3, bucket, endpoint, &request.cover_letter, &cover_letter_name).await;
    let cv_link = upload_text(&state.s3, bucket, endpoint, &request.cv_text, &cv_name).await;

    let (Some(cv_link), Some(cover_letter_link)) = (cv_link, cover_letter_link) else {
        return Err(AppError::Storage(format!(
            "Failed to upload {cv_name} and/or {cover_letter_name}"
        )));
    };

    let logged = append_application(
        &state.db,
        &NewApplication {
            applied_on: now.date_naive(),
            company: request.company,
            title: request.job_title,
            link: request.job_link,
            cv_link: cv_link.clone(),
            cover_letter_link: cover_letter_link.clone(),
        },
    )
    .await;

    Ok(Json(SubmitResponse {
        status: "success",
        cv_link,
        cover_letter_link,
        logged,
    }))
}

/// GET /api/v1/applications
pub async fn handle_list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<ApplicationRow>>, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, 500);
    Ok(Json(list_applications(&state.db, limit).await?))
}

/// `(CV_{company}_{timestamp}.txt, Cover_Letter_{company}_{timestamp}.txt)`,
/// with the company reduced to characters safe in an object key.
fn object_names(company: &str, timestamp: &str) -> (String, String) {
    let company: String = company
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    (
        format!("CV_{company}_{timestamp}.txt"),
        format!("Cover_Letter_{company}_{timestamp}.txt"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_names() {
        let (cv, cover_letter) = object_names(" Acme Corp/EU ", "20240309_101500");
        assert_eq!(cv, "CV_Acme_Corp_EU_20240309_101500.txt");
        assert_eq!(cover_letter, "Cover_Letter_Acme_Corp_EU_20240309_101500.txt");
    }
}
