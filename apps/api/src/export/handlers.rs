//! Axum route handlers for document export.

use axum::{
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::export::docx::render;
use crate::export::filename::download_basename;

const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Deserialize)]
pub struct DocxRequest {
    pub cv_text: String,
    #[serde(default)]
    pub job_title: String,
}

/// POST /api/v1/cv/docx
///
/// Renders the résumé Markdown to a DOCX attachment named
/// `First_Last_Job_Title_CV.docx`.
pub async fn handle_docx(Json(request): Json<DocxRequest>) -> Result<Response, AppError> {
    if request.cv_text.trim().is_empty() {
        return Err(AppError::Validation("cv_text cannot be empty".to_string()));
    }

    let bytes = render(&request.cv_text)?;
    let filename = format!("{}.docx", download_basename(&request.cv_text, &request.job_title));
    info!("Rendered {filename} ({} bytes)", bytes.len());

    Ok((
        [
            (header::CONTENT_TYPE, DOCX_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        Bytes::from(bytes),
    )
        .into_response())
}
