use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const STATUS_APPLIED: &str = "Applied";

/// One row of the job-application log.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApplicationRow {
    pub id: Uuid,
    pub applied_on: NaiveDate,
    pub company: String,
    pub title: String,
    pub link: String,
    pub status: String,
    pub cv_link: String,
    pub cover_letter_link: String,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied when logging a new application.
#[derive(Debug, Clone)]
pub struct NewApplication {
    pub applied_on: NaiveDate,
    pub company: String,
    pub title: String,
    pub link: String,
    pub cv_link: String,
    pub cover_letter_link: String,
}
