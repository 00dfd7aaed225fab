use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::application::{ApplicationRow, NewApplication, STATUS_APPLIED};

/// Appends one row to the application log. Failures are logged and reported
/// as `false`.
pub async fn append_application(pool: &PgPool, application: &NewApplication) -> bool {
    let result = sqlx::query(
        "INSERT INTO applications \
         (id, applied_on, company, title, link, status, cv_link, cover_letter_link) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(Uuid::new_v4())
    .bind(application.applied_on)
    .bind(&application.company)
    .bind(&application.title)
    .bind(&application.link)
    .bind(STATUS_APPLIED)
    .bind(&application.cv_link)
    .bind(&application.cover_letter_link)
    .execute(pool)
    .await;

    match result {
        Ok(_) => {
            info!(
                "Logged application: {} at {}",
                application.title, application.company
            );
            true
        }
        Err(e) => {
            warn!("Failed to log application: {e}");
            false
        }
    }
}

/// Most recent applications first.
pub async fn list_applications(pool: &PgPool, limit: i64) -> Result<Vec<ApplicationRow>, sqlx::Error> {
    sqlx::query_as::<_, ApplicationRow>(
        "SELECT * FROM applications ORDER BY applied_on DESC, created_at DESC LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}
