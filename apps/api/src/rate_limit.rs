//! Per-client daily quota on generation endpoints, counted in Redis.

use anyhow::Context;
use axum::http::HeaderMap;
use chrono::{NaiveDate, Utc};
use tracing::{debug, warn};

use crate::errors::AppError;

const KEY_TTL_SECS: i64 = 24 * 60 * 60;
const UNKNOWN_CLIENT: &str = "unknown";

#[derive(Clone)]
pub struct DailyLimiter {
    client: redis::Client,
    /// Requests allowed per client per UTC day. Zero disables the limiter.
    limit: u32,
}

impl DailyLimiter {
    pub fn new(client: redis::Client, limit: u32) -> Self {
        Self { client, limit }
    }

    pub fn is_enabled(&self) -> bool {
        self.limit > 0
    }

    /// Counts one request for `client_id` and returns the running total for today.
    async fn record(&self, client_id: &str) -> anyhow::Result<u32> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .context("redis_get_connection")?;
        let key = usage_key(client_id, Utc::now().date_naive());

        let count: i64 = redis::cmd("INCR")
            .arg(&key)
            .query_async(&mut conn)
            .await
            .context("redis_incr_usage")?;
        if count == 1 {
            redis::cmd("EXPIRE")
                .arg(&key)
                .arg(KEY_TTL_SECS)
                .query_async::<_, ()>(&mut conn)
                .await
                .context("redis_expire_usage")?;
        }

        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }

    /// Rejects the request with `RateLimited` once the client is over today's quota.
    pub async fn enforce(&self, headers: &HeaderMap) -> Result<(), AppError> {
        if !self.is_enabled() {
            return Ok(());
        }

        let client_id = client_id(headers);
        let used = self.record(&client_id).await.map_err(AppError::Internal)?;
        debug!("Client {client_id} has used {used}/{} requests today", self.limit);

        if used > self.limit {
            warn!("Daily limit reached for client {client_id}");
            return Err(AppError::RateLimited(format!(
                "Daily limit reached. You can only generate {} applications per day.",
                self.limit
            )));
        }
        Ok(())
    }
}

pub fn usage_key(client_id: &str, day: NaiveDate) -> String {
    format!("usage:{client_id}:{}", day.format("%Y-%m-%d"))
}

/// First hop of `X-Forwarded-For`, or "unknown".
pub fn client_id(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(UNKNOWN_CLIENT)
        .to_string()
}
