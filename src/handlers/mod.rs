//! HTTP request handlers

pub mod admin;
pub mod assignments;
pub mod auth;
pub mod middleware;
pub mod submissions;

use crate::access::AccessGuard;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub guard: Arc<AccessGuard>,
    pub session_expiry_hours: i64,
    pub is_production: bool,
    /// Trusted proxy IP prefixes for X-Forwarded-For validation
    pub trusted_proxies: Vec<String>,
}

/// Fire-and-forget activity log write. Failure is logged, never
/// propagated into the operation that triggered it.
pub async fn log_activity(pool: &PgPool, user_id: Option<Uuid>, action: &str, description: &str) {
    let result =
        sqlx::query("INSERT INTO activity_log (user_id, action, description) VALUES ($1, $2, $3)")
            .bind(user_id)
            .bind(action)
            .bind(description)
            .execute(pool)
            .await;
    if let Err(e) = result {
        tracing::warn!("Failed to write activity log entry '{}': {}", action, e);
    }
}
