//! Admin endpoints: user management, activity log, dashboard statistics
//!
//! All listings here are campus-scoped through the access guard, the same
//! way submission listings are.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use super::{auth::hash_password, log_activity, AppState};
use crate::error::ApiError;
use crate::models::*;
use crate::validation::validate_create_user;

// =============================================================================
// User Management
// =============================================================================

/// List users within the admin's campus scope.
pub async fn list_users(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<impl IntoResponse, ApiError> {
    let campuses = state.guard.scope_filter(&actor).as_sql_list();
    let wildcard = state.guard.wildcard_on_null_campus();

    let users: Vec<User> = sqlx::query_as(
        r#"
        SELECT * FROM users
        WHERE ($1::text[] IS NULL
               OR ($2 AND (campus IS NULL OR btrim(campus) = ''))
               OR LOWER(btrim(campus)) = ANY($1))
        ORDER BY username
        "#,
    )
    .bind(&campuses)
    .bind(wildcard)
    .fetch_all(&state.pool)
    .await?;

    let users: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();
    Ok(Json(ApiResponse::success(users)))
}

/// Create a user account.
pub async fn create_user(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(input): Json<CreateUser>,
) -> Result<impl IntoResponse, ApiError> {
    validate_create_user(&input)?;

    // Only a super admin may mint another admin.
    if input.role.is_admin() && actor.role != Role::SuperAdmin {
        return Err(ApiError::Forbidden);
    }

    let password_hash = hash_password(&input.password).map_err(|e| {
        tracing::error!("Password hashing failed: {}", e);
        ApiError::validation("Unable to process password")
    })?;

    let result = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (username, password_hash, name, role, campus, office)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(input.username.trim())
    .bind(&password_hash)
    .bind(input.name.trim())
    .bind(input.role)
    .bind(&input.campus)
    .bind(&input.office)
    .fetch_one(&state.pool)
    .await;

    let user = match result {
        Ok(u) => u,
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
            return Err(ApiError::validation("Username is already taken"));
        }
        Err(e) => return Err(e.into()),
    };

    log_activity(
        &state.pool,
        Some(actor.user_id),
        "user_created",
        &format!("{} created account {}", actor.username, user.username),
    )
    .await;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(UserResponse::from(user))),
    ))
}

/// Delete a user account. Refused when the target is the last active
/// admin left in the system.
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let target: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?;

    // Out-of-scope users must look exactly like missing ones.
    let target = match target {
        Some(u) if state.guard.can_see(&actor, u.campus.as_deref()) => u,
        _ => return Err(ApiError::NotFound),
    };

    if target.role.is_admin() && target.status == UserStatus::Active {
        let other_admins: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM users
            WHERE role IN ('admin', 'super_admin') AND status = 'active' AND id <> $1
            "#,
        )
        .bind(target.id)
        .fetch_one(&state.pool)
        .await?;
        if other_admins == 0 {
            return Err(ApiError::validation(
                "Cannot delete the last active administrator",
            ));
        }
    }

    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(target.id)
        .execute(&state.pool)
        .await?;

    log_activity(
        &state.pool,
        Some(actor.user_id),
        "user_deleted",
        &format!("{} deleted account {}", actor.username, target.username),
    )
    .await;

    tracing::info!("Admin {} deleted user {}", actor.username, target.username);

    Ok(Json(ApiResponse::success(serde_json::json!({
        "deleted": true,
        "id": target.id,
        "username": target.username,
    }))))
}

// =============================================================================
// Activity Log
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// List activity-log entries, scoped by the acting user's campus via the
/// entry author's campus. Entries without an author are wildcard-visible.
pub async fn list_activity(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<ActivityQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (page, per_page, offset) = page_window(query.page, query.per_page, 50, 200);

    let campuses = state.guard.scope_filter(&actor).as_sql_list();
    let wildcard = state.guard.wildcard_on_null_campus();

    let entries: Vec<ActivityEntry> = sqlx::query_as(
        r#"
        SELECT a.id, a.user_id, u.username, u.campus, a.action, a.description, a.created_at
        FROM activity_log a
        LEFT JOIN users u ON u.id = a.user_id
        WHERE ($1::text[] IS NULL
               OR ($2 AND (u.campus IS NULL OR btrim(u.campus) = ''))
               OR LOWER(btrim(u.campus)) = ANY($1))
        ORDER BY a.created_at DESC
        LIMIT $3 OFFSET $4
        "#,
    )
    .bind(&campuses)
    .bind(wildcard)
    .bind(per_page)
    .bind(offset)
    .fetch_all(&state.pool)
    .await?;

    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM activity_log a
        LEFT JOIN users u ON u.id = a.user_id
        WHERE ($1::text[] IS NULL
               OR ($2 AND (u.campus IS NULL OR btrim(u.campus) = ''))
               OR LOWER(btrim(u.campus)) = ANY($1))
        "#,
    )
    .bind(&campuses)
    .bind(wildcard)
    .fetch_one(&state.pool)
    .await?;

    let total_pages = (total as f64 / per_page as f64).ceil() as i64;
    Ok(Json(ApiResponse::success(PaginatedResponse {
        items: entries,
        total,
        page,
        per_page,
        total_pages,
    })))
}

// =============================================================================
// Dashboard
// =============================================================================

/// Scoped dashboard statistics.
pub async fn dashboard_stats(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<impl IntoResponse, ApiError> {
    let campuses = state.guard.scope_filter(&actor).as_sql_list();
    let wildcard = state.guard.wildcard_on_null_campus();

    let by_status: Vec<(String, i64)> = sqlx::query_as(
        r#"
        SELECT status::text, COUNT(*) FROM report_submissions
        WHERE ($1::text[] IS NULL
               OR ($2 AND (campus IS NULL OR btrim(campus) = ''))
               OR LOWER(btrim(campus)) = ANY($1))
        GROUP BY status
        "#,
    )
    .bind(&campuses)
    .bind(wildcard)
    .fetch_all(&state.pool)
    .await?;

    let active_assignments: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM table_assignments WHERE status = 'active'")
            .fetch_one(&state.pool)
            .await?;

    let user_count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM users
        WHERE status = 'active'
          AND ($1::text[] IS NULL
               OR ($2 AND (campus IS NULL OR btrim(campus) = ''))
               OR LOWER(btrim(campus)) = ANY($1))
        "#,
    )
    .bind(&campuses)
    .bind(wildcard)
    .fetch_one(&state.pool)
    .await?;

    let by_status: std::collections::HashMap<String, i64> = by_status.into_iter().collect();

    Ok(Json(ApiResponse::success(serde_json::json!({
        "submissions_by_status": by_status,
        "active_assignments": active_assignments,
        "active_users": user_count,
    }))))
}
