//! Assignment endpoints: office worklists and admin assignment management

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use super::{log_activity, AppState};
use crate::error::ApiError;
use crate::models::*;
use crate::store::assignments;
use crate::validation::parse_table_name;

#[derive(Debug, Deserialize)]
pub struct TaskQuery {
    pub office: Option<String>,
    pub campus: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// List the active tasks visible to an office.
///
/// Office users always see their own worklist; admins may inspect any
/// office by passing `?office=&campus=`.
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<TaskQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let override_requested = query.office.is_some() || query.campus.is_some();

    let (office, campus) = if override_requested {
        if !actor.role.is_admin() {
            return Err(ApiError::Forbidden);
        }
        let office = non_blank(query.office)
            .ok_or_else(|| ApiError::validation("Query parameter 'office' is required"))?;
        (office, non_blank(query.campus))
    } else {
        let office = non_blank(actor.office.clone()).ok_or_else(|| {
            ApiError::validation("Your account has no office assigned; contact an administrator")
        })?;
        (office, non_blank(actor.campus.clone()))
    };

    let tasks = assignments::list_tasks(&state.pool, &office, campus.as_deref()).await?;
    Ok(Json(ApiResponse::success(tasks)))
}

/// Create an assignment, or reactivate the existing active one for the
/// same (table, office key).
pub async fn create_assignment(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(input): Json<CreateAssignment>,
) -> Result<impl IntoResponse, ApiError> {
    let table = parse_table_name(&input.table_name)?;
    if input.office.trim().is_empty() {
        return Err(ApiError::validation("Field 'office' is required"));
    }

    let response =
        assignments::create_or_reactivate(&state.pool, table, &input, actor.user_id).await?;

    let action = if response.reactivated {
        "assignment_reactivated"
    } else {
        "assignment_created"
    };
    log_activity(
        &state.pool,
        Some(actor.user_id),
        action,
        &format!("{} assigned to {}", table, response.office_key),
    )
    .await;

    tracing::info!(
        "Admin {} assigned '{}' to office '{}' (reactivated: {})",
        actor.username,
        table,
        response.office_key,
        response.reactivated
    );

    let status = if response.reactivated {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((status, Json(ApiResponse::success(response))))
}

/// Admin toggle for an assignment's status.
pub async fn update_assignment_status(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateAssignmentStatus>,
) -> Result<impl IntoResponse, ApiError> {
    let assignment = assignments::set_status(&state.pool, id, input.status).await?;

    log_activity(
        &state.pool,
        Some(actor.user_id),
        "assignment_status_changed",
        &format!(
            "{} for {} set to {:?}",
            assignment.table_name, assignment.assigned_office, input.status
        ),
    )
    .await;

    Ok(Json(ApiResponse::success(assignment)))
}
