//! Submission endpoints: submitting report rows, scoped listing, admin
//! review, and CSV export

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use super::{log_activity, AppState};
use crate::error::ApiError;
use crate::export;
use crate::models::*;
use crate::reports::ReportTable;
use crate::store::{assignments, submissions};
use crate::validation::parse_table_name;

// =============================================================================
// Submit
// =============================================================================

/// Submit report rows for a table. Office and campus come from the
/// session, never from the request body.
pub async fn submit_report(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(input): Json<SubmitReport>,
) -> Result<impl IntoResponse, ApiError> {
    let table = parse_table_name(&input.table_name)?;

    let receipt =
        submissions::submit(&state.pool, table, &actor, input.description, input.rows).await?;

    // Best-effort side effects; the submission is already committed.
    let office = actor.office.as_deref().unwrap_or_default();
    match assignments::complete_matching(&state.pool, table.as_str(), office, actor.campus.as_deref())
        .await
    {
        Ok(completed) if completed > 0 => {
            tracing::info!(
                "Submission {} completed {} assignment(s) for '{}'",
                receipt.submission_id,
                completed,
                table
            );
        }
        Ok(_) => {}
        Err(e) => {
            tracing::warn!(
                "Failed to auto-complete assignments after submission {}: {}",
                receipt.submission_id,
                e
            );
        }
    }

    log_activity(
        &state.pool,
        Some(actor.user_id),
        "report_submitted",
        &format!(
            "{} submitted {} row(s) for {}",
            actor.username, receipt.records_count, table
        ),
    )
    .await;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(receipt))))
}

// =============================================================================
// Listing
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ListSubmissionsQuery {
    pub scope: Option<String>,
    pub status: Option<SubmissionStatus>,
    pub table: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// List submissions, campus-scoped by the access guard.
pub async fn list_submissions(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<ListSubmissionsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let only_user = match query.scope.as_deref().unwrap_or("mine") {
        "mine" => Some(actor.user_id),
        "all" => None,
        other => {
            return Err(ApiError::validation(format!(
                "Unknown scope '{}'; expected 'mine' or 'all'",
                other
            )))
        }
    };

    let table = match query.table.as_deref() {
        Some(name) => Some(parse_table_name(name)?),
        None => None,
    };

    let filter = submissions::ListFilter {
        only_user,
        status: query.status,
        table,
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(20),
    };

    let page = submissions::list(&state.pool, &state.guard, &actor, &filter).await?;
    Ok(Json(ApiResponse::success(page)))
}

// =============================================================================
// Review
// =============================================================================

/// Admin review of a submission: approve or reject.
pub async fn review_submission(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(input): Json<ReviewRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let submission =
        submissions::review(&state.pool, &state.guard, &actor, id, input.status).await?;

    log_activity(
        &state.pool,
        Some(actor.user_id),
        "submission_reviewed",
        &format!(
            "{} marked submission {} as {:?}",
            actor.username, id, input.status
        ),
    )
    .await;

    tracing::info!(
        "Admin {} reviewed submission {} as {:?}",
        actor.username,
        id,
        input.status
    );

    Ok(Json(ApiResponse::success(submission)))
}

// =============================================================================
// Export
// =============================================================================

/// Export a submission as a CSV attachment.
pub async fn export_submission(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let submission = submissions::get_scoped(&state.pool, &state.guard, &actor, id).await?;

    let table = ReportTable::parse(&submission.table_name).ok_or_else(|| {
        ApiError::validation(format!(
            "Submission references unknown report table '{}'",
            submission.table_name
        ))
    })?;

    let rows = submissions::rows(&state.pool, submission.id).await?;
    let submitter = submissions::submitter_name(&state.pool, submission.user_id).await?;

    let csv = export::render_submission_csv(table, &submission, &submitter, &rows);
    let filename = export::export_filename(table, &submission);

    log_activity(
        &state.pool,
        Some(actor.user_id),
        "submission_exported",
        &format!("{} exported submission {}", actor.username, id),
    )
    .await;

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/csv; charset=utf-8")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        )
        .body(Body::from(csv))
        .expect("static response parts"))
}
