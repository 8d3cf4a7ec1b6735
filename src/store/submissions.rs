//! Submission store
//!
//! The submission write is all-or-nothing: header, child rows, and the
//! denormalized target-table rows land in one transaction or not at all.

use serde_json::{Map, Value};
use sqlx::PgPool;
use uuid::Uuid;

use crate::access::AccessGuard;
use crate::error::ApiError;
use crate::models::{
    page_window, Actor, PaginatedResponse, Submission, SubmissionReceipt, SubmissionRow,
    SubmissionStatus,
};
use crate::reports::ReportTable;
use crate::validation;

/// Filters for the scoped submission listing.
#[derive(Debug, Clone)]
pub struct ListFilter {
    /// Restrict to one submitter (scope=mine).
    pub only_user: Option<Uuid>,
    pub status: Option<SubmissionStatus>,
    pub table: Option<ReportTable>,
    pub page: i64,
    pub per_page: i64,
}

/// Build the denormalized insert for a report type. Column names come
/// from the static registry, never from request input.
fn target_insert_sql(table: ReportTable) -> String {
    let mut columns: Vec<&str> = vec!["batch_id", "campus", "office"];
    columns.extend(table.columns());
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("${}", i)).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table.storage_table(),
        columns.join(", "),
        placeholders.join(", ")
    )
}

/// A cell as stored in the target table: text, or NULL for missing and
/// blank values.
fn cell_value(value: Option<&Value>) -> Option<String> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    }
}

/// One row's writes, fully computed before the transaction starts: the
/// JSONB record and the ordered target-table cells.
struct RowWrite {
    data: Value,
    cells: Vec<Option<String>>,
}

fn plan_row_writes(table: ReportTable, rows: &[Map<String, Value>]) -> Vec<RowWrite> {
    rows.iter()
        .map(|row| RowWrite {
            data: Value::Object(row.clone()),
            cells: table
                .columns()
                .iter()
                .map(|column| cell_value(row.get(*column)))
                .collect(),
        })
        .collect()
}

/// Persist a submission: header + row records + target-table rows, one
/// transaction. Returns a receipt with the shared batch id.
pub async fn submit(
    pool: &PgPool,
    table: ReportTable,
    actor: &Actor,
    description: Option<String>,
    rows: Vec<Map<String, Value>>,
) -> Result<SubmissionReceipt, ApiError> {
    validation::validate_rows(table, &rows)?;

    let office = actor
        .office
        .as_deref()
        .filter(|o| !o.trim().is_empty())
        .ok_or_else(|| {
            ApiError::validation("Your account has no office assigned; contact an administrator")
        })?;

    let batch_id = Uuid::new_v4();
    let mut tx = pool.begin().await?;

    let submission: Submission = sqlx::query_as(
        r#"
        INSERT INTO report_submissions (table_name, campus, office, user_id, batch_id, description)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(table.as_str())
    .bind(&actor.campus)
    .bind(office)
    .bind(actor.user_id)
    .bind(batch_id)
    .bind(&description)
    .fetch_one(&mut *tx)
    .await?;

    let insert_sql = target_insert_sql(table);
    for (index, write) in plan_row_writes(table, &rows).into_iter().enumerate() {
        sqlx::query(
            "INSERT INTO report_submission_data (submission_id, row_index, data) VALUES ($1, $2, $3)",
        )
        .bind(submission.id)
        .bind(index as i32)
        .bind(write.data)
        .execute(&mut *tx)
        .await?;

        let mut query = sqlx::query(&insert_sql)
            .bind(batch_id)
            .bind(&actor.campus)
            .bind(office);
        for cell in write.cells {
            query = query.bind(cell);
        }
        query.execute(&mut *tx).await?;
    }

    tx.commit().await?;

    Ok(SubmissionReceipt {
        submission_id: submission.id,
        batch_id,
        records_count: rows.len(),
    })
}

/// Campus- and role-scoped submission listing.
pub async fn list(
    pool: &PgPool,
    guard: &AccessGuard,
    actor: &Actor,
    filter: &ListFilter,
) -> Result<PaginatedResponse<Submission>, ApiError> {
    let (page, per_page, offset) = page_window(Some(filter.page), Some(filter.per_page), 20, 100);

    // None disables campus filtering entirely (scope=mine, or an
    // unrestricted actor).
    let campuses: Option<Vec<String>> = if filter.only_user.is_some() {
        None
    } else {
        guard.scope_filter(actor).as_sql_list()
    };
    let wildcard = guard.wildcard_on_null_campus();
    let status = filter.status;
    let table = filter.table.map(|t| t.as_str());

    let items: Vec<Submission> = sqlx::query_as(
        r#"
        SELECT * FROM report_submissions
        WHERE ($1::uuid IS NULL OR user_id = $1)
          AND ($2::submission_status IS NULL OR status = $2)
          AND ($3::text IS NULL OR table_name = $3)
          AND ($4::text[] IS NULL
               OR ($5 AND (campus IS NULL OR btrim(campus) = ''))
               OR LOWER(btrim(campus)) = ANY($4))
        ORDER BY submission_date DESC
        LIMIT $6 OFFSET $7
        "#,
    )
    .bind(filter.only_user)
    .bind(status)
    .bind(table)
    .bind(&campuses)
    .bind(wildcard)
    .bind(per_page)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM report_submissions
        WHERE ($1::uuid IS NULL OR user_id = $1)
          AND ($2::submission_status IS NULL OR status = $2)
          AND ($3::text IS NULL OR table_name = $3)
          AND ($4::text[] IS NULL
               OR ($5 AND (campus IS NULL OR btrim(campus) = ''))
               OR LOWER(btrim(campus)) = ANY($4))
        "#,
    )
    .bind(filter.only_user)
    .bind(status)
    .bind(table)
    .bind(&campuses)
    .bind(wildcard)
    .fetch_one(pool)
    .await?;

    let total_pages = (total as f64 / per_page as f64).ceil() as i64;
    Ok(PaginatedResponse {
        items,
        total,
        page,
        per_page,
        total_pages,
    })
}

/// Fetch a submission the actor is allowed to see. Out-of-scope rows are
/// reported as NotFound so existence never leaks across campuses.
pub async fn get_scoped(
    pool: &PgPool,
    guard: &AccessGuard,
    actor: &Actor,
    id: Uuid,
) -> Result<Submission, ApiError> {
    let submission: Option<Submission> =
        sqlx::query_as("SELECT * FROM report_submissions WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;

    match submission {
        Some(s) if guard.can_see(actor, s.campus.as_deref()) => Ok(s),
        _ => Err(ApiError::NotFound),
    }
}

/// Child rows of a submission, in submitted order.
pub async fn rows(pool: &PgPool, submission_id: Uuid) -> Result<Vec<SubmissionRow>, ApiError> {
    let rows: Vec<SubmissionRow> = sqlx::query_as(
        "SELECT row_index, data FROM report_submission_data WHERE submission_id = $1 ORDER BY row_index",
    )
    .bind(submission_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Admin review: approve or reject. Only touches status and the review
/// timestamp; row data is immutable once stored.
pub async fn review(
    pool: &PgPool,
    guard: &AccessGuard,
    actor: &Actor,
    id: Uuid,
    status: SubmissionStatus,
) -> Result<Submission, ApiError> {
    if status == SubmissionStatus::Pending {
        return Err(ApiError::validation(
            "Review status must be 'approved' or 'rejected'",
        ));
    }

    // Scope check first; masks out-of-scope ids as NotFound.
    get_scoped(pool, guard, actor, id).await?;

    let updated: Submission = sqlx::query_as(
        r#"
        UPDATE report_submissions
        SET status = $1, reviewed_date = NOW()
        WHERE id = $2
        RETURNING *
        "#,
    )
    .bind(status)
    .bind(id)
    .fetch_one(pool)
    .await?;
    Ok(updated)
}

/// Display name of the submitting user, for exports.
pub async fn submitter_name(pool: &PgPool, user_id: Uuid) -> Result<String, ApiError> {
    let name: Option<String> = sqlx::query_scalar("SELECT name FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(name.unwrap_or_else(|| "Unknown".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn target_insert_follows_registry_order() {
        let sql = target_insert_sql(ReportTable::WaterConsumption);
        assert_eq!(
            sql,
            "INSERT INTO report_waterconsumption \
             (batch_id, campus, office, month, year, cubic_meters, amount) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)"
        );
    }

    #[test]
    fn target_insert_has_a_placeholder_per_column() {
        for table in ReportTable::ALL {
            let sql = target_insert_sql(table);
            let expected = 3 + table.columns().len();
            assert!(sql.contains(&format!("${}", expected)));
            assert!(!sql.contains(&format!("${}", expected + 1)));
        }
    }

    #[test]
    fn write_plan_binds_every_declared_column() {
        // Cell count must agree with the placeholder count for every
        // table, otherwise the target insert fails mid-transaction.
        for table in ReportTable::ALL {
            let writes = plan_row_writes(table, &[Map::new()]);
            assert_eq!(writes[0].cells.len(), table.columns().len());
        }
    }

    #[test]
    fn write_plan_keeps_unrecognized_keys_out_of_target_cells() {
        let mut row = Map::new();
        row.insert("month".to_string(), json!("July"));
        row.insert("note_to_admin".to_string(), json!("hello"));

        let writes = plan_row_writes(ReportTable::WaterConsumption, &[row]);
        assert_eq!(writes[0].cells[0], Some("July".to_string()));
        assert!(writes[0].cells[1..].iter().all(Option::is_none));
        // The JSONB record still keeps the full submitted row.
        assert!(writes[0].data.get("note_to_admin").is_some());
    }

    #[test]
    fn cell_values_null_out_blanks() {
        assert_eq!(cell_value(None), None);
        assert_eq!(cell_value(Some(&Value::Null)), None);
        assert_eq!(cell_value(Some(&json!("  "))), None);
        assert_eq!(cell_value(Some(&json!("120.5"))), Some("120.5".to_string()));
        assert_eq!(cell_value(Some(&json!(2026))), Some("2026".to_string()));
    }
}
