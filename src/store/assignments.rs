//! Assignment store and resolver
//!
//! Computes office worklists from active assignments and owns the
//! reactivate-or-create contract: assigning the same table to the same
//! office twice must never produce a second active row.

use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use std::cmp::Ordering;
use uuid::Uuid;

use crate::access::{is_match, office_campus_combo};
use crate::error::ApiError;
use crate::models::{
    Assignment, AssignmentResponse, AssignmentStatus, CreateAssignment, Priority, Task, TaskStatus,
};
use crate::reports::ReportTable;

/// Deadline window, in days, within which a pending task is flagged.
const DUE_SOON_DAYS: i64 = 3;

/// Derive the display status for an assignment on a worklist.
pub fn task_status(
    completed: bool,
    deadline: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> TaskStatus {
    if completed {
        return TaskStatus::Completed;
    }
    match deadline {
        Some(d) if d < now => TaskStatus::Overdue,
        Some(d) if d <= now + Duration::days(DUE_SOON_DAYS) => TaskStatus::DueSoon,
        _ => TaskStatus::Pending,
    }
}

/// Worklist ordering: priority high to low, then deadline ascending with
/// missing deadlines last, then most recently assigned first.
pub fn task_order(a: &Task, b: &Task) -> Ordering {
    b.priority
        .cmp(&a.priority)
        .then_with(|| match (a.deadline, b.deadline) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| b.assigned_date.cmp(&a.assigned_date))
}

/// List the tasks an office must act on, with completion state resolved
/// against existing submissions.
pub async fn list_tasks(
    pool: &PgPool,
    office: &str,
    campus: Option<&str>,
) -> Result<Vec<Task>, ApiError> {
    let active: Vec<Assignment> =
        sqlx::query_as("SELECT * FROM table_assignments WHERE status = 'active'")
            .fetch_all(pool)
            .await?;

    let mine: Vec<Assignment> = active
        .into_iter()
        .filter(|a| is_match(&a.assigned_office, office, campus))
        .collect();
    if mine.is_empty() {
        return Ok(Vec::new());
    }

    let tables: Vec<String> = mine.iter().map(|a| a.table_name.clone()).collect();
    let submissions: Vec<(String, String, Option<String>)> = sqlx::query_as(
        r#"
        SELECT table_name, office, campus FROM report_submissions
        WHERE status IN ('pending', 'approved') AND table_name = ANY($1)
        "#,
    )
    .bind(&tables)
    .fetch_all(pool)
    .await?;

    let now = Utc::now();
    let mut tasks: Vec<Task> = mine
        .into_iter()
        .map(|a| {
            // A submission satisfies the assignment when its stored office
            // matches under the same predicate used for users.
            let completed = submissions.iter().any(|(table, sub_office, sub_campus)| {
                *table == a.table_name
                    && is_match(&a.assigned_office, sub_office, sub_campus.as_deref())
            });
            Task {
                id: a.id,
                table_name: a.table_name,
                office: a.assigned_office,
                description: a.description,
                assigned_date: a.assigned_date,
                deadline: a.deadline,
                priority: a.priority,
                status: task_status(completed, a.deadline, now),
            }
        })
        .collect();

    tasks.sort_by(task_order);
    Ok(tasks)
}

/// Reactivate-or-create: if an active assignment already covers this
/// (table, office key), update its metadata in place; otherwise insert.
/// Runs in one transaction, with the active rows locked so concurrent
/// assignment of the same table cannot race into a duplicate.
pub async fn create_or_reactivate(
    pool: &PgPool,
    table: ReportTable,
    input: &CreateAssignment,
    actor_id: Uuid,
) -> Result<AssignmentResponse, ApiError> {
    match attempt_assign(pool, table, input, actor_id).await {
        // Two first-time assignments can race past the row locks: with no
        // matching row yet there is nothing to lock. The loser lands here
        // after the winner committed, so a second pass finds that row and
        // reactivates it.
        Err(ApiError::Conflict) => attempt_assign(pool, table, input, actor_id).await,
        other => other,
    }
}

/// The active assignment this (office, campus) already has, if any.
fn find_active_match(
    active: Vec<Assignment>,
    office: &str,
    campus: Option<&str>,
) -> Option<Assignment> {
    active
        .into_iter()
        .find(|a| is_match(&a.assigned_office, office, campus))
}

async fn attempt_assign(
    pool: &PgPool,
    table: ReportTable,
    input: &CreateAssignment,
    actor_id: Uuid,
) -> Result<AssignmentResponse, ApiError> {
    let office_key = office_campus_combo(&input.office, input.campus.as_deref());
    let priority = input.priority.unwrap_or(Priority::Medium);

    let mut tx = pool.begin().await?;

    let active: Vec<Assignment> = sqlx::query_as(
        "SELECT * FROM table_assignments WHERE table_name = $1 AND status = 'active' FOR UPDATE",
    )
    .bind(table.as_str())
    .fetch_all(&mut *tx)
    .await?;

    let existing = find_active_match(active, &input.office, input.campus.as_deref());

    let (assignment, reactivated) = match existing {
        Some(current) => {
            let updated: Assignment = sqlx::query_as(
                r#"
                UPDATE table_assignments
                SET description = $1, deadline = $2, priority = $3,
                    assigned_by = $4, assigned_date = NOW(), status = 'active'
                WHERE id = $5
                RETURNING *
                "#,
            )
            .bind(&input.description)
            .bind(input.deadline)
            .bind(priority)
            .bind(actor_id)
            .bind(current.id)
            .fetch_one(&mut *tx)
            .await?;
            (updated, true)
        }
        None => {
            let inserted = sqlx::query_as::<_, Assignment>(
                r#"
                INSERT INTO table_assignments
                    (table_name, assigned_office, description, deadline, priority, assigned_by)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING *
                "#,
            )
            .bind(table.as_str())
            .bind(&office_key)
            .bind(&input.description)
            .bind(input.deadline)
            .bind(priority)
            .bind(actor_id)
            .fetch_one(&mut *tx)
            .await;
            // The unique index on active (table, office key) is the hard
            // backstop behind the row locks above.
            let inserted = match inserted {
                Ok(a) => a,
                Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                    return Err(ApiError::Conflict);
                }
                Err(e) => return Err(e.into()),
            };
            (inserted, false)
        }
    };

    tx.commit().await?;

    Ok(AssignmentResponse {
        assignment,
        office_key,
        reactivated,
    })
}

/// Admin toggle among active/completed/cancelled.
pub async fn set_status(
    pool: &PgPool,
    id: Uuid,
    status: AssignmentStatus,
) -> Result<Assignment, ApiError> {
    sqlx::query_as("UPDATE table_assignments SET status = $1 WHERE id = $2 RETURNING *")
        .bind(status)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(ApiError::NotFound)
}

/// Ids of the active assignments a submission from this (office, campus)
/// satisfies.
fn matching_assignment_ids(
    active: &[Assignment],
    office: &str,
    campus: Option<&str>,
) -> Vec<Uuid> {
    active
        .iter()
        .filter(|a| is_match(&a.assigned_office, office, campus))
        .map(|a| a.id)
        .collect()
}

/// Mark matching active assignments completed after a submission landed.
/// Finding nothing to update is normal. Callers treat failure as
/// best-effort: it is logged, never propagated into the submission path.
pub async fn complete_matching(
    pool: &PgPool,
    table_name: &str,
    office: &str,
    campus: Option<&str>,
) -> Result<u64, sqlx::Error> {
    let active: Vec<Assignment> = sqlx::query_as(
        "SELECT * FROM table_assignments WHERE table_name = $1 AND status = 'active'",
    )
    .bind(table_name)
    .fetch_all(pool)
    .await?;

    let ids = matching_assignment_ids(&active, office, campus);
    if ids.is_empty() {
        return Ok(0);
    }

    let result = sqlx::query("UPDATE table_assignments SET status = 'completed' WHERE id = ANY($1)")
        .bind(&ids)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(priority: Priority, deadline: Option<i64>, assigned_days_ago: i64) -> Task {
        let now = Utc::now();
        Task {
            id: Uuid::new_v4(),
            table_name: "enrollment".to_string(),
            office: "RGO Lipa".to_string(),
            description: None,
            assigned_date: now - Duration::days(assigned_days_ago),
            deadline: deadline.map(|d| now + Duration::days(d)),
            priority,
            status: TaskStatus::Pending,
        }
    }

    #[test]
    fn completed_wins_over_deadline() {
        let now = Utc::now();
        let past = Some(now - Duration::days(5));
        assert_eq!(task_status(true, past, now), TaskStatus::Completed);
    }

    #[test]
    fn deadline_buckets() {
        let now = Utc::now();
        assert_eq!(
            task_status(false, Some(now - Duration::hours(1)), now),
            TaskStatus::Overdue
        );
        assert_eq!(
            task_status(false, Some(now + Duration::days(2)), now),
            TaskStatus::DueSoon
        );
        assert_eq!(
            task_status(false, Some(now + Duration::days(5)), now),
            TaskStatus::Pending
        );
        assert_eq!(task_status(false, None, now), TaskStatus::Pending);
    }

    #[test]
    fn ordering_puts_high_priority_first() {
        let mut tasks = vec![
            task(Priority::Low, Some(1), 0),
            task(Priority::High, Some(10), 0),
            task(Priority::Medium, None, 0),
        ];
        tasks.sort_by(task_order);
        assert_eq!(tasks[0].priority, Priority::High);
        assert_eq!(tasks[1].priority, Priority::Medium);
        assert_eq!(tasks[2].priority, Priority::Low);
    }

    #[test]
    fn ordering_breaks_ties_by_deadline_nulls_last() {
        let mut tasks = vec![
            task(Priority::High, None, 0),
            task(Priority::High, Some(7), 0),
            task(Priority::High, Some(2), 0),
        ];
        tasks.sort_by(task_order);
        assert!(tasks[0].deadline.is_some());
        assert!(tasks[0].deadline < tasks[1].deadline);
        assert!(tasks[2].deadline.is_none());
    }

    fn assignment(office: &str) -> Assignment {
        Assignment {
            id: Uuid::new_v4(),
            table_name: "enrollment".to_string(),
            assigned_office: office.to_string(),
            description: None,
            assigned_date: Utc::now(),
            deadline: None,
            priority: Priority::Medium,
            status: AssignmentStatus::Active,
            assigned_by: None,
        }
    }

    #[test]
    fn second_assignment_resolves_to_the_existing_row() {
        // First call: nothing active yet, so the insert arm runs.
        assert!(find_active_match(Vec::new(), "EMU", Some("Lipa")).is_none());

        // A repeat call, or the loser of a first-insert race retrying
        // after the winner committed, must land on that row and
        // reactivate it instead of inserting a duplicate.
        let stored = assignment(&office_campus_combo("EMU", Some("Lipa")));
        let id = stored.id;
        let found =
            find_active_match(vec![stored], "EMU", Some("Lipa")).expect("existing active row");
        assert_eq!(found.id, id);
    }

    #[test]
    fn bare_office_assignment_reactivates_for_any_campus() {
        let stored = assignment("emu");
        assert!(find_active_match(vec![stored.clone()], "EMU", Some("Lipa")).is_some());
        assert!(find_active_match(vec![stored], "EMU", Some("Nasugbu")).is_some());
    }

    #[test]
    fn completion_flips_only_matching_assignments() {
        let lipa = assignment(&office_campus_combo("EMU", Some("Lipa")));
        let nasugbu = assignment(&office_campus_combo("EMU", Some("Nasugbu")));
        let other_office = assignment("rgo");

        let ids = matching_assignment_ids(
            &[lipa.clone(), nasugbu, other_office],
            "EMU",
            Some("Lipa"),
        );
        assert_eq!(ids, vec![lipa.id]);
    }

    #[test]
    fn completion_matches_nothing_for_an_unassigned_office() {
        let active = [assignment(&office_campus_combo("EMU", Some("Lipa")))];
        assert!(matching_assignment_ids(&active, "RGO", Some("Lipa")).is_empty());
    }

    #[test]
    fn ordering_falls_back_to_newest_assignment() {
        let mut tasks = vec![
            task(Priority::Medium, None, 10),
            task(Priority::Medium, None, 1),
        ];
        tasks.sort_by(task_order);
        assert!(tasks[0].assigned_date > tasks[1].assigned_date);
    }
}
