//! Data models for the application

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;
use uuid::Uuid;

// =============================================================================
// Enums
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Admin,
    SuperAdmin,
}

impl Role {
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin | Role::SuperAdmin)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "assignment_priority", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "assignment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    Active,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "submission_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Pending,
    Approved,
    Rejected,
}

impl SubmissionStatus {
    /// Label used in the CSV export metadata block.
    pub fn display(&self) -> &'static str {
        match self {
            SubmissionStatus::Pending => "Pending",
            SubmissionStatus::Approved => "Approved",
            SubmissionStatus::Rejected => "Rejected",
        }
    }
}

/// Derived task state shown to office users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    DueSoon,
    Overdue,
    Completed,
}

// =============================================================================
// Actor
// =============================================================================

/// Request-scoped identity resolved from the session. Passed explicitly
/// into every component call; no ambient session state.
#[derive(Debug, Clone, Serialize)]
pub struct Actor {
    pub user_id: Uuid,
    pub username: String,
    pub role: Role,
    pub campus: Option<String>,
    pub office: Option<String>,
}

// =============================================================================
// User
// =============================================================================

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub name: String,
    pub role: Role,
    pub campus: Option<String>,
    pub office: Option<String>,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn actor(&self) -> Actor {
        Actor {
            user_id: self.id,
            username: self.username.clone(),
            role: self.role,
            campus: self.campus.clone(),
            office: self.office.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub name: String,
    pub role: Role,
    pub campus: Option<String>,
    pub office: Option<String>,
    pub status: UserStatus,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            name: user.name,
            role: user.role,
            campus: user.campus,
            office: user.office,
            status: user.status,
            last_login_at: user.last_login_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub password: String,
    pub name: String,
    pub role: Role,
    pub campus: Option<String>,
    pub office: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

// =============================================================================
// Session
// =============================================================================

#[derive(Debug, Clone, FromRow)]
#[allow(dead_code)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

// =============================================================================
// Assignment
// =============================================================================

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Assignment {
    pub id: Uuid,
    pub table_name: String,
    pub assigned_office: String,
    pub description: Option<String>,
    pub assigned_date: DateTime<Utc>,
    pub deadline: Option<DateTime<Utc>>,
    pub priority: Priority,
    pub status: AssignmentStatus,
    pub assigned_by: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAssignment {
    pub table_name: String,
    pub office: String,
    pub campus: Option<String>,
    pub description: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub priority: Option<Priority>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssignmentResponse {
    pub assignment: Assignment,
    /// The canonical office key the request resolved to.
    pub office_key: String,
    /// True when an existing active assignment was updated in place.
    pub reactivated: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateAssignmentStatus {
    pub status: AssignmentStatus,
}

/// A task on an office user's worklist.
#[derive(Debug, Clone, Serialize)]
pub struct Task {
    pub id: Uuid,
    pub table_name: String,
    pub office: String,
    pub description: Option<String>,
    pub assigned_date: DateTime<Utc>,
    pub deadline: Option<DateTime<Utc>>,
    pub priority: Priority,
    pub status: TaskStatus,
}

// =============================================================================
// Submission
// =============================================================================

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Submission {
    pub id: Uuid,
    pub table_name: String,
    pub campus: Option<String>,
    pub office: String,
    pub user_id: Uuid,
    pub batch_id: Uuid,
    pub submission_date: DateTime<Utc>,
    pub status: SubmissionStatus,
    pub reviewed_date: Option<DateTime<Utc>>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct SubmissionRow {
    pub row_index: i32,
    pub data: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitReport {
    pub table_name: String,
    pub description: Option<String>,
    pub rows: Vec<Map<String, Value>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmissionReceipt {
    pub submission_id: Uuid,
    pub batch_id: Uuid,
    pub records_count: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewRequest {
    pub status: SubmissionStatus,
}

// =============================================================================
// Activity log
// =============================================================================

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ActivityEntry {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub username: Option<String>,
    pub campus: Option<String>,
    pub action: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// API Responses
// =============================================================================

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

/// Highest page number a listing accepts. Keeps `(page - 1) * per_page`
/// far away from overflow on hostile input.
pub const MAX_PAGE: i64 = 1_000_000;

/// Clamp pagination inputs and compute the SQL offset.
pub fn page_window(
    page: Option<i64>,
    per_page: Option<i64>,
    default_per_page: i64,
    max_per_page: i64,
) -> (i64, i64, i64) {
    let page = page.unwrap_or(1).clamp(1, MAX_PAGE);
    let per_page = per_page.unwrap_or(default_per_page).clamp(1, max_per_page);
    (page, per_page, (page - 1) * per_page)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_window_defaults_and_clamps() {
        assert_eq!(page_window(None, None, 20, 100), (1, 20, 0));
        assert_eq!(page_window(Some(3), Some(50), 20, 100), (3, 50, 100));
        assert_eq!(page_window(Some(0), Some(0), 20, 100), (1, 1, 0));
        assert_eq!(page_window(Some(-7), Some(500), 20, 100), (1, 100, 0));
    }

    #[test]
    fn page_window_survives_hostile_page_numbers() {
        let (page, per_page, offset) = page_window(Some(i64::MAX), Some(i64::MAX), 50, 200);
        assert_eq!(page, MAX_PAGE);
        assert_eq!(per_page, 200);
        assert_eq!(offset, (MAX_PAGE - 1) * 200);
        assert!(offset > 0);
    }
}
