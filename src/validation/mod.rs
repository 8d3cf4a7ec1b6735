//! Input validation module

use crate::models::CreateUser;
use crate::reports::ReportTable;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Field '{field}' is required")]
    Required { field: String },

    #[error("Field '{field}' is too long (max {max} characters)")]
    TooLong { field: String, max: usize },

    #[error("Password is too short (min {min} characters)")]
    PasswordTooShort { min: usize },

    #[error("Invalid username (lowercase letters, digits, dots and underscores only)")]
    InvalidUsername,

    #[error("Unknown report table '{name}'")]
    UnknownTable { name: String },

    #[error("Submission contains no rows")]
    EmptyRows,

    #[error("Row {row} has no value in any recognized column")]
    EmptyRow { row: usize },
}

/// Minimum password length for newly created accounts.
const MIN_PASSWORD_LEN: usize = 10;

/// Validate a user creation request.
pub fn validate_create_user(input: &CreateUser) -> Result<(), ValidationError> {
    if input.username.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "username".to_string(),
        });
    }
    if input.username.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "username".to_string(),
            max: 100,
        });
    }
    let valid_username = input
        .username
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' || c == '_');
    if !valid_username {
        return Err(ValidationError::InvalidUsername);
    }

    if input.password.len() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort {
            min: MIN_PASSWORD_LEN,
        });
    }

    if input.name.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }
    if input.name.len() > 255 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 255,
        });
    }

    for (field, value) in [("campus", &input.campus), ("office", &input.office)] {
        if let Some(v) = value {
            if v.len() > 255 {
                return Err(ValidationError::TooLong {
                    field: field.to_string(),
                    max: 255,
                });
            }
        }
    }

    Ok(())
}

/// Resolve a user-supplied table name against the registry.
pub fn parse_table_name(name: &str) -> Result<ReportTable, ValidationError> {
    ReportTable::parse(name).ok_or_else(|| ValidationError::UnknownTable {
        name: name.trim().to_string(),
    })
}

/// Is this JSON value a usable cell value (not null, not a blank string)?
fn is_filled(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        _ => true,
    }
}

/// Validate submitted rows against a table's declared columns.
///
/// The row set must be non-empty and every row must carry at least one
/// non-blank value in a recognized column. Unrecognized keys are ignored
/// here; the store simply never persists them into the target table.
pub fn validate_rows(
    table: ReportTable,
    rows: &[Map<String, Value>],
) -> Result<(), ValidationError> {
    if rows.is_empty() {
        return Err(ValidationError::EmptyRows);
    }
    let columns = table.columns();
    for (index, row) in rows.iter().enumerate() {
        let has_value = columns
            .iter()
            .any(|col| row.get(*col).map(is_filled).unwrap_or(false));
        if !has_value {
            return Err(ValidationError::EmptyRow { row: index + 1 });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use serde_json::json;

    fn row(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn create_user() -> CreateUser {
        CreateUser {
            username: "emu.lipa".to_string(),
            password: "correct-horse-battery".to_string(),
            name: "EMU Lipa".to_string(),
            role: Role::User,
            campus: Some("Lipa".to_string()),
            office: Some("EMU".to_string()),
        }
    }

    #[test]
    fn accepts_valid_user() {
        assert!(validate_create_user(&create_user()).is_ok());
    }

    #[test]
    fn rejects_bad_usernames() {
        let mut input = create_user();
        input.username = "EMU Lipa".to_string();
        assert!(matches!(
            validate_create_user(&input),
            Err(ValidationError::InvalidUsername)
        ));

        input.username = "  ".to_string();
        assert!(matches!(
            validate_create_user(&input),
            Err(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn rejects_short_password() {
        let mut input = create_user();
        input.password = "short".to_string();
        assert!(matches!(
            validate_create_user(&input),
            Err(ValidationError::PasswordTooShort { .. })
        ));
    }

    #[test]
    fn parses_table_names() {
        assert_eq!(
            parse_table_name(" Enrollment ").unwrap(),
            ReportTable::Enrollment
        );
        assert!(matches!(
            parse_table_name("payroll"),
            Err(ValidationError::UnknownTable { .. })
        ));
    }

    #[test]
    fn rejects_empty_row_set() {
        assert!(matches!(
            validate_rows(ReportTable::WaterConsumption, &[]),
            Err(ValidationError::EmptyRows)
        ));
    }

    #[test]
    fn accepts_rows_with_a_recognized_value() {
        let rows = vec![row(&[
            ("month", json!("January")),
            ("cubic_meters", json!(120.5)),
        ])];
        assert!(validate_rows(ReportTable::WaterConsumption, &rows).is_ok());
    }

    #[test]
    fn rejects_row_with_only_blank_values() {
        let rows = vec![
            row(&[("month", json!("January"))]),
            row(&[("month", json!("  ")), ("amount", Value::Null)]),
        ];
        assert!(matches!(
            validate_rows(ReportTable::WaterConsumption, &rows),
            Err(ValidationError::EmptyRow { row: 2 })
        ));
    }

    #[test]
    fn unrecognized_keys_do_not_count() {
        let rows = vec![row(&[("note_to_admin", json!("hello"))])];
        assert!(matches!(
            validate_rows(ReportTable::WaterConsumption, &rows),
            Err(ValidationError::EmptyRow { row: 1 })
        ));
    }

    #[test]
    fn numeric_and_bool_values_count_as_filled() {
        let rows = vec![row(&[("year", json!(2026))])];
        assert!(validate_rows(ReportTable::WaterConsumption, &rows).is_ok());
    }
}
