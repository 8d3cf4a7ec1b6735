//! CSV export rendering
//!
//! Exports are built fully in memory (institutional-report scale) and
//! served as an attachment. The output starts with a UTF-8 BOM so
//! spreadsheet software picks up the encoding, then a fixed metadata
//! block, a blank line, the declared column headers, and the data rows.

use crate::models::{Submission, SubmissionRow};
use crate::reports::ReportTable;
use serde_json::Value;

/// Byte-order mark prepended for spreadsheet compatibility.
pub const UTF8_BOM: &str = "\u{feff}";

/// Quote a field when it contains a delimiter, quote, or newline.
fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn csv_line(fields: &[&str]) -> String {
    fields
        .iter()
        .map(|f| csv_field(f))
        .collect::<Vec<_>>()
        .join(",")
}

/// Render a JSON cell for CSV output. Missing and null cells become the
/// empty string; everything else uses its plain text form.
fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Render a complete submission export.
pub fn render_submission_csv(
    table: ReportTable,
    submission: &Submission,
    submitter_name: &str,
    rows: &[SubmissionRow],
) -> String {
    let mut out = String::from(UTF8_BOM);

    let campus = submission.campus.as_deref().unwrap_or("");
    let description = submission.description.as_deref().unwrap_or("");
    let date = submission
        .submission_date
        .format("%Y-%m-%d %H:%M UTC")
        .to_string();

    let metadata: [(&str, &str); 6] = [
        ("Report Table", table.display_name()),
        ("Campus", campus),
        ("Office", &submission.office),
        ("Submitted By", submitter_name),
        ("Submission Date", &date),
        ("Status", submission.status.display()),
    ];
    for (label, value) in metadata {
        out.push_str(&csv_line(&[label, value]));
        out.push('\n');
    }
    out.push_str(&csv_line(&["Description", description]));
    out.push('\n');
    out.push('\n');

    let columns = table.columns();
    out.push_str(&csv_line(columns));
    out.push('\n');

    for row in rows {
        let values: Vec<String> = columns
            .iter()
            .map(|col| cell_text(row.data.get(*col)))
            .collect();
        let refs: Vec<&str> = values.iter().map(String::as_str).collect();
        out.push_str(&csv_line(&refs));
        out.push('\n');
    }

    out
}

/// Attachment filename for a submission export.
pub fn export_filename(table: ReportTable, submission: &Submission) -> String {
    format!("{}_{}.csv", table.as_str(), submission.batch_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SubmissionStatus;
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use uuid::Uuid;

    fn submission() -> Submission {
        Submission {
            id: Uuid::new_v4(),
            table_name: "waterconsumption".to_string(),
            campus: Some("Lipa".to_string()),
            office: "EMU".to_string(),
            user_id: Uuid::new_v4(),
            batch_id: Uuid::new_v4(),
            submission_date: Utc.with_ymd_and_hms(2026, 8, 1, 9, 30, 0).unwrap(),
            status: SubmissionStatus::Approved,
            reviewed_date: None,
            description: Some("August reading".to_string()),
        }
    }

    #[test]
    fn quotes_fields_with_delimiters() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_field("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn export_starts_with_bom_and_metadata() {
        let out = render_submission_csv(
            ReportTable::WaterConsumption,
            &submission(),
            "EMU Officer",
            &[],
        );
        assert!(out.starts_with(UTF8_BOM));
        let body = out.trim_start_matches(UTF8_BOM);
        assert!(body.starts_with("Report Table,Water Consumption\n"));
        assert!(body.contains("Campus,Lipa\n"));
        assert!(body.contains("Office,EMU\n"));
        assert!(body.contains("Submitted By,EMU Officer\n"));
        assert!(body.contains("Status,Approved\n"));
    }

    #[test]
    fn export_emits_declared_columns_and_rows_in_order() {
        let rows = vec![
            SubmissionRow {
                row_index: 0,
                data: json!({"month": "July", "year": 2026, "cubic_meters": 118.2, "amount": 5320}),
            },
            SubmissionRow {
                row_index: 1,
                data: json!({"month": "August", "year": 2026, "cubic_meters": 120.5}),
            },
        ];
        let out = render_submission_csv(
            ReportTable::WaterConsumption,
            &submission(),
            "EMU Officer",
            &rows,
        );
        let lines: Vec<&str> = out.trim_start_matches(UTF8_BOM).lines().collect();
        let header_at = lines
            .iter()
            .position(|l| *l == "month,year,cubic_meters,amount")
            .expect("column header row present");
        assert_eq!(lines[header_at - 1], "", "blank line before headers");
        assert_eq!(lines[header_at + 1], "July,2026,118.2,5320");
        // Missing cells render empty, not null.
        assert_eq!(lines[header_at + 2], "August,2026,120.5,");
    }

    #[test]
    fn filename_uses_table_and_batch() {
        let sub = submission();
        let name = export_filename(ReportTable::WaterConsumption, &sub);
        assert!(name.starts_with("waterconsumption_"));
        assert!(name.ends_with(".csv"));
    }

    #[test]
    fn filenames_are_header_safe() {
        let sub = submission();
        for table in ReportTable::ALL {
            let name = export_filename(table, &sub);
            assert!(name.chars().all(|c| c.is_ascii_graphic()));
            assert!(!name.contains('"'));
        }
    }
}
