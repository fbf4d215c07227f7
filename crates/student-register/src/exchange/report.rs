//! CSV master report.
//!
//! One row per student joining the roster with attendance totals and exam
//! scores read from the sibling `attendance_records` and `results_data`
//! keys. Those datasets are matched to students by key text only.

use serde_json::{Map, Value};
use tracing::debug;

use crate::config::ExportConfig;
use crate::error::{Error, Result};
use crate::storage::{keys, Storage};
use crate::student::Student;

/// Default file name for the exported report.
pub const REPORT_FILE_NAME: &str = "Master_Report.csv";

/// Cell written when a student has no score for a column.
const MISSING_SCORE: &str = "-";

/// Fixed leading columns of the report.
const BASE_COLUMNS: [&str; 8] = [
    "Name",
    "Roll",
    "Class",
    "Guardian",
    "Phone",
    "Total Present",
    "Total Absent",
    "Notes",
];

/// The datasets a report joins against the roster.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportInputs {
    /// Composite attendance key to `true` (present) or anything else (absent).
    pub attendance: Map<String, Value>,
    /// `<Exam>_<Subject>_<Class>_<Roll>` to score.
    pub results: Map<String, Value>,
}

impl ReportInputs {
    /// Read attendance and results from the store.
    ///
    /// Missing or unreadable datasets are treated as empty.
    ///
    /// # Errors
    ///
    /// Returns an error only if the store cannot be read.
    pub fn load(store: &Storage) -> Result<Self> {
        Ok(Self {
            attendance: store.get_json_or_default(keys::ATTENDANCE)?,
            results: store.get_json_or_default(keys::RESULTS)?,
        })
    }
}

/// Days present and absent for one student.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AttendanceTotals {
    /// Entries recorded as `true`.
    pub present: usize,
    /// Every other matching entry.
    pub absent: usize,
}

/// Tally the attendance entries whose key mentions this student.
///
/// An entry belongs to the student when its key contains
/// `_<class>_<roll>`. Only a JSON `true` counts as present.
#[must_use]
pub fn attendance_totals(student: &Student, attendance: &Map<String, Value>) -> AttendanceTotals {
    let marker = format!("_{}_{}", student.student_class, student.roll);
    attendance
        .iter()
        .filter(|(key, _)| key.contains(&marker))
        .fold(AttendanceTotals::default(), |mut totals, (_, value)| {
            if value == &Value::Bool(true) {
                totals.present += 1;
            } else {
                totals.absent += 1;
            }
            totals
        })
}

/// Column headers of the report for the given layout.
#[must_use]
pub fn report_header(layout: &ExportConfig) -> Vec<String> {
    let mut header: Vec<String> = BASE_COLUMNS.iter().map(ToString::to_string).collect();
    for subject in &layout.subjects {
        for exam in &layout.exams {
            header.push(format!("{subject} ({exam})"));
        }
    }
    header
}

/// Render the report as CSV text with a header row.
///
/// # Errors
///
/// Returns an error if the CSV writer fails.
pub fn export_csv(
    roster: &[Student],
    inputs: &ReportInputs,
    layout: &ExportConfig,
) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(report_header(layout))?;

    for student in roster {
        let totals = attendance_totals(student, &inputs.attendance);

        let mut row = vec![
            student.name.clone(),
            student.roll.clone(),
            student.student_class.clone(),
            student.guardian.clone(),
            student.phone.clone(),
            totals.present.to_string(),
            totals.absent.to_string(),
            student.notes.clone(),
        ];
        for subject in &layout.subjects {
            for exam in &layout.exams {
                let key = format!(
                    "{exam}_{subject}_{}_{}",
                    student.student_class, student.roll
                );
                row.push(score_cell(inputs.results.get(&key)));
            }
        }
        writer.write_record(&row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| Error::Io(e.into_error()))?;
    debug!(rows = roster.len(), bytes = bytes.len(), "Rendered CSV report");
    String::from_utf8(bytes).map_err(|e| Error::internal(format!("report is not UTF-8: {e}")))
}

fn score_cell(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(true)) => "true".to_string(),
        _ => MISSING_SCORE.to_string(),
    }
}
