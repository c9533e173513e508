//! Course, class and enrollment records mirrored from the server.
//!
//! The server owns these shapes. Only the fields the client reads are typed;
//! everything else is preserved in `extra`.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Academic year used when the caller does not pick one.
pub const DEFAULT_ACADEMIC_YEAR: u16 = 2024;

/// Half of the academic year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Semester {
    /// First (autumn) semester.
    #[default]
    First,
    /// Second (spring) semester.
    Second,
}

impl Semester {
    /// Value the server expects in `semester` query parameters.
    pub fn as_query_value(self) -> &'static str {
        match self {
            Self::First => "上學期",
            Self::Second => "下學期",
        }
    }
}

impl fmt::Display for Semester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::First => "first",
            Self::Second => "second",
        })
    }
}

/// Error returned for unrecognised semester names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown semester: {0} (expected first or second)")]
pub struct UnknownSemester(pub String);

impl FromStr for Semester {
    type Err = UnknownSemester;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "1" | "first" | "上學期" => Ok(Self::First),
            "2" | "second" | "下學期" => Ok(Self::Second),
            other => Err(UnknownSemester(other.to_owned())),
        }
    }
}

/// Academic year and semester pair used to scope class and enrollment
/// queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AcademicTerm {
    /// Academic year, e.g. 2024.
    pub academic_year: u16,
    /// Semester within the year.
    pub semester: Semester,
}

impl AcademicTerm {
    /// Build a term.
    pub fn new(academic_year: u16, semester: Semester) -> Self {
        Self {
            academic_year,
            semester,
        }
    }
}

impl Default for AcademicTerm {
    fn default() -> Self {
        Self::new(DEFAULT_ACADEMIC_YEAR, Semester::First)
    }
}

/// A catalogue course.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    /// Server identifier.
    pub course_id: Option<i64>,
    /// Short course code.
    pub course_code: Option<String>,
    /// Course title.
    pub course_name: Option<String>,
    /// Credit value.
    pub credits: Option<u32>,
    /// Free-text description.
    pub description: Option<String>,
    /// Uninterpreted fields.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// A class section a student can enrol in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableClass {
    /// Server identifier.
    pub class_id: Option<i64>,
    /// Owning course.
    pub course_id: Option<i64>,
    /// Short course code.
    pub course_code: Option<String>,
    /// Course title.
    pub course_name: Option<String>,
    /// Teacher display name.
    pub teacher_name: Option<String>,
    /// Human-readable meeting times.
    pub schedule: Option<String>,
    /// Room.
    pub classroom: Option<String>,
    /// Seat limit.
    pub capacity: Option<u32>,
    /// Seats taken.
    pub enrolled_count: Option<u32>,
    /// Uninterpreted fields.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// One of the student's enrollments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    /// Server identifier.
    pub enrollment_id: Option<i64>,
    /// Enrolled student number.
    pub student_id: Option<String>,
    /// Enrolled class.
    pub class_id: Option<i64>,
    /// Short course code.
    pub course_code: Option<String>,
    /// Course title.
    pub course_name: Option<String>,
    /// Server-side status, e.g. `ENROLLED`.
    pub status: Option<String>,
    /// Final grade, once published.
    pub grade: Option<f64>,
    /// Uninterpreted fields.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Body of `POST /student/enroll`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollRequest {
    /// Student enrolling.
    pub student_id: String,
    /// Class being joined.
    pub class_id: i64,
}

impl EnrollRequest {
    /// Build a request.
    pub fn new(student_id: impl Into<String>, class_id: i64) -> Self {
        Self {
            student_id: student_id.into(),
            class_id,
        }
    }
}

/// Result of `GET /student/check-conflict`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictReport {
    /// Whether the class clashes with the student's timetable.
    #[serde(default)]
    pub has_conflict: bool,
    /// Server explanation of the clash.
    pub message: Option<String>,
    /// Uninterpreted fields.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Outcome of a diagnostic probe such as `/test/health`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeReport {
    /// Server message, if any.
    pub message: Option<String>,
    /// Raw diagnostic payload.
    pub detail: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("first", Semester::First)]
    #[case("2", Semester::Second)]
    #[case("下學期", Semester::Second)]
    fn semesters_parse_from_cli_and_wire_names(#[case] raw: &str, #[case] expected: Semester) {
        assert_eq!(raw.parse::<Semester>().expect("known"), expected);
    }

    #[test]
    fn default_term_matches_server_default() {
        let term = AcademicTerm::default();
        assert_eq!(term.academic_year, 2024);
        assert_eq!(term.semester.as_query_value(), "上學期");
    }

    #[test]
    fn classes_tolerate_partial_records() {
        let class: AvailableClass = serde_json::from_value(json!({
            "classId": 42,
            "courseName": "Operating Systems",
            "weekday": 3
        }))
        .expect("decode");
        assert_eq!(class.class_id, Some(42));
        assert!(class.teacher_name.is_none());
        assert_eq!(class.extra.get("weekday"), Some(&json!(3)));
    }
}
