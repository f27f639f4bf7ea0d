use campus_core::models::{Course, EnrolmentRow};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Shown next to every enrolment in a teacher's student list.
pub const REGISTERED_STATUS: &str = "✔ Registered";

/// `{"course_ids": [..]}` for teacher and student course selection.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CourseSelection {
    #[serde(alias = "courseIds")]
    #[validate(length(min = 1, message = "course_ids must not be empty"))]
    pub course_ids: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignmentOutcome {
    pub message: String,
    /// Pairs that did not exist before this call.
    pub assigned: usize,
    pub requested: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseWithCount {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub department: Option<String>,
    pub student_count: usize,
}

impl CourseWithCount {
    pub fn new(course: Course, student_count: usize) -> Self {
        Self {
            id: course.id,
            name: course.name,
            code: course.code,
            department: course.department,
            student_count,
        }
    }
}

/// One student enrolled in one of the teacher's courses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrolledStudent {
    pub student_id: i64,
    pub student: String,
    pub registration_number: String,
    pub course_id: i64,
    pub course: String,
    pub code: String,
    pub status: &'static str,
}

impl From<EnrolmentRow> for EnrolledStudent {
    fn from(row: EnrolmentRow) -> Self {
        Self {
            student_id: row.student.id,
            student: row.student.fullname,
            registration_number: row.student.registration_number,
            course_id: row.course.id,
            course: row.course.name,
            code: row.course.code,
            status: REGISTERED_STATUS,
        }
    }
}
