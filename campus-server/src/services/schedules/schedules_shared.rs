use campus_core::models::{hhmm, ScheduleRow};
use campus_core::DayOfWeek;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddScheduleEntry {
    pub course_id: i64,
    #[validate(length(min = 1, message = "day_of_week is required"))]
    pub day_of_week: String,
    #[validate(length(min = 1, message = "start_time is required"))]
    pub start_time: String,
    #[validate(length(min = 1, message = "end_time is required"))]
    pub end_time: String,
    #[validate(length(min = 1, max = 120, message = "venue is required"))]
    pub venue: String,
    #[serde(default)]
    pub semester: String,
}

/// A timetable slot with its course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleView {
    pub id: i64,
    pub teacher_id: i64,
    pub course_id: i64,
    pub course_name: String,
    pub course_code: String,
    pub day_of_week: DayOfWeek,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    pub venue: String,
    pub semester: String,
}

impl From<ScheduleRow> for ScheduleView {
    fn from(row: ScheduleRow) -> Self {
        let ScheduleRow { entry, course } = row;
        Self {
            id: entry.id,
            teacher_id: entry.teacher_id,
            course_id: course.id,
            course_name: course.name,
            course_code: course.code,
            day_of_week: entry.day_of_week,
            start_time: entry.start_time,
            end_time: entry.end_time,
            venue: entry.venue,
            semester: entry.semester,
        }
    }
}

/// Monday first, then by start time.
pub fn timetable_order(views: &mut [ScheduleView]) {
    views.sort_by(|a, b| {
        a.day_of_week
            .cmp(&b.day_of_week)
            .then(a.start_time.cmp(&b.start_time))
            .then(a.id.cmp(&b.id))
    });
}
