//! Domain records shared by the auth crates, the store and the server.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::tenant::TenantId;

/// Principal kind. Lowercase on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Role::Student),
            "teacher" => Ok(Role::Teacher),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unsupported role: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Student {
    pub id: i64,
    pub tenant_id: TenantId,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub fullname: String,
    pub registration_number: String,
    pub department: String,
    pub age: u32,
    pub year: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    pub username: String,
    pub password_hash: String,
    pub fullname: String,
    pub registration_number: String,
    pub department: String,
    pub age: u32,
    pub year: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Teacher {
    pub id: i64,
    pub tenant_id: TenantId,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub fullname: String,
    pub employee_id: String,
    pub subject: String,
    pub department: String,
    pub age: u32,
    pub year: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTeacher {
    pub username: String,
    pub password_hash: String,
    pub fullname: String,
    pub employee_id: String,
    pub subject: String,
    pub department: String,
    pub age: u32,
    pub year: String,
}

/// Administrative account created together with its school.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Admin {
    pub id: i64,
    pub tenant_id: TenantId,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub fullname: String,
    pub phone_number: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAdmin {
    pub email: String,
    pub password_hash: String,
    pub fullname: String,
    pub phone_number: String,
}

/// A student or teacher row together with the slug of its owning tenant,
/// as returned by the login lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalRecord {
    pub id: i64,
    pub tenant_id: TenantId,
    pub tenant_slug: String,
    pub role: Role,
    pub password_hash: String,
    pub fullname: String,
    pub department: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: i64,
    pub tenant_id: TenantId,
    pub name: String,
    pub code: String,
    pub department: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCourse {
    pub name: String,
    pub code: String,
    pub department: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl FromStr for DayOfWeek {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monday" | "mon" => Ok(DayOfWeek::Monday),
            "tuesday" | "tue" => Ok(DayOfWeek::Tuesday),
            "wednesday" | "wed" => Ok(DayOfWeek::Wednesday),
            "thursday" | "thu" => Ok(DayOfWeek::Thursday),
            "friday" | "fri" => Ok(DayOfWeek::Friday),
            "saturday" | "sat" => Ok(DayOfWeek::Saturday),
            "sunday" | "sun" => Ok(DayOfWeek::Sunday),
            other => Err(format!("unknown day of week: {other}")),
        }
    }
}

/// `HH:MM` (de)serialization for class times.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }

    /// Accepts `HH:MM` and `HH:MM:SS`.
    pub fn parse(raw: &str) -> Result<NaiveTime, String> {
        let raw = raw.trim();
        NaiveTime::parse_from_str(raw, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
            .map_err(|_| format!("invalid time '{raw}', expected HH:MM"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleEntry {
    pub id: i64,
    pub tenant_id: TenantId,
    pub teacher_id: i64,
    pub course_id: i64,
    pub day_of_week: DayOfWeek,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    pub venue: String,
    pub semester: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewScheduleEntry {
    pub teacher_id: i64,
    pub course_id: i64,
    pub day_of_week: DayOfWeek,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub venue: String,
    pub semester: String,
}

/// A schedule entry joined with its course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleRow {
    pub entry: ScheduleEntry,
    pub course: Course,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatEvent {
    pub id: i64,
    pub tenant_id: TenantId,
    pub course_id: i64,
    pub teacher_id: i64,
    pub cat_datetime: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCat {
    pub course_id: i64,
    pub teacher_id: i64,
    pub cat_datetime: DateTime<Utc>,
}

/// A CAT joined with its course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatRow {
    pub cat: CatEvent,
    pub course: Course,
}

/// One row of the teacher roster outer join: a teacher with at most one
/// course and the number of students enrolled in it. `course` is `None`
/// for teachers without assignments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeacherCourseRow {
    pub teacher: Teacher,
    pub course: Option<Course>,
    pub student_count: usize,
}

/// One row of the student roster outer join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentCourseRow {
    pub student: Student,
    pub course: Option<Course>,
}

/// A student enrolled in one of a teacher's courses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrolmentRow {
    pub student: Student,
    pub course: Course,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_str() {
        for role in [Role::Student, Role::Teacher, Role::Admin] {
            assert_eq!(role.as_str().parse::<Role>(), Ok(role));
        }
        assert!("principal".parse::<Role>().is_err());
        assert_eq!(serde_json::to_string(&Role::Teacher).unwrap(), "\"teacher\"");
    }

    #[test]
    fn days_order_monday_first() {
        assert!(DayOfWeek::Monday < DayOfWeek::Friday);
        assert_eq!("wed".parse::<DayOfWeek>(), Ok(DayOfWeek::Wednesday));
        assert_eq!(" Sunday ".parse::<DayOfWeek>(), Ok(DayOfWeek::Sunday));
        assert!("someday".parse::<DayOfWeek>().is_err());
    }

    #[test]
    fn class_times_accept_minutes_and_seconds() {
        assert_eq!(hhmm::parse("08:30").unwrap(), NaiveTime::from_hms_opt(8, 30, 0).unwrap());
        assert_eq!(hhmm::parse("14:05:00").unwrap(), NaiveTime::from_hms_opt(14, 5, 0).unwrap());
        assert!(hhmm::parse("25:00").is_err());
    }

    #[test]
    fn password_hash_is_never_serialized() {
        let student = Student {
            id: 1,
            tenant_id: TenantId(2),
            username: "bob".into(),
            password_hash: "$2b$04$secret".into(),
            fullname: "Bob".into(),
            registration_number: "R-1".into(),
            department: "Science".into(),
            age: 17,
            year: "2".into(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&student).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["username"], "bob");
    }
}
