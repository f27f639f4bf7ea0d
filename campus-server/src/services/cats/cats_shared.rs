use campus_core::models::CatRow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCat {
    pub course_id: i64,
    pub teacher_id: i64,
    pub cat_datetime: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RescheduleCat {
    #[serde(alias = "cat_datetime")]
    pub new_datetime: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatView {
    pub id: i64,
    pub course_id: i64,
    pub course_name: String,
    pub course_code: String,
    pub teacher_id: i64,
    pub cat_datetime: DateTime<Utc>,
}

impl From<CatRow> for CatView {
    fn from(row: CatRow) -> Self {
        Self {
            id: row.cat.id,
            course_id: row.course.id,
            course_name: row.course.name,
            course_code: row.course.code,
            teacher_id: row.cat.teacher_id,
            cat_datetime: row.cat.cat_datetime,
        }
    }
}
