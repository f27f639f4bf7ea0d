use campus_core::models::{Course, StudentCourseRow, TeacherCourseRow};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterCourse {
    pub id: i64,
    pub name: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_count: Option<usize>,
}

impl RosterCourse {
    fn new(course: Course, student_count: Option<usize>) -> Self {
        Self {
            id: course.id,
            name: course.name,
            code: course.code,
            student_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeacherRoster {
    pub id: i64,
    pub fullname: String,
    pub department: String,
    pub subject: String,
    pub courses: Vec<RosterCourse>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentRoster {
    pub id: i64,
    pub fullname: String,
    pub department: String,
    pub registration_number: String,
    pub courses: Vec<RosterCourse>,
}

/// Fold outer-join rows into one entry per teacher, keeping row order.
pub fn group_teachers(rows: Vec<TeacherCourseRow>) -> Vec<TeacherRoster> {
    let mut roster: Vec<TeacherRoster> = Vec::new();
    for row in rows {
        let course = row
            .course
            .map(|course| RosterCourse::new(course, Some(row.student_count)));
        match roster.last_mut() {
            Some(last) if last.id == row.teacher.id => last.courses.extend(course),
            _ => roster.push(TeacherRoster {
                id: row.teacher.id,
                fullname: row.teacher.fullname,
                department: row.teacher.department,
                subject: row.teacher.subject,
                courses: course.into_iter().collect(),
            }),
        }
    }
    roster
}

pub fn group_students(rows: Vec<StudentCourseRow>) -> Vec<StudentRoster> {
    let mut roster: Vec<StudentRoster> = Vec::new();
    for row in rows {
        let course = row.course.map(|course| RosterCourse::new(course, None));
        match roster.last_mut() {
            Some(last) if last.id == row.student.id => last.courses.extend(course),
            _ => roster.push(StudentRoster {
                id: row.student.id,
                fullname: row.student.fullname,
                department: row.student.department,
                registration_number: row.student.registration_number,
                courses: course.into_iter().collect(),
            }),
        }
    }
    roster
}

#[cfg(test)]
mod tests {
    use campus_core::models::Teacher;
    use campus_core::TenantId;
    use chrono::Utc;

    use super::*;

    fn teacher(id: i64, name: &str) -> Teacher {
        Teacher {
            id,
            tenant_id: TenantId(1),
            username: name.to_lowercase(),
            password_hash: String::new(),
            fullname: name.into(),
            employee_id: format!("EMP-{id}"),
            subject: "Maths".into(),
            department: "Science".into(),
            age: 40,
            year: "2020".into(),
            created_at: Utc::now(),
        }
    }

    fn course(id: i64, code: &str) -> Course {
        Course {
            id,
            tenant_id: TenantId(1),
            name: format!("Course {code}"),
            code: code.into(),
            department: None,
        }
    }

    #[test]
    fn teachers_appear_once_with_all_their_courses() {
        let rows = vec![
            TeacherCourseRow { teacher: teacher(1, "Ann"), course: Some(course(10, "M1")), student_count: 3 },
            TeacherCourseRow { teacher: teacher(1, "Ann"), course: Some(course(11, "M2")), student_count: 0 },
            TeacherCourseRow { teacher: teacher(2, "Ben"), course: None, student_count: 0 },
        ];
        let roster = group_teachers(rows);
        assert_eq!(roster.len(), 2);
        assert_eq!(roster[0].courses.len(), 2);
        assert_eq!(roster[0].courses[0].student_count, Some(3));
        assert_eq!(roster[0].courses[1].student_count, Some(0));
        assert_eq!(roster[1].fullname, "Ben");
        assert!(roster[1].courses.is_empty());
    }

    #[test]
    fn student_courses_carry_no_count() {
        let value = serde_json::to_value(RosterCourse::new(course(4, "B1"), None)).unwrap();
        assert!(value.get("student_count").is_none());
        assert_eq!(value["code"], "B1");
    }
}
