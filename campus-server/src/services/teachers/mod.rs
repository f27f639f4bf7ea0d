pub mod teachers_service;
pub mod teachers_shared;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::routing::{delete, get};
use axum::{Json, Router};
use campus_axum::rest::{map_json_rejection, map_path_rejection, message};
use campus_axum::{CampusAxumError, CurrentSession};
use campus_core::models::Course;
use serde_json::Value;

pub use teachers_service::{dedup_ids, TeachersService};
pub use teachers_shared::{AssignmentOutcome, CourseSelection, CourseWithCount, EnrolledStudent};

use crate::services::types::ensure_slug;
use crate::services::SharedState;

pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/teacher/{id}/courses", get(courses).post(assign))
        .route("/teacher/{id}/selectedcourses", get(courses))
        .route("/teacher/{id}/course/{course_id}", delete(unassign))
        .route("/teacher/{id}/courses-with-count", get(courses_with_count))
        .route("/teacher/{id}/students", get(students))
        .route("/{slug}/teacher/{id}/students", get(students_in_school))
}

async fn assign(
    State(state): State<SharedState>,
    session: CurrentSession,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<CourseSelection>, JsonRejection>,
) -> Result<Json<AssignmentOutcome>, CampusAxumError> {
    let Path(id) = id.map_err(map_path_rejection)?;
    let Json(body) = body.map_err(map_json_rejection)?;
    Ok(Json(state.teachers.assign_courses(session.claim(), id, body).await?))
}

async fn courses(
    State(state): State<SharedState>,
    session: CurrentSession,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Vec<Course>>, CampusAxumError> {
    let Path(id) = id.map_err(map_path_rejection)?;
    Ok(Json(state.teachers.courses(&session.tenant(), id).await?))
}

async fn unassign(
    State(state): State<SharedState>,
    session: CurrentSession,
    ids: Result<Path<(i64, i64)>, PathRejection>,
) -> Result<Json<Value>, CampusAxumError> {
    let Path((id, course_id)) = ids.map_err(map_path_rejection)?;
    state
        .teachers
        .unassign_course(session.claim(), id, course_id)
        .await?;
    Ok(message("Course removed"))
}

async fn courses_with_count(
    State(state): State<SharedState>,
    session: CurrentSession,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Vec<CourseWithCount>>, CampusAxumError> {
    let Path(id) = id.map_err(map_path_rejection)?;
    Ok(Json(state.teachers.courses_with_count(&session.tenant(), id).await?))
}

async fn students(
    State(state): State<SharedState>,
    session: CurrentSession,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Vec<EnrolledStudent>>, CampusAxumError> {
    let Path(id) = id.map_err(map_path_rejection)?;
    Ok(Json(state.teachers.students(&session.tenant(), id).await?))
}

async fn students_in_school(
    State(state): State<SharedState>,
    session: CurrentSession,
    params: Result<Path<(String, i64)>, PathRejection>,
) -> Result<Json<Vec<EnrolledStudent>>, CampusAxumError> {
    let Path((slug, id)) = params.map_err(map_path_rejection)?;
    ensure_slug(session.claim(), &slug)?;
    Ok(Json(state.teachers.students(&session.tenant(), id).await?))
}
