pub mod students_service;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use campus_axum::rest::{map_json_rejection, map_path_rejection};
use campus_axum::{CampusAxumError, CurrentSession};
use campus_core::models::Course;

pub use students_service::StudentsService;

use crate::services::schedules::ScheduleView;
use crate::services::teachers::{AssignmentOutcome, CourseSelection};
use crate::services::SharedState;

pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/student/{id}/courses", get(courses).post(assign))
        .route("/student/{id}/department-courses", get(department_courses))
        .route("/student/{id}/classes", get(classes))
}

async fn assign(
    State(state): State<SharedState>,
    session: CurrentSession,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<CourseSelection>, JsonRejection>,
) -> Result<Json<AssignmentOutcome>, CampusAxumError> {
    let Path(id) = id.map_err(map_path_rejection)?;
    let Json(body) = body.map_err(map_json_rejection)?;
    Ok(Json(state.students.assign_courses(session.claim(), id, body).await?))
}

async fn courses(
    State(state): State<SharedState>,
    session: CurrentSession,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Vec<Course>>, CampusAxumError> {
    let Path(id) = id.map_err(map_path_rejection)?;
    Ok(Json(state.students.courses(&session.tenant(), id).await?))
}

async fn department_courses(
    State(state): State<SharedState>,
    session: CurrentSession,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Vec<Course>>, CampusAxumError> {
    let Path(id) = id.map_err(map_path_rejection)?;
    Ok(Json(
        state
            .students
            .department_courses(&session.tenant(), id)
            .await?,
    ))
}

async fn classes(
    State(state): State<SharedState>,
    session: CurrentSession,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Vec<ScheduleView>>, CampusAxumError> {
    let Path(id) = id.map_err(map_path_rejection)?;
    Ok(Json(state.schedules.student_classes(&session.tenant(), id).await?))
}
