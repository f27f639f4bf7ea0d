pub mod courses_service;
pub mod courses_shared;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use campus_axum::rest::{map_json_rejection, map_path_rejection};
use campus_axum::{CampusAxumError, CurrentSession};
use campus_core::models::Course;

pub use courses_service::CoursesService;
pub use courses_shared::CreateCourse;

use crate::services::SharedState;

pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/courses", get(list).post(create))
        .route("/courses/department/{department}", get(by_department))
}

async fn list(
    State(state): State<SharedState>,
    session: CurrentSession,
) -> Result<Json<Vec<Course>>, CampusAxumError> {
    Ok(Json(state.courses.list(&session.tenant()).await?))
}

async fn create(
    State(state): State<SharedState>,
    session: CurrentSession,
    body: Result<Json<CreateCourse>, JsonRejection>,
) -> Result<(StatusCode, Json<Course>), CampusAxumError> {
    let Json(body) = body.map_err(map_json_rejection)?;
    let course = state.courses.create(session.claim(), body).await?;
    Ok((StatusCode::CREATED, Json(course)))
}

async fn by_department(
    State(state): State<SharedState>,
    session: CurrentSession,
    department: Result<Path<String>, PathRejection>,
) -> Result<Json<Vec<Course>>, CampusAxumError> {
    let Path(department) = department.map_err(map_path_rejection)?;
    Ok(Json(
        state
            .courses
            .by_department(&session.tenant(), &department)
            .await?,
    ))
}
