pub mod rosters_service;
pub mod rosters_shared;

use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use campus_axum::rest::map_path_rejection;
use campus_axum::{CampusAxumError, CurrentSession};

pub use rosters_service::RostersService;
pub use rosters_shared::{group_students, group_teachers, RosterCourse, StudentRoster, TeacherRoster};

use crate::services::types::ensure_slug;
use crate::services::SharedState;

pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/teachers/detailed", get(teachers))
        .route("/{slug}/teachers/detailed", get(teachers_in_school))
        .route("/students/detailed", get(students))
        .route("/{slug}/students/detailed", get(students_in_school))
}

async fn teachers(
    State(state): State<SharedState>,
    session: CurrentSession,
) -> Result<Json<Vec<TeacherRoster>>, CampusAxumError> {
    Ok(Json(state.rosters.teachers(&session.tenant()).await?))
}

async fn teachers_in_school(
    State(state): State<SharedState>,
    session: CurrentSession,
    slug: Result<Path<String>, PathRejection>,
) -> Result<Json<Vec<TeacherRoster>>, CampusAxumError> {
    let Path(slug) = slug.map_err(map_path_rejection)?;
    ensure_slug(session.claim(), &slug)?;
    Ok(Json(state.rosters.teachers(&session.tenant()).await?))
}

async fn students(
    State(state): State<SharedState>,
    session: CurrentSession,
) -> Result<Json<Vec<StudentRoster>>, CampusAxumError> {
    Ok(Json(state.rosters.students(&session.tenant()).await?))
}

async fn students_in_school(
    State(state): State<SharedState>,
    session: CurrentSession,
    slug: Result<Path<String>, PathRejection>,
) -> Result<Json<Vec<StudentRoster>>, CampusAxumError> {
    let Path(slug) = slug.map_err(map_path_rejection)?;
    ensure_slug(session.claim(), &slug)?;
    Ok(Json(state.rosters.students(&session.tenant()).await?))
}
