pub mod schedules_service;
pub mod schedules_shared;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use campus_axum::rest::{map_json_rejection, map_path_rejection};
use campus_axum::{CampusAxumError, CurrentSession};

pub use schedules_service::{parse_entry, SchedulesService};
pub use schedules_shared::{timetable_order, AddScheduleEntry, ScheduleView};

use crate::services::SharedState;

pub fn routes() -> Router<SharedState> {
    Router::new().route("/teacher/{id}/schedule", get(teacher_schedule).post(add_entry))
}

async fn add_entry(
    State(state): State<SharedState>,
    session: CurrentSession,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<AddScheduleEntry>, JsonRejection>,
) -> Result<(StatusCode, Json<ScheduleView>), CampusAxumError> {
    let Path(id) = id.map_err(map_path_rejection)?;
    let Json(body) = body.map_err(map_json_rejection)?;
    let entry = state.schedules.add_entry(session.claim(), id, body).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

async fn teacher_schedule(
    State(state): State<SharedState>,
    session: CurrentSession,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Vec<ScheduleView>>, CampusAxumError> {
    let Path(id) = id.map_err(map_path_rejection)?;
    Ok(Json(state.schedules.teacher_schedule(&session.tenant(), id).await?))
}
