pub mod cats_service;
pub mod cats_shared;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use campus_axum::rest::{map_json_rejection, map_path_rejection};
use campus_axum::{CampusAxumError, CurrentSession};
use serde_json::{json, Value};

pub use cats_service::CatsService;
pub use cats_shared::{CatView, CreateCat, RescheduleCat};

use crate::services::SharedState;

pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/cats", post(create))
        .route("/cats/{id}", put(reschedule).delete(remove))
        .route("/cats/teacher/{id}", get(for_teacher))
        .route("/cats/student/{id}", get(for_student))
}

async fn create(
    State(state): State<SharedState>,
    session: CurrentSession,
    body: Result<Json<CreateCat>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), CampusAxumError> {
    let Json(body) = body.map_err(map_json_rejection)?;
    let (cat, created) = state.cats.create(session.claim(), body).await?;
    let (status, message) = if created {
        (StatusCode::CREATED, "CAT scheduled")
    } else {
        (StatusCode::OK, "CAT already scheduled")
    };
    Ok((status, Json(json!({"message": message, "cat": cat}))))
}

async fn reschedule(
    State(state): State<SharedState>,
    session: CurrentSession,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<RescheduleCat>, JsonRejection>,
) -> Result<Json<Value>, CampusAxumError> {
    let Path(id) = id.map_err(map_path_rejection)?;
    let Json(body) = body.map_err(map_json_rejection)?;
    let cat = state
        .cats
        .reschedule(session.claim(), id, body.new_datetime)
        .await?;
    Ok(Json(json!({"message": "CAT rescheduled", "cat": cat})))
}

async fn remove(
    State(state): State<SharedState>,
    session: CurrentSession,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Value>, CampusAxumError> {
    let Path(id) = id.map_err(map_path_rejection)?;
    let cat = state.cats.delete(session.claim(), id).await?;
    Ok(Json(json!({"message": "CAT deleted", "id": cat.id})))
}

async fn for_teacher(
    State(state): State<SharedState>,
    session: CurrentSession,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Vec<CatView>>, CampusAxumError> {
    let Path(id) = id.map_err(map_path_rejection)?;
    Ok(Json(state.cats.for_teacher(&session.tenant(), id).await?))
}

async fn for_student(
    State(state): State<SharedState>,
    session: CurrentSession,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Vec<CatView>>, CampusAxumError> {
    let Path(id) = id.map_err(map_path_rejection)?;
    Ok(Json(state.cats.for_student(&session.tenant(), id).await?))
}
