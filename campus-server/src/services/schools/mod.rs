pub mod schools_service;
pub mod schools_shared;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use campus_axum::rest::{map_json_rejection, map_path_rejection};
use campus_axum::{CampusAxumError, CurrentSession};
use campus_core::BrandingUpdate;
use serde_json::{json, Value};

pub use schools_service::SchoolsService;
pub use schools_shared::SchoolProfile;

use crate::services::SharedState;

pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/schools/{slug}", get(profile))
        .route("/schools/{slug}/setup", post(setup))
}

async fn profile(
    State(state): State<SharedState>,
    slug: Result<Path<String>, PathRejection>,
) -> Result<Json<SchoolProfile>, CampusAxumError> {
    let Path(slug) = slug.map_err(map_path_rejection)?;
    Ok(Json(state.schools.profile(&slug).await?))
}

async fn setup(
    State(state): State<SharedState>,
    session: CurrentSession,
    slug: Result<Path<String>, PathRejection>,
    body: Result<Json<BrandingUpdate>, JsonRejection>,
) -> Result<Json<Value>, CampusAxumError> {
    let Path(slug) = slug.map_err(map_path_rejection)?;
    let Json(update) = body.map_err(map_json_rejection)?;
    let school = state.schools.update_branding(session.claim(), &slug, update).await?;
    Ok(Json(json!({
        "message": "School settings updated",
        "school": school,
    })))
}
