pub mod authentication;
pub mod cats;
pub mod courses;
pub mod rosters;
pub mod schedules;
pub mod schools;
pub mod students;
pub mod teachers;
pub mod types;

use axum::Router;
use campus_auth_local::payload::field_errors;
use campus_core::CampusError;
use validator::ValidationErrors;

pub use types::{CampusState, SharedState, StoreHandle};

/// Every API route, still waiting for its state.
pub fn routes() -> Router<SharedState> {
    Router::new()
        .merge(authentication::routes())
        .merge(schools::routes())
        .merge(courses::routes())
        .merge(teachers::routes())
        .merge(students::routes())
        .merge(schedules::routes())
        .merge(cats::routes())
        .merge(rosters::routes())
}

/// 400 carrying the per-field messages.
pub fn validation_error(errors: ValidationErrors) -> anyhow::Error {
    CampusError::bad_request("Validation failed")
        .with_errors(field_errors(&errors))
        .into_anyhow()
}
