pub mod authentication_shared;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};
use campus_auth::{extract_session_token, SessionInfo};
use campus_axum::rest::{map_json_rejection, message, with_cookie};
use campus_axum::CampusAxumError;
use serde_json::{json, Value};

pub use authentication_shared::{LoginResponse, RegisterResponse};

use crate::services::schools::SchoolProfile;
use crate::services::SharedState;

/// Strategy names registered with the authentication service.
pub const LOCAL_STRATEGY: &str = "local";
pub const ADMIN_STRATEGY: &str = "admin";

pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/schoolregistration", post(register_school))
        .route("/schoollogin", post(school_login))
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me))
        .route("/logout", get(logout).post(logout))
}

async fn register_school(
    State(state): State<SharedState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), CampusAxumError> {
    let Json(body) = body.map_err(map_json_rejection)?;
    let (tenant, admin) = state.registrar.register_school(&body).await?;
    let school = SchoolProfile::from_tenant(tenant, &state.schools.asset_base_url);
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "School registered successfully",
            "school": school,
            "admin": {"id": admin.id, "email": admin.email},
        })),
    ))
}

async fn register(
    State(state): State<SharedState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>), CampusAxumError> {
    let Json(body) = body.map_err(map_json_rejection)?;
    let registered = state.registrar.register(&body).await?;
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: format!("{} registered successfully", capitalize(registered.role.as_str())),
            id: registered.id,
            role: registered.role,
            slug: registered.tenant.slug,
        }),
    ))
}

async fn login(
    State(state): State<SharedState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, CampusAxumError> {
    start_session(&state, LOCAL_STRATEGY, body).await
}

async fn school_login(
    State(state): State<SharedState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, CampusAxumError> {
    start_session(&state, ADMIN_STRATEGY, body).await
}

async fn start_session(
    state: &SharedState,
    strategy: &str,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, CampusAxumError> {
    let Json(body) = body.map_err(map_json_rejection)?;
    let session = state.auth.login(strategy, &body).await?;
    let cookie = state.auth.session_cookie(&session)?;
    Ok(with_cookie(cookie, Json(LoginResponse::from(&session.claim))))
}

async fn me(State(state): State<SharedState>, headers: HeaderMap) -> Result<Json<SessionInfo>, CampusAxumError> {
    let token = extract_session_token(&headers, state.auth.cookie_name());
    Ok(Json(state.auth.introspect(token.as_deref()).await?))
}

async fn logout(State(state): State<SharedState>) -> Result<Response, CampusAxumError> {
    let cookie = state.auth.logout_cookie()?;
    Ok(with_cookie(cookie, message("Logged out")))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
