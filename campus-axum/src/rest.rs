use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::{header::SET_COOKIE, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use campus_core::CampusError;
use serde_json::{json, Value};

use crate::CampusAxumError;

pub fn map_json_rejection(rejection: JsonRejection) -> CampusAxumError {
    CampusError::bad_request("Failed to parse the request body as JSON")
        .with_errors(json!({"_schema": [rejection.body_text()]}))
        .into()
}

pub fn map_path_rejection(rejection: PathRejection) -> CampusAxumError {
    CampusError::bad_request("Invalid path parameter")
        .with_errors(json!({"_path": [rejection.body_text()]}))
        .into()
}

/// `{"message": ...}`
pub fn message(text: impl Into<String>) -> Json<Value> {
    Json(json!({ "message": text.into() }))
}

/// Attach a `Set-Cookie` header to any response.
pub fn with_cookie(cookie: HeaderValue, body: impl IntoResponse) -> Response {
    ([(SET_COOKIE, cookie)], body).into_response()
}
