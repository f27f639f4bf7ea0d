use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use campus_auth::AuthError;
use campus_core::{CampusError, StoreError};
use tracing::{error, warn};

#[derive(Debug)]
pub struct CampusAxumError(pub anyhow::Error);

impl From<anyhow::Error> for CampusAxumError {
    fn from(e: anyhow::Error) -> Self {
        Self(e)
    }
}

impl From<CampusError> for CampusAxumError {
    fn from(e: CampusError) -> Self {
        Self(e.into_anyhow())
    }
}

impl From<AuthError> for CampusAxumError {
    fn from(e: AuthError) -> Self {
        CampusError::from(e).into()
    }
}

impl From<StoreError> for CampusAxumError {
    fn from(e: StoreError) -> Self {
        CampusError::from(e).into()
    }
}

impl IntoResponse for CampusAxumError {
    fn into_response(self) -> Response {
        let campus = CampusError::normalize(self.0);
        if campus.kind.is_server_error() {
            match &campus.source {
                Some(source) => error!(code = campus.code(), message = %campus.message, source = ?source, "request failed"),
                None => error!(code = campus.code(), message = %campus.message, "request failed"),
            }
        } else if campus.code() == 403 {
            warn!(message = %campus.message, "request forbidden");
        }

        let safe = campus.sanitize_for_client();
        let status = StatusCode::from_u16(safe.code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(safe.to_json())).into_response()
    }
}
