// Authentication errors.

use campus_core::{CampusError, StoreError};
use serde_json::Value;
use thiserror::Error;

/// Message shared by every credential-related rejection, so callers cannot
/// tell an unknown school from an unknown user or a wrong password.
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("malformed input: {message}")]
    MalformedInput {
        message: String,
        fields: Option<Value>,
    },

    #[error("unsupported role: {0}")]
    UnsupportedRole(String),

    #[error("unknown tenant: {0}")]
    UnknownTenant(String),

    #[error("principal not found")]
    PrincipalNotFound,

    #[error("principal belongs to another tenant")]
    TenantMismatch,

    #[error("bad credential")]
    BadCredential,

    #[error("no session")]
    NoSession,

    #[error("invalid session")]
    InvalidSession,

    #[error("{0} already exists")]
    Conflict(String),

    #[error("storage failure: {0}")]
    Storage(#[source] StoreError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn malformed(message: impl Into<String>) -> Self {
        AuthError::MalformedInput {
            message: message.into(),
            fields: None,
        }
    }

    /// Short machine-readable reason for server-side logs.
    pub fn reason(&self) -> &'static str {
        match self {
            AuthError::MalformedInput { .. } => "malformed_input",
            AuthError::UnsupportedRole(_) => "unsupported_role",
            AuthError::UnknownTenant(_) => "unknown_tenant",
            AuthError::PrincipalNotFound => "principal_not_found",
            AuthError::TenantMismatch => "tenant_mismatch",
            AuthError::BadCredential => "bad_credential",
            AuthError::NoSession => "no_session",
            AuthError::InvalidSession => "invalid_session",
            AuthError::Conflict(_) => "conflict",
            AuthError::Storage(_) => "storage",
            AuthError::Internal(_) => "internal",
        }
    }

    /// Credential-related rejection, answered with [`INVALID_CREDENTIALS`].
    pub fn is_credential_rejection(&self) -> bool {
        matches!(
            self,
            AuthError::UnknownTenant(_)
                | AuthError::PrincipalNotFound
                | AuthError::TenantMismatch
                | AuthError::BadCredential
        )
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(what) => AuthError::Conflict(what),
            other => AuthError::Storage(other),
        }
    }
}

impl From<AuthError> for CampusError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MalformedInput { message, fields } => {
                let e = CampusError::bad_request(message);
                match fields {
                    Some(fields) => e.with_errors(fields),
                    None => e,
                }
            }
            AuthError::UnsupportedRole(role) => {
                CampusError::bad_request(format!("Unsupported role '{role}'"))
            }
            AuthError::NoSession => CampusError::not_authenticated("Not logged in"),
            AuthError::InvalidSession => CampusError::not_authenticated("Invalid or expired session"),
            AuthError::Conflict(what) => CampusError::conflict(format!("{what} already exists")),
            AuthError::Storage(store) => CampusError::from(store),
            AuthError::Internal(message) => CampusError::general_error(message),
            AuthError::UnknownTenant(_)
            | AuthError::PrincipalNotFound
            | AuthError::TenantMismatch
            | AuthError::BadCredential => CampusError::not_authenticated(INVALID_CREDENTIALS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_rejections_share_one_message() {
        let errors = [
            AuthError::UnknownTenant("nope-1".into()),
            AuthError::PrincipalNotFound,
            AuthError::TenantMismatch,
            AuthError::BadCredential,
        ];
        for err in errors {
            let campus = CampusError::from(err);
            assert_eq!(campus.code(), 401);
            assert_eq!(campus.message, INVALID_CREDENTIALS);
        }
    }

    #[test]
    fn status_mapping() {
        assert_eq!(CampusError::from(AuthError::UnsupportedRole("janitor".into())).code(), 400);
        assert_eq!(CampusError::from(AuthError::malformed("bad json")).code(), 400);
        assert_eq!(CampusError::from(AuthError::NoSession).code(), 401);
        assert_eq!(CampusError::from(AuthError::InvalidSession).code(), 401);
        assert_eq!(CampusError::from(AuthError::from(StoreError::Conflict("Username".into()))).code(), 409);
        assert_eq!(
            CampusError::from(AuthError::from(StoreError::Backend("disk full".into()))).code(),
            500
        );
    }
}
