// Session extraction for handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use campus_auth::{extract_session_token, AuthenticationService, SessionClaim};
use campus_core::TenantContext;

use crate::CampusAxumError;

/// Router state that can verify sessions.
pub trait SessionState: Send + Sync {
    fn authentication(&self) -> &AuthenticationService;
}

impl<T: SessionState> SessionState for std::sync::Arc<T> {
    fn authentication(&self) -> &AuthenticationService {
        (**self).authentication()
    }
}

/// The verified session of the caller.
///
/// Read from the session cookie, or from an `Authorization: Bearer` header
/// when no cookie is present. Rejects with 401 otherwise.
#[derive(Debug, Clone)]
pub struct CurrentSession(pub SessionClaim);

impl CurrentSession {
    pub fn claim(&self) -> &SessionClaim {
        &self.0
    }

    /// Tenant scope for every store call made on behalf of this session.
    pub fn tenant(&self) -> TenantContext {
        self.0.tenant()
    }
}

impl<S> FromRequestParts<S> for CurrentSession
where
    S: SessionState,
{
    type Rejection = CampusAxumError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth = state.authentication();
        let token = extract_session_token(&parts.headers, auth.cookie_name());
        let claim = auth.verify(token.as_deref())?;
        Ok(CurrentSession(claim))
    }
}
