use campus_auth::SessionClaim;
use campus_core::Role;
use serde::Serialize;

/// Body returned by both login routes next to the session cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub id: i64,
    pub role: Role,
    pub fullname: String,
    pub department: String,
    pub slug: String,
}

impl From<&SessionClaim> for LoginResponse {
    fn from(claim: &SessionClaim) -> Self {
        Self {
            message: "Login successful",
            id: claim.principal_id,
            role: claim.role,
            fullname: claim.fullname.clone(),
            department: claim.department.clone(),
            slug: claim.slug.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub id: i64,
    pub role: Role,
    pub slug: String,
}
