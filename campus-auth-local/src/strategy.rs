// Password login strategies.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use campus_auth::{AuthError, AuthResult, AuthenticatedPrincipal, AuthenticationStrategy};
use campus_core::{bounded, PrincipalStore, Role, TenantContext};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use validator::Validate;

use crate::credentials::CredentialStore;
use crate::payload::decode_payload;

pub const ADMIN_DEPARTMENT: &str = "Administration";

#[derive(Debug, Deserialize, Validate)]
struct LoginRequest {
    #[validate(length(min = 1, message = "username is required"))]
    username: String,
    #[validate(length(min = 1, message = "password is required"))]
    password: String,
    role: String,
    #[validate(length(min = 1, message = "slug is required"))]
    slug: String,
}

#[derive(Debug, Deserialize, Validate)]
struct AdminLoginRequest {
    #[validate(email(message = "email must be valid"))]
    email: String,
    #[validate(length(min = 1, message = "password is required"))]
    password: String,
    #[serde(default)]
    slug: Option<String>,
}

/// Student and teacher login: `{username, password, role, slug}`.
///
/// Usernames are unique per school only, so the lookup returns every
/// candidate and the caller's slug picks the one that belongs to it. The slug
/// is compared before the password is looked at; every rejection pays for
/// one bcrypt round.
pub struct LocalStrategy {
    principals: Arc<dyn PrincipalStore>,
    credentials: CredentialStore,
    storage_timeout: Duration,
}

impl LocalStrategy {
    pub fn new(principals: Arc<dyn PrincipalStore>, credentials: CredentialStore) -> Self {
        Self {
            principals,
            credentials,
            storage_timeout: Duration::from_secs(5),
        }
    }

    pub fn with_storage_timeout(mut self, timeout: Duration) -> Self {
        self.storage_timeout = timeout;
        self
    }
}

#[async_trait]
impl AuthenticationStrategy for LocalStrategy {
    fn name(&self) -> &str {
        "local"
    }

    async fn authenticate(&self, payload: &Value) -> AuthResult<AuthenticatedPrincipal> {
        let req: LoginRequest = decode_payload(payload)?;
        let role = match req.role.parse::<Role>() {
            Ok(role @ (Role::Student | Role::Teacher)) => role,
            _ => return Err(AuthError::UnsupportedRole(req.role)),
        };

        let candidates = bounded(
            self.storage_timeout,
            self.principals.find_by_username(role, &req.username),
        )
        .await?;
        if candidates.is_empty() {
            self.credentials.verify_without_digest(&req.password).await;
            return Err(AuthError::PrincipalNotFound);
        }

        let Some(record) = candidates.into_iter().find(|r| r.tenant_slug == req.slug) else {
            debug!(slug = %req.slug, "username exists only under other schools");
            self.credentials.verify_without_digest(&req.password).await;
            return Err(AuthError::TenantMismatch);
        };

        if !self.credentials.verify(&req.password, &record.password_hash).await {
            return Err(AuthError::BadCredential);
        }

        Ok(AuthenticatedPrincipal {
            principal_id: record.id,
            tenant: TenantContext::new(record.tenant_id.0, record.tenant_slug),
            role,
            fullname: record.fullname,
            department: record.department,
        })
    }
}

/// School administrator login: `{email, password, slug?}`.
pub struct AdminStrategy {
    principals: Arc<dyn PrincipalStore>,
    credentials: CredentialStore,
    storage_timeout: Duration,
}

impl AdminStrategy {
    pub fn new(principals: Arc<dyn PrincipalStore>, credentials: CredentialStore) -> Self {
        Self {
            principals,
            credentials,
            storage_timeout: Duration::from_secs(5),
        }
    }

    pub fn with_storage_timeout(mut self, timeout: Duration) -> Self {
        self.storage_timeout = timeout;
        self
    }
}

#[async_trait]
impl AuthenticationStrategy for AdminStrategy {
    fn name(&self) -> &str {
        "admin"
    }

    async fn authenticate(&self, payload: &Value) -> AuthResult<AuthenticatedPrincipal> {
        let req: AdminLoginRequest = decode_payload(payload)?;

        let found = bounded(
            self.storage_timeout,
            self.principals.find_admin_by_email(&req.email),
        )
        .await?;
        let Some((admin, slug)) = found else {
            self.credentials.verify_without_digest(&req.password).await;
            return Err(AuthError::PrincipalNotFound);
        };

        if let Some(wanted) = req.slug.as_deref().filter(|s| !s.trim().is_empty()) {
            if wanted != slug {
                self.credentials.verify_without_digest(&req.password).await;
                return Err(AuthError::TenantMismatch);
            }
        }

        if !self.credentials.verify(&req.password, &admin.password_hash).await {
            return Err(AuthError::BadCredential);
        }

        Ok(AuthenticatedPrincipal {
            principal_id: admin.id,
            tenant: TenantContext::new(admin.tenant_id.0, slug),
            role: Role::Admin,
            fullname: admin.fullname,
            department: ADMIN_DEPARTMENT.to_string(),
        })
    }
}
