// Authentication service.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use campus_core::{bounded, Role, StoreError, TenantDirectory, TenantId};
use http::HeaderValue;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::claims::SessionClaim;
use crate::cookie::{expired_session_cookie, session_cookie};
use crate::core::SessionCodec;
use crate::error::{AuthError, AuthResult};
use crate::options::AuthOptions;
use crate::strategy::AuthenticationStrategy;

pub const DEFAULT_STORAGE_TIMEOUT: Duration = Duration::from_secs(5);

/// A successful login: the claim and its signed token.
#[derive(Debug, Clone)]
pub struct Session {
    pub claim: SessionClaim,
    pub token: String,
}

/// Session introspection result: claim fields plus tenant branding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionInfo {
    pub id: i64,
    pub role: Role,
    pub fullname: String,
    pub department: String,
    pub slug: String,
    pub school_id: i64,
    pub school_name: String,
    pub school_type: String,
    pub logo_url: Option<String>,
    pub background_url: Option<String>,
    pub theme: Option<String>,
    pub logo_text: Option<String>,
    pub background_color: Option<String>,
    pub expires_at: i64,
}

/// Prefix a stored asset path with the public base URL. Absolute URLs pass through.
pub fn asset_url(base_url: &str, path: Option<&str>) -> Option<String> {
    let path = path?.trim();
    if path.is_empty() {
        return None;
    }
    if path.starts_with("http://") || path.starts_with("https://") || base_url.is_empty() {
        return Some(path.to_string());
    }
    Some(format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    ))
}

struct AuthenticationBase {
    codec: SessionCodec,
    options: AuthOptions,
    tenants: Arc<dyn TenantDirectory>,
    strategies: HashMap<String, Arc<dyn AuthenticationStrategy>>,
    storage_timeout: Duration,
}

/// Login, session verification, introspection and logout.
#[derive(Clone)]
pub struct AuthenticationService {
    inner: Arc<AuthenticationBase>,
}

pub struct AuthenticationServiceBuilder {
    codec: SessionCodec,
    options: AuthOptions,
    tenants: Arc<dyn TenantDirectory>,
    strategies: HashMap<String, Arc<dyn AuthenticationStrategy>>,
    storage_timeout: Duration,
}

impl AuthenticationServiceBuilder {
    pub fn options(mut self, options: AuthOptions) -> Self {
        self.options = options;
        self
    }

    pub fn strategy(mut self, strategy: Arc<dyn AuthenticationStrategy>) -> Self {
        self.strategies.insert(strategy.name().to_string(), strategy);
        self
    }

    pub fn storage_timeout(mut self, timeout: Duration) -> Self {
        self.storage_timeout = timeout;
        self
    }

    pub fn build(self) -> anyhow::Result<AuthenticationService> {
        self.options
            .validate()
            .map_err(|e| anyhow::anyhow!("invalid authentication options: {e}"))?;
        if self.options.jwt != *self.codec.options() {
            anyhow::bail!("session codec and authentication options disagree on token settings");
        }
        Ok(AuthenticationService {
            inner: Arc::new(AuthenticationBase {
                codec: self.codec,
                options: self.options,
                tenants: self.tenants,
                strategies: self.strategies,
                storage_timeout: self.storage_timeout,
            }),
        })
    }
}

impl AuthenticationService {
    pub fn builder(codec: SessionCodec, tenants: Arc<dyn TenantDirectory>) -> AuthenticationServiceBuilder {
        let options = AuthOptions {
            jwt: codec.options().clone(),
            ..AuthOptions::default()
        };
        AuthenticationServiceBuilder {
            codec,
            options,
            tenants,
            strategies: HashMap::new(),
            storage_timeout: DEFAULT_STORAGE_TIMEOUT,
        }
    }

    pub fn codec(&self) -> &SessionCodec {
        &self.inner.codec
    }

    pub fn options(&self) -> &AuthOptions {
        &self.inner.options
    }

    pub fn cookie_name(&self) -> &str {
        &self.inner.options.cookie.name
    }

    pub fn strategy_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.strategies.keys().cloned().collect();
        names.sort();
        names
    }

    /// Run `strategy` against `payload` and issue a session for the result.
    pub async fn login(&self, strategy: &str, payload: &Value) -> AuthResult<Session> {
        let strat = self
            .inner
            .strategies
            .get(strategy)
            .ok_or_else(|| AuthError::Internal(format!("authentication strategy '{strategy}' is not registered")))?;

        let principal = match strat.authenticate(payload).await {
            Ok(principal) => principal,
            Err(err) => {
                warn!(strategy, reason = err.reason(), "login rejected");
                return Err(err);
            }
        };

        let claim = SessionClaim::issue(principal, self.inner.codec.ttl());
        let token = self.inner.codec.encode(&claim)?;
        info!(
            strategy,
            principal_id = claim.principal_id,
            tenant_id = claim.tenant_id,
            role = %claim.role,
            "login succeeded"
        );
        Ok(Session { claim, token })
    }

    /// Decode the session carried by a request.
    pub fn verify(&self, token: Option<&str>) -> AuthResult<SessionClaim> {
        match token {
            None => Err(AuthError::NoSession),
            Some(t) if t.trim().is_empty() => Err(AuthError::NoSession),
            Some(t) => self.inner.codec.decode(t.trim()),
        }
    }

    /// Claim plus the branding of the claim's tenant.
    pub async fn introspect(&self, token: Option<&str>) -> AuthResult<SessionInfo> {
        let claim = self.verify(token)?;
        let tenant = bounded(
            self.inner.storage_timeout,
            self.inner.tenants.get_tenant(TenantId(claim.tenant_id)),
        )
        .await
        .map_err(|e| match e {
            StoreError::NotFound(_) => AuthError::InvalidSession,
            other => AuthError::Storage(other),
        })?;

        if tenant.slug != claim.slug {
            warn!(tenant_id = claim.tenant_id, "session slug does not match its tenant");
            return Err(AuthError::InvalidSession);
        }

        let base = &self.inner.options.asset_base_url;
        Ok(SessionInfo {
            id: claim.principal_id,
            role: claim.role,
            fullname: claim.fullname,
            department: claim.department,
            slug: claim.slug,
            school_id: claim.tenant_id,
            school_name: tenant.name,
            school_type: tenant.kind,
            logo_url: asset_url(base, tenant.branding.logo_url.as_deref()),
            background_url: asset_url(base, tenant.branding.background_url.as_deref()),
            theme: tenant.branding.theme,
            logo_text: tenant.branding.logo_text,
            background_color: tenant.branding.background_color,
            expires_at: claim.expires_at,
        })
    }

    /// `Set-Cookie` value for a fresh session; lives exactly as long as the token.
    pub fn session_cookie(&self, session: &Session) -> AuthResult<HeaderValue> {
        session_cookie(
            &self.inner.options.cookie,
            &session.token,
            self.inner.options.cookie_max_age(),
        )
    }

    /// `Set-Cookie` value for logout.
    pub fn logout_cookie(&self) -> AuthResult<HeaderValue> {
        expired_session_cookie(&self.inner.options.cookie)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_urls_are_prefixed() {
        let base = "https://cdn.campus.test/";
        assert_eq!(
            asset_url(base, Some("/uploads/logo.png")),
            Some("https://cdn.campus.test/uploads/logo.png".to_string())
        );
        assert_eq!(
            asset_url(base, Some("uploads/bg.jpg")),
            Some("https://cdn.campus.test/uploads/bg.jpg".to_string())
        );
        assert_eq!(
            asset_url(base, Some("https://elsewhere.test/a.png")),
            Some("https://elsewhere.test/a.png".to_string())
        );
        assert_eq!(asset_url(base, Some("  ")), None);
        assert_eq!(asset_url(base, None), None);
    }
}
