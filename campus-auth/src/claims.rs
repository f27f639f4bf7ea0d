// Session claim carried by every session token.

use std::time::Duration;

use campus_core::{Role, TenantContext};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Identity + tenant + role of an authenticated principal.
///
/// Every field is required when decoding; integers stay integers on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaim {
    #[serde(rename = "id")]
    pub principal_id: i64,
    #[serde(rename = "school_id")]
    pub tenant_id: i64,
    pub role: Role,
    pub fullname: String,
    pub department: String,
    pub slug: String,
    /// Absolute expiry, seconds since the epoch.
    #[serde(rename = "exp")]
    pub expires_at: i64,
}

/// What a strategy proves about a principal; turned into a claim by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedPrincipal {
    pub principal_id: i64,
    pub tenant: TenantContext,
    pub role: Role,
    pub fullname: String,
    pub department: String,
}

impl SessionClaim {
    /// Claim for `principal` expiring `ttl` from now.
    pub fn issue(principal: AuthenticatedPrincipal, ttl: Duration) -> Self {
        let ttl = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        Self {
            principal_id: principal.principal_id,
            tenant_id: principal.tenant.id(),
            role: principal.role,
            fullname: principal.fullname,
            department: principal.department,
            slug: principal.tenant.slug,
            expires_at: Utc::now().timestamp().saturating_add(ttl),
        }
    }

    /// Tenant scope for every query made on behalf of this session.
    pub fn tenant(&self) -> TenantContext {
        TenantContext::new(self.tenant_id, self.slug.clone())
    }

    pub fn is_expired_at(&self, unix_seconds: i64) -> bool {
        self.expires_at < unix_seconds
    }

    /// Admins act for anyone in their tenant; other principals only for themselves.
    pub fn may_act_for(&self, role: Role, principal_id: i64) -> bool {
        self.role == Role::Admin || (self.role == role && self.principal_id == principal_id)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn teacher() -> AuthenticatedPrincipal {
        AuthenticatedPrincipal {
            principal_id: 5,
            tenant: TenantContext::new(3, "oak-school-3"),
            role: Role::Teacher,
            fullname: "Alice".into(),
            department: "Science".into(),
        }
    }

    #[test]
    fn issue_binds_tenant_and_expiry() {
        let before = Utc::now().timestamp();
        let claim = SessionClaim::issue(teacher(), Duration::from_secs(60));
        assert_eq!(claim.tenant_id, 3);
        assert_eq!(claim.tenant(), TenantContext::new(3, "oak-school-3"));
        assert!(claim.expires_at >= before + 60);
        assert!(!claim.is_expired_at(before));
        assert!(claim.is_expired_at(claim.expires_at + 1));
    }

    #[test]
    fn wire_names() {
        let claim = SessionClaim::issue(teacher(), Duration::from_secs(60));
        let json = serde_json::to_value(&claim).unwrap();
        assert_eq!(json["id"], 5);
        assert_eq!(json["school_id"], 3);
        assert_eq!(json["role"], "teacher");
        assert!(json["exp"].is_i64());
    }

    #[test]
    fn acting_rights() {
        let claim = SessionClaim::issue(teacher(), Duration::from_secs(60));
        assert!(claim.may_act_for(Role::Teacher, 5));
        assert!(!claim.may_act_for(Role::Teacher, 6));
        assert!(!claim.may_act_for(Role::Student, 5));

        let admin = SessionClaim {
            role: Role::Admin,
            ..claim
        };
        assert!(admin.may_act_for(Role::Student, 42));
    }
}
