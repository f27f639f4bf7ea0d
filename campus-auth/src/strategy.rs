// Authentication strategies.

use async_trait::async_trait;
use serde_json::Value;

use crate::claims::AuthenticatedPrincipal;
use crate::error::AuthResult;

/// Proves who a login request belongs to.
///
/// A strategy decodes its own request body, checks the principal's tenant
/// against the slug the caller supplied and verifies the secret. It never
/// issues tokens; the [`AuthenticationService`](crate::AuthenticationService) does.
#[async_trait]
pub trait AuthenticationStrategy: Send + Sync {
    fn name(&self) -> &str;

    async fn authenticate(&self, payload: &Value) -> AuthResult<AuthenticatedPrincipal>;
}
