// Session token codec.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::claims::SessionClaim;
use crate::error::{AuthError, AuthResult};
use crate::options::JwtOptions;

#[cfg(any(feature = "jwt-aws-lc-rs", feature = "jwt-rust-crypto"))]
use crate::options::JwtAlgorithm;

/// One HMAC key, identified by the `kid` header of the tokens it signs.
#[derive(Clone)]
pub struct SigningKey {
    kid: String,
    secret: Vec<u8>,
}

impl SigningKey {
    pub fn new(kid: impl Into<String>, secret: impl AsRef<[u8]>) -> Result<Self> {
        let kid = kid.into();
        let secret = secret.as_ref().to_vec();
        if kid.is_empty() {
            anyhow::bail!("signing key id cannot be empty");
        }
        if secret.is_empty() {
            anyhow::bail!("signing secret for key '{kid}' cannot be empty");
        }
        Ok(Self { kid, secret })
    }

    pub fn kid(&self) -> &str {
        &self.kid
    }

    pub fn secret(&self) -> &[u8] {
        &self.secret
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("kid", &self.kid)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Keys used by the codec: the active key signs, every key verifies.
///
/// Built once at startup and handed to [`SessionCodec`]; rotating means
/// building a new context with [`SigningContext::rotate`].
#[derive(Clone, Debug)]
pub struct SigningContext {
    active: SigningKey,
    retired: Vec<SigningKey>,
}

impl SigningContext {
    pub fn new(active: SigningKey) -> Self {
        Self {
            active,
            retired: Vec::new(),
        }
    }

    /// Keep verifying tokens signed with `key`.
    pub fn with_retired(mut self, key: SigningKey) -> Self {
        if key.kid != self.active.kid && self.find(&key.kid).is_none() {
            self.retired.push(key);
        }
        self
    }

    /// Make `next` the signing key; the current one stays valid for verification.
    pub fn rotate(self, next: SigningKey) -> Self {
        let previous = self.active;
        let mut retired: Vec<SigningKey> = self
            .retired
            .into_iter()
            .filter(|k| k.kid != next.kid)
            .collect();
        if previous.kid != next.kid {
            retired.insert(0, previous);
        }
        Self {
            active: next,
            retired,
        }
    }

    pub fn active(&self) -> &SigningKey {
        &self.active
    }

    pub fn find(&self, kid: &str) -> Option<&SigningKey> {
        std::iter::once(&self.active)
            .chain(self.retired.iter())
            .find(|k| k.kid == kid)
    }
}

pub trait JwtProvider: Send + Sync {
    fn sign(&self, key: &SigningKey, jwt: &JwtOptions, claims: &Value) -> Result<String>;

    /// Verify signature, issuer, audience and expiry; return the raw claims.
    fn verify(&self, keys: &SigningContext, jwt: &JwtOptions, token: &str) -> Result<Value>;
}

#[cfg(not(any(feature = "jwt-aws-lc-rs", feature = "jwt-rust-crypto")))]
struct NoJwtProvider;

#[cfg(not(any(feature = "jwt-aws-lc-rs", feature = "jwt-rust-crypto")))]
impl JwtProvider for NoJwtProvider {
    fn sign(&self, _key: &SigningKey, _jwt: &JwtOptions, _claims: &Value) -> Result<String> {
        Err(anyhow::anyhow!(
            "JWT support is disabled (enable one of: jwt-aws-lc-rs, jwt-rust-crypto)"
        ))
    }

    fn verify(&self, _keys: &SigningContext, _jwt: &JwtOptions, _token: &str) -> Result<Value> {
        Err(anyhow::anyhow!(
            "JWT support is disabled (enable one of: jwt-aws-lc-rs, jwt-rust-crypto)"
        ))
    }
}

#[cfg(any(feature = "jwt-aws-lc-rs", feature = "jwt-rust-crypto"))]
pub struct JsonwebtokenProvider;

#[cfg(any(feature = "jwt-aws-lc-rs", feature = "jwt-rust-crypto"))]
impl JsonwebtokenProvider {
    fn algorithm(alg: JwtAlgorithm) -> jsonwebtoken::Algorithm {
        match alg {
            JwtAlgorithm::HS256 => jsonwebtoken::Algorithm::HS256,
            JwtAlgorithm::HS384 => jsonwebtoken::Algorithm::HS384,
            JwtAlgorithm::HS512 => jsonwebtoken::Algorithm::HS512,
        }
    }
}

#[cfg(any(feature = "jwt-aws-lc-rs", feature = "jwt-rust-crypto"))]
impl JwtProvider for JsonwebtokenProvider {
    fn sign(&self, key: &SigningKey, jwt: &JwtOptions, claims: &Value) -> Result<String> {
        use jsonwebtoken::{encode, EncodingKey, Header};

        let mut header = Header::new(Self::algorithm(jwt.algorithm));
        header.kid = Some(key.kid().to_string());

        Ok(encode(&header, claims, &EncodingKey::from_secret(key.secret()))?)
    }

    fn verify(&self, keys: &SigningContext, jwt: &JwtOptions, token: &str) -> Result<Value> {
        use jsonwebtoken::{decode, decode_header, DecodingKey, Validation};

        let header = decode_header(token)?;
        let kid = header
            .kid
            .ok_or_else(|| anyhow::anyhow!("token carries no key id"))?;
        let key = keys
            .find(&kid)
            .ok_or_else(|| anyhow::anyhow!("unknown signing key '{kid}'"))?;

        let mut validation = Validation::new(Self::algorithm(jwt.algorithm));
        validation.leeway = 0;
        validation.set_issuer(&[jwt.issuer.as_str()]);
        validation.set_audience(jwt.audience.as_slice());
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);

        let decoded = decode::<Value>(token, &DecodingKey::from_secret(key.secret()), &validation)?;
        Ok(decoded.claims)
    }
}

#[derive(Serialize)]
struct RegisteredClaims<'a> {
    #[serde(flatten)]
    session: &'a SessionClaim,
    iss: &'a str,
    aud: &'a [String],
    iat: i64,
    jti: String,
}

/// Encodes session claims into signed bearer strings and back.
#[derive(Clone)]
pub struct SessionCodec {
    keys: Arc<SigningContext>,
    jwt: JwtOptions,
    provider: Arc<dyn JwtProvider>,
}

impl SessionCodec {
    pub fn new(keys: SigningContext, jwt: JwtOptions) -> Self {
        let provider: Arc<dyn JwtProvider> = {
            #[cfg(any(feature = "jwt-aws-lc-rs", feature = "jwt-rust-crypto"))]
            {
                Arc::new(JsonwebtokenProvider)
            }
            #[cfg(not(any(feature = "jwt-aws-lc-rs", feature = "jwt-rust-crypto")))]
            {
                Arc::new(NoJwtProvider)
            }
        };

        Self {
            keys: Arc::new(keys),
            jwt,
            provider,
        }
    }

    pub fn options(&self) -> &JwtOptions {
        &self.jwt
    }

    pub fn ttl(&self) -> Duration {
        self.jwt.session_ttl
    }

    pub fn keys(&self) -> &SigningContext {
        &self.keys
    }

    /// Sign `claim` as is; its `expires_at` becomes the token `exp`.
    pub fn encode(&self, claim: &SessionClaim) -> AuthResult<String> {
        let registered = RegisteredClaims {
            session: claim,
            iss: &self.jwt.issuer,
            aud: &self.jwt.audience,
            iat: Utc::now().timestamp(),
            jti: Uuid::new_v4().to_string(),
        };
        let claims = serde_json::to_value(&registered)
            .map_err(|e| AuthError::Internal(format!("failed to serialize session claim: {e}")))?;

        self.provider
            .sign(self.keys.active(), &self.jwt, &claims)
            .map_err(|e| AuthError::Internal(format!("failed to sign session token: {e}")))
    }

    /// Verify and decode a token. Any defect yields `InvalidSession`.
    pub fn decode(&self, token: &str) -> AuthResult<SessionClaim> {
        let raw = self
            .provider
            .verify(&self.keys, &self.jwt, token)
            .map_err(|e| {
                debug!(error = %e, "session token rejected");
                AuthError::InvalidSession
            })?;

        let claim: SessionClaim = serde_json::from_value(raw).map_err(|e| {
            debug!(error = %e, "session token has malformed claims");
            AuthError::InvalidSession
        })?;

        if claim.is_expired_at(Utc::now().timestamp()) {
            return Err(AuthError::InvalidSession);
        }
        Ok(claim)
    }
}

impl fmt::Debug for SessionCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCodec")
            .field("keys", &self.keys)
            .field("jwt", &self.jwt)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(kid: &str) -> SigningKey {
        SigningKey::new(kid, format!("{kid}-secret")).unwrap()
    }

    #[test]
    fn signing_key_rejects_empty_parts() {
        assert!(SigningKey::new("", "secret").is_err());
        assert!(SigningKey::new("primary", "").is_err());
        assert!(!format!("{:?}", key("primary")).contains("primary-secret"));
    }

    #[test]
    fn rotation_keeps_previous_key_for_verification() {
        let ctx = SigningContext::new(key("k1")).rotate(key("k2")).rotate(key("k3"));
        assert_eq!(ctx.active().kid(), "k3");
        assert!(ctx.find("k2").is_some());
        assert!(ctx.find("k1").is_some());
        assert!(ctx.find("k4").is_none());

        let same = SigningContext::new(key("k1")).rotate(key("k1"));
        assert_eq!(same.active().kid(), "k1");
        assert!(same.retired.is_empty());
    }

    #[test]
    fn retired_keys_are_not_duplicated() {
        let ctx = SigningContext::new(key("k1"))
            .with_retired(key("k0"))
            .with_retired(key("k0"))
            .with_retired(key("k1"));
        assert_eq!(ctx.retired.len(), 1);
    }
}
