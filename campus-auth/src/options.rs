// Authentication options and configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default lifetime of a session token and of the cookie carrying it.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(72 * 60 * 60);

/// HMAC signing algorithms
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum JwtAlgorithm {
    /// HMAC using SHA-256
    #[default]
    HS256,
    /// HMAC using SHA-384
    HS384,
    /// HMAC using SHA-512
    HS512,
}

/// Cookie `SameSite` attribute
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    #[default]
    Lax,
    None,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

/// Main authentication configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthOptions {
    /// Token settings
    pub jwt: JwtOptions,
    /// Session cookie settings
    pub cookie: CookieOptions,
    /// Prefix for branding asset paths returned by session introspection
    pub asset_base_url: String,
}

impl AuthOptions {
    /// Validate the entire authentication configuration
    pub fn validate(&self) -> Result<(), String> {
        self.jwt
            .validate()
            .map_err(|e| format!("JWT validation failed: {}", e))?;
        self.cookie
            .validate()
            .map_err(|e| format!("Cookie validation failed: {}", e))?;
        Ok(())
    }

    pub fn builder() -> AuthOptionsBuilder {
        AuthOptionsBuilder::new()
    }

    /// Cookie lifetime. Always the token lifetime, so the browser never
    /// keeps a cookie whose token has expired, nor drops a valid one early.
    pub fn cookie_max_age(&self) -> Duration {
        self.jwt.session_ttl
    }
}

/// JWT-specific configuration options
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct JwtOptions {
    pub algorithm: JwtAlgorithm,
    /// Token issuer (iss claim)
    pub issuer: String,
    /// Token audience (aud claim)
    pub audience: Vec<String>,
    /// Session token lifetime
    #[serde(with = "humantime_serde")]
    pub session_ttl: Duration,
}

impl Default for JwtOptions {
    fn default() -> Self {
        Self {
            algorithm: JwtAlgorithm::default(),
            issuer: "campus-auth".to_string(),
            audience: vec!["campus-api".to_string()],
            session_ttl: DEFAULT_SESSION_TTL,
        }
    }
}

impl JwtOptions {
    pub fn validate(&self) -> Result<(), String> {
        if self.issuer.is_empty() {
            return Err("JWT issuer cannot be empty".to_string());
        }

        if self.audience.is_empty() || self.audience.iter().any(|a| a.is_empty()) {
            return Err("JWT audience cannot be empty".to_string());
        }

        if self.session_ttl.as_secs() == 0 {
            return Err("Session lifetime must be at least one second".to_string());
        }

        Ok(())
    }
}

/// Session cookie configuration
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CookieOptions {
    pub name: String,
    pub path: String,
    pub secure: bool,
    pub same_site: SameSite,
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self {
            name: crate::cookie::SESSION_COOKIE.to_string(),
            path: "/".to_string(),
            secure: false,
            same_site: SameSite::default(),
        }
    }
}

impl CookieOptions {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.is_empty()
            || !self
                .name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(format!("Invalid cookie name '{}'", self.name));
        }

        if !self.path.starts_with('/') || self.path.contains(';') {
            return Err(format!("Invalid cookie path '{}'", self.path));
        }

        if self.same_site == SameSite::None && !self.secure {
            return Err("SameSite=None requires a secure cookie".to_string());
        }

        Ok(())
    }
}

/// Builder pattern for AuthOptions configuration
#[derive(Debug, Default)]
pub struct AuthOptionsBuilder {
    options: AuthOptions,
}

impl AuthOptionsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn jwt(mut self, jwt: JwtOptions) -> Self {
        self.options.jwt = jwt;
        self
    }

    pub fn issuer(mut self, issuer: impl Into<String>) -> Self {
        self.options.jwt.issuer = issuer.into();
        self
    }

    pub fn session_ttl(mut self, ttl: Duration) -> Self {
        self.options.jwt.session_ttl = ttl;
        self
    }

    pub fn cookie(mut self, cookie: CookieOptions) -> Self {
        self.options.cookie = cookie;
        self
    }

    pub fn secure_cookie(mut self, secure: bool) -> Self {
        self.options.cookie.secure = secure;
        self
    }

    pub fn asset_base_url(mut self, url: impl Into<String>) -> Self {
        self.options.asset_base_url = url.into();
        self
    }

    pub fn build(self) -> AuthOptions {
        self.options
    }

    pub fn build_validated(self) -> Result<AuthOptions, String> {
        let options = self.build();
        options.validate()?;
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let options = AuthOptions::default();
        assert!(options.validate().is_ok());
        assert_eq!(options.cookie.name, "session_token");
        assert_eq!(options.cookie_max_age(), Duration::from_secs(259_200));
    }

    #[test]
    fn cookie_lifetime_follows_token_lifetime() {
        let options = AuthOptions::builder()
            .session_ttl(Duration::from_secs(3600))
            .build_validated()
            .unwrap();
        assert_eq!(options.cookie_max_age(), Duration::from_secs(3600));
    }

    #[test]
    fn rejects_bad_settings() {
        assert!(AuthOptions::builder()
            .session_ttl(Duration::ZERO)
            .build_validated()
            .is_err());
        assert!(AuthOptions::builder().issuer("").build_validated().is_err());

        let cookie = CookieOptions {
            same_site: SameSite::None,
            ..CookieOptions::default()
        };
        let err = AuthOptions::builder().cookie(cookie).build_validated().unwrap_err();
        assert!(err.contains("SameSite=None"));

        let cookie = CookieOptions {
            name: "session token".into(),
            ..CookieOptions::default()
        };
        assert!(cookie.validate().is_err());
    }

    #[test]
    fn ttl_reads_humantime() {
        let jwt: JwtOptions = serde_json::from_value(serde_json::json!({
            "algorithm": "HS256",
            "issuer": "campus-auth",
            "audience": ["campus-api"],
            "session_ttl": "24h"
        }))
        .unwrap();
        assert_eq!(jwt.session_ttl, Duration::from_secs(86_400));
    }
}
