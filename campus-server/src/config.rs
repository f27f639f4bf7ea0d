use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use campus_auth::{AuthOptions, JwtOptions, SigningContext, SigningKey};
use campus_core::{CampusConfig, CampusConfigSnapshot};
use humantime_serde::re::humantime;
use tracing::warn;

pub const ENV_PREFIX: &str = "CAMPUS__";

const DEV_JWT_SECRET: &str = "campus-dev-secret";

/// Environment variable → configuration key.
const ENV_KEYS: &[(&str, &str)] = &[
    ("HTTP_HOST", "http.host"),
    ("HTTP_PORT", "http.port"),
    ("CORS_ORIGIN", "http.cors_origin"),
    ("AUTH_JWT_SECRET", "auth.jwt.secret"),
    ("AUTH_JWT_KEY_ID", "auth.jwt.kid"),
    ("AUTH_JWT_RETIRED", "auth.jwt.retired"),
    ("AUTH_SESSION_TTL", "auth.session.ttl"),
    ("AUTH_COOKIE_SECURE", "auth.cookie.secure"),
    ("AUTH_BCRYPT_COST", "auth.bcrypt.cost"),
    ("STORAGE_TIMEOUT_MS", "storage.timeout_ms"),
    ("ASSET_BASE_URL", "assets.base_url"),
];

/// Defaults, then the plain environment variables, then `CAMPUS__A__B` overrides.
pub fn load() -> CampusConfig {
    let mut config = CampusConfig::new();
    for (env_var, key) in ENV_KEYS {
        config.set_from_env(key, env_var);
    }
    config.load_prefixed_env(ENV_PREFIX);
    defaults(&mut config);
    config
}

pub fn defaults(config: &mut CampusConfig) {
    config.set_default("http.host", "127.0.0.1");
    config.set_default("http.port", "8080");
    config.set_default("http.cors_origin", "http://localhost:3000");
    config.set_default("auth.jwt.kid", "primary");
    config.set_default("auth.session.ttl", "72h");
    config.set_default("auth.cookie.secure", "false");
    config.set_default("auth.bcrypt.cost", "12");
    config.set_default("storage.timeout_ms", "5000");
    config.set_default("assets.base_url", "http://localhost:8080");
}

/// Typed view of the configuration used to wire the server.
#[derive(Debug)]
pub struct Settings {
    pub signing: SigningContext,
    pub auth: AuthOptions,
    pub bcrypt_cost: u32,
    pub storage_timeout: Duration,
    pub cors_origin: Option<String>,
}

impl Settings {
    pub fn from_snapshot(config: &CampusConfigSnapshot) -> Result<Self> {
        let ttl = match config.get("auth.session.ttl") {
            Some(raw) => humantime::parse_duration(raw)
                .with_context(|| format!("auth.session.ttl: invalid duration '{raw}'"))?,
            None => campus_auth::options::DEFAULT_SESSION_TTL,
        };
        let jwt = JwtOptions {
            session_ttl: ttl,
            ..JwtOptions::default()
        };
        let auth = AuthOptions::builder()
            .jwt(jwt)
            .secure_cookie(parse_or(config, "auth.cookie.secure", false)?)
            .asset_base_url(config.get_string("assets.base_url").unwrap_or_default())
            .build_validated()
            .map_err(|e| anyhow!("invalid authentication settings: {e}"))?;

        Ok(Self {
            signing: signing_context(config)?,
            auth,
            bcrypt_cost: parse_or(config, "auth.bcrypt.cost", 12)?,
            storage_timeout: Duration::from_millis(parse_or(config, "storage.timeout_ms", 5000)?),
            cors_origin: config
                .get_string("http.cors_origin")
                .filter(|o| !o.trim().is_empty()),
        })
    }
}

/// A set but unparsable value fails startup instead of falling back.
fn parse_or<T>(config: &CampusConfigSnapshot, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match config.get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key}: invalid value '{raw}'")),
        None => Ok(default),
    }
}

/// Active key from `auth.jwt.kid` / `auth.jwt.secret`, plus the retired keys
/// listed in `auth.jwt.retired` as `kid:secret,kid:secret`.
pub fn signing_context(config: &CampusConfigSnapshot) -> Result<SigningContext> {
    let kid = config.get("auth.jwt.kid").unwrap_or("primary");
    let secret = match config.get("auth.jwt.secret").filter(|s| !s.is_empty()) {
        Some(secret) => secret,
        None => {
            warn!("AUTH_JWT_SECRET is not set; using the development secret");
            DEV_JWT_SECRET
        }
    };
    let mut signing = SigningContext::new(SigningKey::new(kid, secret)?);

    if let Some(retired) = config.get("auth.jwt.retired") {
        for entry in retired.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (kid, secret) = entry
                .split_once(':')
                .ok_or_else(|| anyhow!("auth.jwt.retired: expected kid:secret, got '{entry}'"))?;
            signing = signing.with_retired(SigningKey::new(kid.trim(), secret.trim())?);
        }
    }
    Ok(signing)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> CampusConfig {
        let mut config = CampusConfig::new();
        config.set("auth.jwt.secret", "s3cret");
        defaults(&mut config);
        config
    }

    #[test]
    fn defaults_produce_valid_settings() {
        let settings = Settings::from_snapshot(&base().snapshot()).unwrap();
        assert_eq!(settings.auth.jwt.session_ttl, Duration::from_secs(72 * 3600));
        assert_eq!(settings.auth.cookie_max_age(), settings.auth.jwt.session_ttl);
        assert_eq!(settings.storage_timeout, Duration::from_millis(5000));
        assert_eq!(settings.bcrypt_cost, 12);
        assert_eq!(settings.signing.active().kid(), "primary");
        assert_eq!(settings.cors_origin.as_deref(), Some("http://localhost:3000"));
    }

    #[test]
    fn ttl_uses_humantime() {
        let mut config = base();
        config.set("auth.session.ttl", "24h");
        let settings = Settings::from_snapshot(&config.snapshot()).unwrap();
        assert_eq!(settings.auth.jwt.session_ttl, Duration::from_secs(24 * 3600));

        config.set("auth.session.ttl", "soon");
        assert!(Settings::from_snapshot(&config.snapshot()).is_err());
    }

    #[test]
    fn malformed_numbers_fail_startup() {
        let mut config = base();
        config.set("auth.bcrypt.cost", "twelve");
        let err = Settings::from_snapshot(&config.snapshot()).unwrap_err();
        assert!(err.to_string().contains("auth.bcrypt.cost"));

        let mut config = base();
        config.set("storage.timeout_ms", "5s");
        let err = Settings::from_snapshot(&config.snapshot()).unwrap_err();
        assert!(err.to_string().contains("storage.timeout_ms"));

        let mut config = base();
        config.set("auth.cookie.secure", "yes");
        assert!(Settings::from_snapshot(&config.snapshot()).is_err());

        let mut config = base();
        config.set("storage.timeout_ms", " 250 ");
        config.set("auth.bcrypt.cost", "4");
        let settings = Settings::from_snapshot(&config.snapshot()).unwrap();
        assert_eq!(settings.storage_timeout, Duration::from_millis(250));
        assert_eq!(settings.bcrypt_cost, 4);
    }

    #[test]
    fn retired_keys_are_parsed() {
        let mut config = base();
        config.set("auth.jwt.kid", "k2");
        config.set("auth.jwt.retired", "k1:old-secret, k0:older");
        let signing = signing_context(&config.snapshot()).unwrap();
        assert_eq!(signing.active().kid(), "k2");
        assert!(signing.find("k1").is_some());
        assert!(signing.find("k0").is_some());

        config.set("auth.jwt.retired", "no-separator");
        assert!(signing_context(&config.snapshot()).is_err());
    }

    #[test]
    fn prefixed_overrides_become_dotted_keys() {
        let mut config = CampusConfig::new();
        config.load_prefixed(
            ENV_PREFIX,
            vec![("CAMPUS__STORAGE__TIMEOUT_MS".to_string(), "250".to_string())],
        );
        defaults(&mut config);
        assert_eq!(config.get("storage.timeout_ms"), Some("250"));
    }
}
