//! # Campus configuration
//!
//! A minimal string key/value store in the `app.set()` / `app.get()` style.
//! The server populates it from environment variables and parses typed
//! values out of a [`CampusConfigSnapshot`].
//!
//! ```rust
//! use campus_core::CampusConfig;
//!
//! let mut config = CampusConfig::new();
//! config.set("http.port", "8080");
//! config.set("storage.timeout_ms", "2500");
//!
//! let snapshot = config.snapshot();
//! assert_eq!(snapshot.get("http.port"), Some("8080"));
//! assert_eq!(snapshot.get_string("storage.timeout_ms").as_deref(), Some("2500"));
//! ```
//!
//! Prefixed environment variables map onto dotted keys:
//! `CAMPUS__AUTH__SESSION__TTL=24h` sets `auth.session.ttl`.

use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct CampusConfig {
    values: HashMap<String, String>,
}

impl CampusConfig {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Set a configuration key to a string value.
    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.values.insert(key.into(), value.into());
    }

    /// Set the key only when it has no value yet.
    pub fn set_default<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.values.entry(key.into()).or_insert_with(|| value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|s| s.as_str())
    }

    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Copy `env_var` into `key` when the variable is set.
    pub fn set_from_env(&mut self, key: &str, env_var: &str) {
        if let Ok(value) = std::env::var(env_var) {
            self.set(key, value);
        }
    }

    /// Load every `<prefix>A__B` variable as `a.b`.
    pub fn load_prefixed_env(&mut self, prefix: &str) {
        self.load_prefixed(prefix, std::env::vars());
    }

    pub fn load_prefixed<I>(&mut self, prefix: &str, vars: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            if let Some(stripped) = key.strip_prefix(prefix) {
                let normalized = stripped.to_lowercase().replace("__", ".");
                if !normalized.is_empty() {
                    self.set(normalized, value);
                }
            }
        }
    }

    pub fn snapshot(&self) -> CampusConfigSnapshot {
        CampusConfigSnapshot::new(self.values.clone())
    }
}

#[derive(Debug, Clone, Default)]
pub struct CampusConfigSnapshot {
    map: HashMap<String, String>,
}

impl CampusConfigSnapshot {
    pub(crate) fn new(map: HashMap<String, String>) -> Self {
        Self { map }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(|s| s.as_str())
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixed_vars_become_dotted_keys() {
        let mut config = CampusConfig::new();
        config.load_prefixed(
            "CAMPUS__",
            vec![
                ("CAMPUS__AUTH__SESSION__TTL".to_string(), "24h".to_string()),
                ("CAMPUS__HTTP__PORT".to_string(), "9000".to_string()),
                ("PATH".to_string(), "/usr/bin".to_string()),
            ],
        );
        let snapshot = config.snapshot();
        assert_eq!(snapshot.get("auth.session.ttl"), Some("24h"));
        assert_eq!(snapshot.get("http.port"), Some("9000"));
        assert!(snapshot.get("path").is_none());
    }

    #[test]
    fn set_default_does_not_override() {
        let mut config = CampusConfig::new();
        config.set("http.host", "0.0.0.0");
        config.set_default("http.host", "127.0.0.1");
        config.set_default("http.port", "8080");
        assert_eq!(config.get("http.host"), Some("0.0.0.0"));
        assert_eq!(config.get("http.port"), Some("8080"));
    }
}
