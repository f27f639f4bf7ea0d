// Session cookie transport.

use std::time::Duration;

use http::header::{AUTHORIZATION, COOKIE};
use http::{HeaderMap, HeaderValue};

use crate::error::{AuthError, AuthResult};
use crate::options::CookieOptions;

pub const SESSION_COOKIE: &str = "session_token";

/// `Set-Cookie` value carrying `token` for `max_age`.
pub fn session_cookie(options: &CookieOptions, token: &str, max_age: Duration) -> AuthResult<HeaderValue> {
    let mut cookie = format!(
        "{}={}; Path={}; Max-Age={}; HttpOnly; SameSite={}",
        options.name,
        token,
        options.path,
        max_age.as_secs(),
        options.same_site.as_str()
    );
    if options.secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie).map_err(|e| AuthError::Internal(format!("invalid session cookie: {e}")))
}

/// `Set-Cookie` value that makes the browser drop the session cookie now.
pub fn expired_session_cookie(options: &CookieOptions) -> AuthResult<HeaderValue> {
    let mut cookie = format!(
        "{}=; Path={}; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT; HttpOnly; SameSite={}",
        options.name,
        options.path,
        options.same_site.as_str()
    );
    if options.secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie).map_err(|e| AuthError::Internal(format!("invalid session cookie: {e}")))
}

/// Session token from the named cookie, falling back to `Authorization: Bearer`.
pub fn extract_session_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    extract_cookie(headers, cookie_name).or_else(|| extract_bearer_token(headers))
}

pub fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, v)| *k == name && !v.is_empty())
        .map(|(_, v)| v.trim_matches('"').to_string())
}

pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let v = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let prefix = "Bearer ";
    if v.len() <= prefix.len() || !v.starts_with(prefix) {
        return None;
    }
    Some(v[prefix.len()..].trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::SameSite;

    #[test]
    fn builds_http_only_cookie() {
        let options = CookieOptions::default();
        let value = session_cookie(&options, "abc.def.ghi", Duration::from_secs(259_200)).unwrap();
        let value = value.to_str().unwrap();
        assert!(value.starts_with("session_token=abc.def.ghi;"));
        assert!(value.contains("Path=/"));
        assert!(value.contains("Max-Age=259200"));
        assert!(value.contains("HttpOnly"));
        assert!(!value.contains("Secure"));
    }

    #[test]
    fn expired_cookie_has_zero_max_age() {
        let options = CookieOptions {
            secure: true,
            same_site: SameSite::None,
            ..CookieOptions::default()
        };
        let value = expired_session_cookie(&options).unwrap();
        let value = value.to_str().unwrap();
        assert!(value.starts_with("session_token=;"));
        assert!(value.contains("Max-Age=0"));
        assert!(value.ends_with("; Secure"));
    }

    #[test]
    fn reads_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark; session_token=tok123; lang=en"));
        assert_eq!(extract_session_token(&headers, SESSION_COOKIE), Some("tok123".to_string()));
        assert_eq!(extract_cookie(&headers, "missing"), None);
    }

    #[test]
    fn empty_cookie_falls_back_to_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("session_token="));
        assert_eq!(extract_session_token(&headers, SESSION_COOKIE), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer tok456"));
        assert_eq!(extract_session_token(&headers, SESSION_COOKIE), Some("tok456".to_string()));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        assert_eq!(extract_bearer_token(&headers), None);
    }
}
