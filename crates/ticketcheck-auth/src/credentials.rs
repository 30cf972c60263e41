//! Credential accessors used to authenticate API requests.

use std::collections::BTreeMap;
use std::sync::RwLock;

/// Yields the `Cookie` header value for authenticated requests.
pub trait CredentialSource: Send + Sync {
    /// `None` when no credential is available; requests then go out
    /// unauthenticated and the server decides.
    fn cookie_header(&self) -> Option<String>;
}

/// A fixed cookie supplied by the operator (e.g. `TICKETCHECK_COOKIE`).
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    cookie: Option<String>,
}

impl StaticCredentials {
    pub fn new(cookie: impl Into<String>) -> Self {
        let cookie = cookie.into();
        let cookie = cookie.trim();
        Self {
            cookie: (!cookie.is_empty()).then(|| cookie.to_string()),
        }
    }

    pub fn none() -> Self {
        Self::default()
    }
}

impl CredentialSource for StaticCredentials {
    fn cookie_header(&self) -> Option<String> {
        self.cookie.clone()
    }
}

/// In-memory cookie store fed from `Set-Cookie` response headers.
///
/// Only `name=value` pairs are kept; attributes (`Path`, `HttpOnly`, ...)
/// are dropped. A cookie with an empty value or `Max-Age=0` is removed.
#[derive(Debug, Default)]
pub struct CookieJar {
    cookies: RwLock<BTreeMap<String, String>>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the jar from a `Cookie` header (`a=1; b=2`).
    pub fn from_header(header: &str) -> Self {
        let jar = Self::new();
        for pair in header.split(';') {
            if let Some((name, value)) = split_pair(pair) {
                jar.insert(name, value);
            }
        }
        jar
    }

    /// Apply one `Set-Cookie` header value.
    pub fn store(&self, set_cookie: &str) {
        let mut parts = set_cookie.split(';');
        let Some((name, value)) = parts.next().and_then(split_pair) else {
            return;
        };
        let expired = parts.any(|attr| {
            let attr = attr.trim().to_ascii_lowercase();
            attr == "max-age=0" || attr.starts_with("max-age=-")
        });

        if expired || value.is_empty() {
            if let Ok(mut cookies) = self.cookies.write() {
                cookies.remove(name);
            }
        } else {
            self.insert(name, value);
        }
    }

    pub fn clear(&self) {
        if let Ok(mut cookies) = self.cookies.write() {
            cookies.clear();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.read().map(|c| c.is_empty()).unwrap_or(true)
    }

    fn insert(&self, name: &str, value: &str) {
        if let Ok(mut cookies) = self.cookies.write() {
            cookies.insert(name.to_string(), value.to_string());
        }
    }
}

impl CredentialSource for CookieJar {
    fn cookie_header(&self) -> Option<String> {
        let cookies = self.cookies.read().ok()?;
        if cookies.is_empty() {
            return None;
        }
        Some(
            cookies
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

fn split_pair(pair: &str) -> Option<(&str, &str)> {
    let (name, value) = pair.trim().split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((name, value.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_credentials_blank_is_none() {
        assert_eq!(StaticCredentials::new("   ").cookie_header(), None);
        assert_eq!(
            StaticCredentials::new("better-auth.session_token=abc").cookie_header(),
            Some("better-auth.session_token=abc".to_string())
        );
    }

    #[test]
    fn test_jar_keeps_name_value_only() {
        let jar = CookieJar::new();
        jar.store("better-auth.session_token=abc.def; Path=/; HttpOnly; SameSite=Lax");
        assert_eq!(
            jar.cookie_header(),
            Some("better-auth.session_token=abc.def".to_string())
        );
    }

    #[test]
    fn test_jar_joins_multiple_cookies_sorted() {
        let jar = CookieJar::new();
        jar.store("b=2; Path=/");
        jar.store("a=1; Path=/");
        assert_eq!(jar.cookie_header(), Some("a=1; b=2".to_string()));
    }

    #[test]
    fn test_jar_removes_expired_cookie() {
        let jar = CookieJar::from_header("better-auth.session_token=abc; other=1");
        jar.store("better-auth.session_token=; Max-Age=0; Path=/");
        assert_eq!(jar.cookie_header(), Some("other=1".to_string()));
    }

    #[test]
    fn test_jar_ignores_garbage() {
        let jar = CookieJar::new();
        jar.store("no-equals-sign");
        jar.store("=value");
        assert!(jar.is_empty());
        assert_eq!(jar.cookie_header(), None);
    }

    #[test]
    fn test_clear_empties_jar() {
        let jar = CookieJar::from_header("a=1");
        jar.clear();
        assert!(jar.is_empty());
    }
}
