//! Cross-origin policy.
//!
//! Same-origin only unless origins are configured. With an allow-list:
//!
//! | Request origin | Allow-Origin / Credentials | Methods, Headers, Max-Age |
//! |----------------|----------------------------|---------------------------|
//! | listed         | echoed                     | set                       |
//! | not listed     | absent                     | set                       |
//!
//! Matching is exact. A `*` entry is only a literal list item: no browser
//! sends `Origin: *`, so it grants nothing. Startup warns about it.

use axum::http::{header, HeaderMap, HeaderValue};

use crate::config::CorsConfig;

const ALLOW_METHODS: &str = "GET, POST, OPTIONS";
const ALLOW_HEADERS: &str = "Content-Type, Authorization";
const MAX_AGE_SECS: &str = "86400";

/// Resolved CORS policy.
#[derive(Debug, Clone, Default)]
pub struct CorsPolicy {
    origins: Vec<String>,
}

impl CorsPolicy {
    /// Build from configuration.
    pub fn new(config: &CorsConfig) -> Self {
        Self {
            origins: config.origins.clone(),
        }
    }

    /// `true` if no origins are configured.
    pub fn is_same_origin_only(&self) -> bool {
        self.origins.is_empty()
    }

    /// `true` if `origin` may read responses.
    pub fn allows(&self, origin: &str) -> bool {
        self.origins.iter().any(|allowed| allowed == origin)
    }

    /// Add CORS headers for a request carrying `origin`.
    pub fn apply(&self, origin: Option<&str>, headers: &mut HeaderMap) {
        if self.is_same_origin_only() {
            return;
        }
        if let Some(origin) = origin.filter(|o| self.allows(o)) {
            if let Ok(value) = HeaderValue::from_str(origin) {
                headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
                headers.insert(
                    header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
                    HeaderValue::from_static("true"),
                );
                headers.append(header::VARY, HeaderValue::from_static("Origin"));
            }
        }
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOW_METHODS),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOW_HEADERS),
        );
        headers.insert(
            header::ACCESS_CONTROL_MAX_AGE,
            HeaderValue::from_static(MAX_AGE_SECS),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(list: &str) -> CorsPolicy {
        CorsPolicy::new(&CorsConfig::from_list(list))
    }

    #[test]
    fn test_same_origin_only_adds_nothing() {
        let mut headers = HeaderMap::new();
        policy("").apply(Some("https://evil.example"), &mut headers);
        assert!(headers.is_empty());
    }

    #[test]
    fn test_listed_origin_echoed() {
        let mut headers = HeaderMap::new();
        policy("https://app.example").apply(Some("https://app.example"), &mut headers);
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "https://app.example");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
        assert_eq!(headers[header::ACCESS_CONTROL_MAX_AGE], "86400");
    }

    #[test]
    fn test_unlisted_origin_not_echoed() {
        let mut headers = HeaderMap::new();
        policy("https://app.example").apply(Some("https://evil.example"), &mut headers);
        assert!(headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], ALLOW_METHODS);
    }

    #[test]
    fn test_wildcard_grants_no_origin() {
        let policy = policy("*");
        assert!(!policy.allows("https://evil.example"));
        let mut headers = HeaderMap::new();
        policy.apply(Some("https://evil.example"), &mut headers);
        assert!(headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
        assert!(headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).is_none());
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], ALLOW_METHODS);
    }

    #[test]
    fn test_wildcard_alongside_listed_origin() {
        let policy = policy("*,https://app.example");
        assert!(policy.allows("https://app.example"));
        assert!(!policy.allows("https://other.example"));
    }
}
