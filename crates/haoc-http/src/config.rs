//! API client configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::error::ApiError;
use crate::Result;

pub const DEFAULT_BASE_URL: &str = "https://haoc.vercel.app/api/v1";

pub const REFRESH_PATH: &str = "/auth/refresh-token";

/// Endpoints whose 401 is returned as-is instead of triggering a refresh
pub const DEFAULT_SKIP_REFRESH: [&str; 5] = [
    "/auth/login",
    "/auth/change-password",
    "/auth/verify-otp",
    "/auth/register",
    "/auth/logout",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL every request path is appended to
    pub base_url: String,
    /// Path of the cookie-authenticated refresh endpoint
    pub refresh_path: String,
    /// Paths excluded from refresh-and-retry
    pub skip_refresh: Vec<String>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Join a request path onto the base URL.
    ///
    /// Plain concatenation: `Url::join` would drop the base's `/api/v1` prefix
    /// for paths starting with `/`.
    pub fn url(&self, path: &str) -> Result<Url> {
        let base = self.base_url.trim().trim_end_matches('/');
        let path = path.trim().trim_start_matches('/');
        let joined = format!("{base}/{path}");

        Url::parse(&joined).map_err(|e| ApiError::InvalidUrl(format!("{joined}: {e}")))
    }

    /// Whether a 401 from `path` must be propagated without refreshing.
    /// The query string is ignored.
    pub fn skips_refresh(&self, path: &str) -> bool {
        let path = normalize_path(path);
        self.skip_refresh
            .iter()
            .any(|skipped| normalize_path(skipped) == path)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            refresh_path: REFRESH_PATH.to_string(),
            skip_refresh: DEFAULT_SKIP_REFRESH.iter().map(|p| p.to_string()).collect(),
            timeout: Duration::from_secs(30),
        }
    }
}

fn normalize_path(path: &str) -> &str {
    let path = path.trim();
    let path = path.split(['?', '#']).next().unwrap_or(path);
    path.trim_end_matches('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_keeps_base_prefix() {
        let config = ApiConfig::default();
        assert_eq!(
            config.url("/auth/login").unwrap().as_str(),
            "https://haoc.vercel.app/api/v1/auth/login"
        );

        let config = ApiConfig::new("http://localhost:4000/api/v1/");
        assert_eq!(
            config.url("user/profile").unwrap().as_str(),
            "http://localhost:4000/api/v1/user/profile"
        );
    }

    #[test]
    fn test_url_rejects_garbage_base() {
        let config = ApiConfig::new("not a url");
        assert!(matches!(config.url("/auth/me"), Err(ApiError::InvalidUrl(_))));
    }

    #[test]
    fn test_skip_list() {
        let config = ApiConfig::default();
        assert!(config.skips_refresh("/auth/login"));
        assert!(config.skips_refresh("/auth/logout/"));
        assert!(config.skips_refresh("/auth/verify-otp?email=a@b.c"));
        assert!(!config.skips_refresh("/auth/me"));
        assert!(!config.skips_refresh("/auth/refresh-token"));
        assert!(!config.skips_refresh("/auth/login/extra"));
    }
}
