//! API endpoint configuration.
//!
//! SYSTEM CONTEXT
//! ==============
//! The browser build bakes `PROMPTWORKS_API_BASE_URL` in at compile time; the
//! CLI reads the same variable at startup. Both go through
//! [`normalize_base_url`] so the gateway can always append `/path`.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api/v1";

/// Environment variable naming the API base URL.
pub const API_BASE_URL_ENV: &str = "PROMPTWORKS_API_BASE_URL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
}

impl ClientConfig {
    pub fn new(base_url: Option<&str>) -> Self {
        Self { base_url: normalize_base_url(base_url) }
    }

    /// Config for the browser build, from the compile-time environment.
    pub fn from_build_env() -> Self {
        Self::new(option_env!("PROMPTWORKS_API_BASE_URL"))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Fall back to [`DEFAULT_API_BASE_URL`] for absent/blank input and strip a
/// trailing slash.
pub fn normalize_base_url(raw: Option<&str>) -> String {
    let Some(url) = raw.map(str::trim).filter(|url| !url.is_empty()) else {
        return DEFAULT_API_BASE_URL.to_owned();
    };
    url.strip_suffix('/').unwrap_or(url).to_owned()
}

/// Join `base` and `path`, inserting a leading slash on `path` if missing.
pub fn join_url(base: &str, path: &str) -> String {
    if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}
