//! Engine connection settings.
//!
//! The base URL is resolved once at startup in priority order:
//! 1. `--base-url` CLI flag
//! 2. `CYBERCHEF_API_URL` environment variable
//! 3. `http://localhost:3000/`
//!
//! The resolved value is immutable and handed to the transport.
use std::time::Duration;

/// Environment variable holding the engine base URL.
pub const BASE_URL_ENV: &str = "CYBERCHEF_API_URL";

/// Base URL used when neither the flag nor the environment provide one.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/";

/// Per-request bound on blocking time.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Largest response body read from the engine, in bytes.
///
/// Byte array results arrive as JSON integer lists, roughly four bytes on
/// the wire per output byte, so this admits about 64 MiB of decoded output.
pub const MAX_RESPONSE_BYTES: u64 = 256 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Always ends with `/`.
    pub base_url: String,
    pub timeout: Duration,
    pub max_response_bytes: u64,
}

impl EngineConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
            timeout: REQUEST_TIMEOUT,
            max_response_bytes: MAX_RESPONSE_BYTES,
        }
    }

    /// Resolve from the CLI flag and the process environment.
    pub fn resolve(flag: Option<&str>) -> Self {
        let env_value = std::env::var(BASE_URL_ENV).ok();
        Self::from_sources(flag, env_value.as_deref())
    }

    /// Resolve from explicit sources; blank values count as unset.
    pub fn from_sources(flag: Option<&str>, env_value: Option<&str>) -> Self {
        let non_blank = |value: &&str| !value.trim().is_empty();
        if let Some(url) = flag.filter(non_blank) {
            return Self::new(url);
        }
        if let Some(url) = env_value.filter(non_blank) {
            return Self::new(url);
        }
        tracing::warn!(
            "There is no environment variable {BASE_URL_ENV} defaulting to {DEFAULT_BASE_URL}"
        );
        Self::new(DEFAULT_BASE_URL)
    }

    /// Full URL for an endpoint relative to the base (e.g. `batch/bake`).
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint.trim_start_matches('/'))
    }
}

fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    }
}
