//! # Provider Configuration
//!
//! Connection settings for the hosted identity / database backend.
//!
//! Reads from environment variables:
//! - `PROVIDER_URL`: backend base URL (e.g. `https://xyz.example.co`)
//! - `PROVIDER_ANON_KEY`: public API key sent as `apikey`
//! - `PROVIDER_JWT_SECRET`: optional HS256 secret; enables verified decoding
//! - `PROVIDER_TIMEOUT_SECS`: HTTP client timeout (default `10`)
//!
//! # Examples
//! ```rust
//! use rbac_gate::config::provider::ProviderConfig;
//!
//! let cfg = ProviderConfig::from_env_with(|k| match k {
//!     "PROVIDER_URL" => Some("http://localhost:54321".into()),
//!     "PROVIDER_ANON_KEY" => Some("anon".into()),
//!     _ => None,
//! });
//! assert!(cfg.is_valid());
//! assert_eq!(cfg.timeout_secs, 10);
//! ```

use std::env;

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub url: Option<String>,
    pub anon_key: Option<String>,
    pub jwt_secret: Option<String>,
    pub timeout_secs: u64,
}

impl ProviderConfig {
    pub fn from_env() -> Self {
        Self::from_env_with(|k| env::var(k).ok())
    }

    /// Loads configuration using a custom key provider (for testing/mocking).
    pub fn from_env_with<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |k: &str| get(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Self {
            url: non_empty("PROVIDER_URL").map(|u| u.trim_end_matches('/').to_string()),
            anon_key: non_empty("PROVIDER_ANON_KEY"),
            jwt_secret: non_empty("PROVIDER_JWT_SECRET"),
            timeout_secs: non_empty("PROVIDER_TIMEOUT_SECS")
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Returns `true` if both the URL and the anon key are present.
    pub fn is_valid(&self) -> bool {
        self.url.is_some() && self.anon_key.is_some()
    }
}

// Secrets stay out of logs.
impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("url", &self.url)
            .field("anon_key", &self.anon_key.as_ref().map(|_| "***"))
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "***"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
