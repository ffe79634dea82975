//! # Application Configuration Loader
//!
//! Unified configuration for the gate: provider connection, auth cookie,
//! HTTP listener and the stale-claim policy.
//!
//! Automatically loads `.env` files for non-production environments.
//! It checks for a custom `DOTENV_FILE` path first, then falls back to
//! `.env.{APP_ENV}` or `.env`.
//!
//! # Environment Variables
//! | Variable | Description | Default |
//! |-----------|-------------|----------|
//! | `APP_ENV` | Current environment (`development`, `production`, etc.) | `"development"` |
//! | `DOTENV_FILE` | Optional path to a custom dotenv file | *none* |
//! | `PROVIDER_URL` | Backend base URL | *required* |
//! | `PROVIDER_ANON_KEY` | Backend public API key | *required* |
//! | `PROVIDER_JWT_SECRET` | HS256 secret for verified token decoding | *none* |
//! | `PROVIDER_TIMEOUT_SECS` | HTTP client timeout | `10` |
//! | `AUTH_COOKIE_NAME` | Session cookie name | `"sb-auth-token"` |
//! | `AUTH_COOKIE_SECURE` | `Secure` flag on the session cookie | `true` |
//! | `AUTH_STALE_CLAIM_SIGNOUT` | Sign out sessions whose role claim is stale | `false` |
//! | `HTTP_BIND_ADDR` | Listen address | `"127.0.0.1:3000"` |
//!
//! # Example
//! ```rust,no_run
//! use rbac_gate::config::app::AppConfig;
//!
//! let cfg = AppConfig::from_env();
//! if !cfg.provider.is_valid() {
//!     eprintln!("PROVIDER_URL / PROVIDER_ANON_KEY missing");
//! }
//! ```

use std::env;

use crate::auth::resolver::StaleClaimPolicy;
use crate::config::{
    env::read_flag_from,
    provider::ProviderConfig,
    web::{AuthCookieConfig, HttpConfig},
};

/// Top-level application configuration.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub app_env: String,
    pub provider: ProviderConfig,
    pub cookie: AuthCookieConfig,
    pub http: HttpConfig,
    pub stale_claims: StaleClaimPolicy,
}

impl AppConfig {
    /// Loads application configuration from environment variables.
    ///
    /// ## Behavior
    /// - Reads `APP_ENV` (defaults to `"development"`).
    /// - Loads `.env` or `.env.{APP_ENV}` for non-production environments.
    /// - Parses all supported environment variables and falls back to defaults.
    pub fn from_env() -> Self {
        let app_env = env::var("APP_ENV").unwrap_or_else(|_| "development".into());

        if app_env != "production" {
            if let Ok(path) = env::var("DOTENV_FILE") {
                let _ = dotenvy::from_filename(path);
            } else {
                let candidate = format!(".env.{}", app_env);
                dotenvy::from_filename(&candidate)
                    .or_else(|_| dotenvy::dotenv())
                    .ok();
            }
        }

        let mut cfg = Self::from_env_with(|k| env::var(k).ok());
        cfg.app_env = app_env;
        cfg
    }

    /// Builds the configuration from a custom key provider, without touching
    /// dotenv files.
    pub fn from_env_with<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let stale_claims = if read_flag_from(&get, "AUTH_STALE_CLAIM_SIGNOUT", false) {
            StaleClaimPolicy::SignOut
        } else {
            StaleClaimPolicy::Ignore
        };

        AppConfig {
            app_env: get("APP_ENV").unwrap_or_else(|| "development".into()),
            provider: ProviderConfig::from_env_with(&get),
            cookie: AuthCookieConfig::from_env_with(&get),
            http: HttpConfig::from_env_with(&get),
            stale_claims,
        }
    }

    pub fn is_production(&self) -> bool {
        self.app_env == "production"
    }
}
