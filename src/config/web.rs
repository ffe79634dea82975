//! # HTTP and Auth Cookie Configuration
//!
//! Settings for the HTTP listener and for the cookie carrying the provider
//! session.
//!
//! # Examples
//! ```rust
//! use rbac_gate::config::web::{AuthCookieConfig, HttpConfig};
//!
//! let http = HttpConfig::from_env_with(|_| None);
//! let cookie = AuthCookieConfig::from_env_with(|_| None);
//!
//! assert_eq!(http.bind_addr, "127.0.0.1:3000");
//! assert_eq!(cookie.name, "sb-auth-token");
//! assert!(cookie.secure);
//! ```

use crate::config::env::{read_flag_from, read_string_from};

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_COOKIE_NAME: &str = "sb-auth-token";

/// HTTP listener configuration (`HTTP_BIND_ADDR`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpConfig {
    pub bind_addr: String,
}

impl HttpConfig {
    pub fn from_env_with<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            bind_addr: read_string_from(get, "HTTP_BIND_ADDR", DEFAULT_BIND_ADDR),
        }
    }
}

/// Auth cookie configuration.
///
/// - `AUTH_COOKIE_NAME`: cookie holding the session (default `sb-auth-token`)
/// - `AUTH_COOKIE_SECURE`: `Secure` flag (default `true`)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthCookieConfig {
    pub name: String,
    pub secure: bool,
}

impl AuthCookieConfig {
    pub fn from_env_with<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            name: read_string_from(&get, "AUTH_COOKIE_NAME", DEFAULT_COOKIE_NAME),
            secure: read_flag_from(&get, "AUTH_COOKIE_SECURE", true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_config_reads_bind_addr() {
        let cfg = HttpConfig::from_env_with(|k| (k == "HTTP_BIND_ADDR").then(|| "0.0.0.0:8080".into()));
        assert_eq!(cfg.bind_addr, "0.0.0.0:8080");
    }

    #[test]
    fn cookie_config_respects_overrides() {
        let cfg = AuthCookieConfig::from_env_with(|k| match k {
            "AUTH_COOKIE_NAME" => Some("session".into()),
            "AUTH_COOKIE_SECURE" => Some("false".into()),
            _ => None,
        });

        assert_eq!(cfg.name, "session");
        assert!(!cfg.secure);
    }

    #[test]
    fn configs_are_clone_and_debug() {
        let cfg = AuthCookieConfig::from_env_with(|_| None);
        assert_eq!(cfg.clone(), cfg);
        assert!(format!("{cfg:?}").contains("sb-auth-token"));
    }
}
