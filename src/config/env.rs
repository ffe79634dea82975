//! # Environment Variable Utilities
//!
//! Helpers for reading environment variables with type conversions and
//! fallback defaults. Used by the configuration loaders.
//!
//! # Examples
//! ```rust
//! use rbac_gate::config::env::{read_flag_from, read_string_from};
//!
//! let get = |k: &str| (k == "AUTH_COOKIE_SECURE").then(|| "off".to_string());
//! assert!(!read_flag_from(get, "AUTH_COOKIE_SECURE", true));
//! assert_eq!(read_string_from(get, "AUTH_COOKIE_NAME", "sb-auth-token"), "sb-auth-token");
//! ```

/// Reads a boolean flag using a custom provider function.
///
/// Returns `true` for any of the following case-insensitive values:
/// `"1"`, `"true"`, `"yes"`, `"on"`.
///
/// Surrounding quotes are stripped, so `"true"` and `'yes'` count too.
///
/// # Example
/// ```rust
/// use rbac_gate::config::env::read_flag_from;
///
/// let val = read_flag_from(|_| Some("true".into()), "AUTH_STALE_CLAIM_SIGNOUT", false);
/// assert!(val);
/// ```
pub fn read_flag_from<F>(provider: F, name: &str, default: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    match provider(name) {
        Some(v) => {
            let s = v.trim().trim_matches(|c| c == '"' || c == '\'');
            matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
        }
        None => default,
    }
}

/// Reads a non-empty string, falling back to `default` when unset or blank.
pub fn read_string_from<F>(provider: F, name: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    provider(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}
