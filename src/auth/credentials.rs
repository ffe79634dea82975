//! # Request credentials
//!
//! Extracts the provider session from the auth cookie and writes it back.
//!
//! The cookie value is the JSON-serialized [`Session`], either raw or
//! prefixed with `base64-` followed by the base64url encoding of that JSON
//! (the form written by this crate, which keeps the value cookie-safe).
//!
//! A missing, undecodable or unparsable cookie yields anonymous credentials:
//! it is never an error at this layer.

use axum::http::{HeaderMap, HeaderValue, header};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use tracing::debug;

use crate::provider::port::Session;

const BASE64_PREFIX: &str = "base64-";

/// Credentials presented by a single request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Credentials {
    session: Option<Session>,
}

impl Credentials {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn from_session(session: Session) -> Self {
        Self {
            session: Some(session),
        }
    }

    /// Reads the session stored under `cookie_name`.
    pub fn from_cookies(jar: &CookieJar, cookie_name: &str) -> Self {
        let Some(cookie) = jar.get(cookie_name) else {
            return Self::anonymous();
        };

        match decode_session_cookie(cookie.value()) {
            Some(session) => Self::from_session(session),
            None => {
                debug!(cookie = cookie_name, "auth cookie present but unreadable");
                Self::anonymous()
            }
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn access_token(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.access_token.as_str())
    }
}

/// Parses a cookie value into a [`Session`].
pub fn decode_session_cookie(value: &str) -> Option<Session> {
    let json = match value.strip_prefix(BASE64_PREFIX) {
        Some(encoded) => URL_SAFE_NO_PAD.decode(encoded.trim_end_matches('=')).ok()?,
        None => value.as_bytes().to_vec(),
    };

    serde_json::from_slice::<Session>(&json)
        .ok()
        .filter(|s| !s.access_token.is_empty())
}

/// Serializes a [`Session`] into the `base64-` cookie form.
pub fn encode_session_cookie(session: &Session) -> anyhow::Result<String> {
    let json = serde_json::to_vec(session)?;
    Ok(format!("{BASE64_PREFIX}{}", URL_SAFE_NO_PAD.encode(json)))
}

/// Stores `session` in the auth cookie.
pub fn set_session_cookie(
    jar: CookieJar,
    cookie_name: &str,
    session: &Session,
    secure: bool,
) -> anyhow::Result<CookieJar> {
    let cookie = Cookie::build((cookie_name.to_string(), encode_session_cookie(session)?))
        .path("/")
        .same_site(SameSite::Lax)
        .secure(secure)
        .http_only(true)
        .build();
    Ok(jar.add(cookie))
}

/// Removes the auth cookie.
pub fn clear_session_cookie(jar: CookieJar, cookie_name: &str) -> CookieJar {
    jar.remove(Cookie::build((cookie_name.to_string(), "")).path("/"))
}

/// Rewrites the request's `Cookie` header so that `cookie_name` carries
/// `session`. Every other cookie is kept as presented.
pub fn replace_session_in_headers(
    headers: &mut HeaderMap,
    cookie_name: &str,
    session: &Session,
) -> anyhow::Result<()> {
    let jar = CookieJar::from_headers(headers)
        .add(Cookie::new(cookie_name.to_string(), encode_session_cookie(session)?));
    let value = jar
        .iter()
        .map(|c| format!("{}={}", c.name(), c.value()))
        .collect::<Vec<_>>()
        .join("; ");

    headers.remove(header::COOKIE);
    headers.insert(header::COOKIE, HeaderValue::from_str(&value)?);
    Ok(())
}
