//! # Session Provider Port
//!
//! The boundary between the gate and the hosted identity / database service.
//!
//! The gate never talks to the backend directly; everything goes through a
//! [`SessionProvider`] injected at composition time. Production wiring uses
//! [`HttpSessionProvider`](crate::provider::http::HttpSessionProvider); tests
//! substitute an in-memory double.
//!
//! Every method takes the per-request [`Credentials`] explicitly, so a single
//! provider instance can be shared across concurrent requests without any
//! mutable state.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::credentials::Credentials;
use crate::auth::jwt::{SessionClaims, TokenError, decode_claims};
use crate::auth::principal::Identity;

/// A provider-issued session as stored in the auth cookie.
///
/// Deserializes directly from the provider's token-grant response; extra
/// fields such as `user` or `expires_in` are ignored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Expiry of `access_token` (UNIX seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
}

impl Session {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            expires_at: None,
            token_type: Some("bearer".into()),
        }
    }
}

/// A raw row of the `profiles` table.
///
/// `role` may be present on the row but is display metadata only; the gate
/// reads roles from the session token exclusively.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRow {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    /// Cleared by the backend when the account's role changes, meaning the
    /// role claim in live sessions is stale.
    #[serde(default, rename = "jwtValid")]
    pub jwt_valid: Option<bool>,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    /// No credentials were presented at all.
    #[error("auth session missing")]
    SessionMissing,

    #[error("auth session expired")]
    SessionExpired,

    /// The provider refused the presented credentials.
    #[error("provider rejected credentials (HTTP {0})")]
    Unauthorized(u16),

    #[error("invalid login credentials")]
    InvalidLogin,

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("provider request failed: {0}")]
    Transport(String),

    #[error("unexpected provider response (HTTP {status}): {message}")]
    Unexpected { status: u16, message: String },
}

/// Capability exposed by the identity / database backend.
///
/// Implementations must be `Send + Sync` so they can be shared behind an
/// `Arc` by every request handler.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Returns the caller's identity, or an error if there is none.
    async fn get_user(&self, creds: &Credentials) -> Result<Identity, ProviderError>;

    /// Returns the live session backing `creds`.
    async fn get_session(&self, creds: &Credentials) -> Result<Session, ProviderError>;

    /// Decodes the claims of an access token.
    ///
    /// The default is a local, unverified decode: verification already
    /// happened when the provider issued or refreshed the token.
    fn decode_token(&self, access_token: &str) -> Result<SessionClaims, ProviderError> {
        Ok(decode_claims(access_token)?)
    }

    /// Row-level-secured read of the profile for `id`.
    ///
    /// `Ok(None)` means the row does not exist or is not visible to the caller.
    async fn get_profile(
        &self,
        creds: &Credentials,
        id: &str,
    ) -> Result<Option<ProfileRow>, ProviderError>;

    /// Sets `jwtValid = true` on the profile row for `id`.
    async fn mark_claim_fresh(&self, creds: &Credentials, id: &str) -> Result<(), ProviderError>;

    /// Invalidates the session backing `creds`.
    async fn sign_out(&self, creds: &Credentials) -> Result<(), ProviderError>;

    /// Exchanges the refresh token of an expired session for a new one.
    ///
    /// ## Returns
    /// - `Ok(None)`: no session was presented, or it is still valid
    /// - `Ok(Some(session))`: the replacement session, to be written back to
    ///   the auth cookie
    ///
    /// ## Errors
    /// - [`ProviderError::SessionExpired`] when the session is expired and
    ///   cannot be refreshed (no refresh token, or the provider refused it)
    async fn refresh_session(&self, creds: &Credentials) -> Result<Option<Session>, ProviderError>;

    /// Exchanges an email/password pair for a new session.
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, ProviderError>;
}
