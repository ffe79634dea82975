//! # Session token decoding
//!
//! Reads claims out of the provider-issued access token.
//!
//! Two entry points exist:
//! - [`decode_claims`]: local, **unverified** decode of the payload segment.
//!   Signature verification is the provider's job at issuance/refresh; the
//!   token only reaches us after the provider has accepted it.
//! - [`decode_verified`]: HS256 verification with a shared secret, used when
//!   the deployment supplies one (`PROVIDER_JWT_SECRET`).

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Claims the gate cares about.
///
/// Unknown claims in the payload are ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject, the identity id the token was issued for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Role injected by the provider's access-token hook.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_role: Option<String>,
    /// Expiration (UNIX seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("token rejected: {0}")]
    Rejected(#[from] jsonwebtoken::errors::Error),
}

/// Decodes the payload of a compact JWT without checking its signature.
///
/// ## Errors
/// - the token does not have exactly three `.`-separated segments
/// - the payload is not base64url
/// - the payload is not a JSON object
///
/// ## Example
/// ```
/// use rbac_gate::auth::jwt::decode_claims;
///
/// // {"alg":"none"} . {"sub":"u1","user_role":"admin"} . (no signature)
/// let token = "eyJhbGciOiJub25lIn0.eyJzdWIiOiJ1MSIsInVzZXJfcm9sZSI6ImFkbWluIn0.";
/// let claims = decode_claims(token).unwrap();
/// assert_eq!(claims.user_role.as_deref(), Some("admin"));
/// ```
pub fn decode_claims(token: &str) -> Result<SessionClaims, TokenError> {
    let mut parts = token.split('.');
    let (Some(_header), Some(payload), Some(_signature)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(TokenError::Malformed("expected three segments".into()));
    };
    if parts.next().is_some() {
        return Err(TokenError::Malformed("expected three segments".into()));
    }

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| TokenError::Malformed(format!("payload is not base64url: {e}")))?;

    serde_json::from_slice(&bytes)
        .map_err(|e| TokenError::Malformed(format!("payload is not a claims object: {e}")))
}

/// Verifies an HS256 token against `secret` and returns its claims.
///
/// Expiration is enforced; audience is not (the provider scopes audiences).
pub fn decode_verified(token: &str, secret: &str) -> Result<SessionClaims, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_aud = false;

    let data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;

    Ok(data.claims)
}

/// Signs claims for tests that need a realistic access token.
#[cfg(test)]
pub(crate) fn sign_claims(claims: &SessionClaims, secret: &str) -> String {
    use jsonwebtoken::{EncodingKey, Header, encode};

    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("test token encodes")
}
