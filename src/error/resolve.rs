use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::provider::port::ProviderError;

/// Integrity violations raised while resolving a principal.
///
/// None of these are "not logged in": an anonymous caller resolves to
/// `Ok(None)`. Each variant means the trust chain between identity, session,
/// role claim and profile is broken, which is a deployment or provisioning
/// defect. They are never downgraded to anonymous.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// An identity exists but its session could not be retrieved.
    #[error("identity present but session unavailable: {0}")]
    SessionUnavailable(#[source] ProviderError),

    #[error("session access token could not be decoded: {0}")]
    TokenMalformed(#[source] ProviderError),

    #[error("no user_role in session token; ensure the authorization hook is enabled")]
    RoleClaimMissing,

    #[error("session token carries unknown role `{0}`")]
    UnknownRole(String),

    /// The token was issued for a different identity than the one reported.
    #[error("session token subject `{token_sub}` does not match identity `{identity_id}`")]
    SubjectMismatch {
        identity_id: String,
        token_sub: String,
    },

    #[error("profile lookup failed for `{id}`: {source}")]
    ProfileUnavailable {
        id: String,
        #[source]
        source: ProviderError,
    },

    #[error("profile missing or without username for `{id}`")]
    ProfileMissing { id: String },
}

impl IntoResponse for ResolveError {
    /// Surfaces as a bare 500; the detail only goes to the log.
    fn into_response(self) -> Response {
        error!(error = %self, "principal resolution failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    }
}
