//! # Session Resolver
//!
//! Turns the credentials of one request into an [`AuthenticatedPrincipal`].
//!
//! ## Outcomes
//! - `Ok(None)`: anonymous caller (no identity). Expected, not an error.
//! - `Ok(Some(principal))`: identity, session, role claim and profile agree.
//! - `Err(ResolveError)`: the trust chain is inconsistent. Fatal: callers
//!   surface it as a 500 and never treat it as "logged out".
//!
//! Provider calls run strictly in sequence (identity → session → profile);
//! each step needs the previous one's result. Nothing is cached between
//! calls, so every enforcement point resolves independently.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::auth::credentials::Credentials;
use crate::auth::principal::{AuthenticatedPrincipal, Profile};
use crate::auth::role::Role;
use crate::error::resolve::ResolveError;
use crate::provider::port::{ProviderError, SessionProvider};

/// What to do when the profile row says the role claim is stale
/// (`jwtValid = false`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StaleClaimPolicy {
    /// Keep trusting the token claim until it is re-issued.
    #[default]
    Ignore,
    /// Mark the row fresh, sign the session out and treat the caller as
    /// anonymous so the next sign-in picks up the new claim.
    SignOut,
}

/// Outcome of [`SessionResolver::resolve_outcome`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Resolution {
    pub principal: Option<AuthenticatedPrincipal>,
    /// The resolver signed the session out (stale role claim); the auth
    /// cookie no longer refers to a live session.
    pub signed_out: bool,
}

#[derive(Clone)]
pub struct SessionResolver {
    provider: Arc<dyn SessionProvider>,
    stale_claims: StaleClaimPolicy,
}

impl SessionResolver {
    pub fn new(provider: Arc<dyn SessionProvider>) -> Self {
        Self {
            provider,
            stale_claims: StaleClaimPolicy::default(),
        }
    }

    pub fn with_stale_claim_policy(mut self, policy: StaleClaimPolicy) -> Self {
        self.stale_claims = policy;
        self
    }

    pub fn provider(&self) -> &Arc<dyn SessionProvider> {
        &self.provider
    }

    /// Resolves the principal behind `creds`.
    ///
    /// ## Arguments
    /// - `creds`: the credentials presented by the current request
    ///
    /// ## Returns
    /// - `Ok(Some(principal))` when identity, session, role claim and profile
    ///   agree
    /// - `Ok(None)` for an anonymous caller, including one whose identity
    ///   lookup failed
    ///
    /// ## Errors
    /// Any [`ResolveError`]; see the module docs.
    pub async fn resolve(
        &self,
        creds: &Credentials,
    ) -> Result<Option<AuthenticatedPrincipal>, ResolveError> {
        Ok(self.resolve_outcome(creds).await?.principal)
    }

    /// Like [`resolve`](Self::resolve), but also reports whether the
    /// provider session was revoked on the way, so the caller can drop the
    /// auth cookie.
    pub async fn resolve_outcome(&self, creds: &Credentials) -> Result<Resolution, ResolveError> {
        let identity = match self.provider.get_user(creds).await {
            Ok(identity) => identity,
            Err(ProviderError::SessionMissing) => {
                debug!("no auth session; resolving as anonymous");
                return Ok(Resolution::default());
            }
            Err(e) => {
                warn!(error = %e, "identity lookup failed; resolving as anonymous");
                return Ok(Resolution::default());
            }
        };

        let session = self
            .provider
            .get_session(creds)
            .await
            .map_err(ResolveError::SessionUnavailable)?;

        let claims = self
            .provider
            .decode_token(&session.access_token)
            .map_err(ResolveError::TokenMalformed)?;

        if let Some(sub) = claims.sub.as_deref() {
            if sub != identity.id {
                return Err(ResolveError::SubjectMismatch {
                    identity_id: identity.id,
                    token_sub: sub.to_string(),
                });
            }
        }

        let role = claims
            .user_role
            .as_deref()
            .ok_or(ResolveError::RoleClaimMissing)?
            .parse::<Role>()
            .map_err(|e| ResolveError::UnknownRole(e.0))?;

        let row = self
            .provider
            .get_profile(creds, &identity.id)
            .await
            .map_err(|source| ResolveError::ProfileUnavailable {
                id: identity.id.clone(),
                source,
            })?;

        let Some(row) = row else {
            return Err(ResolveError::ProfileMissing { id: identity.id });
        };
        let username = match row.username {
            Some(name) if !name.is_empty() => name,
            _ => return Err(ResolveError::ProfileMissing { id: identity.id }),
        };

        if self.stale_claims == StaleClaimPolicy::SignOut && row.jwt_valid == Some(false) {
            self.force_reauthentication(creds, &identity.id).await;
            return Ok(Resolution {
                principal: None,
                signed_out: true,
            });
        }

        Ok(Resolution {
            principal: Some(AuthenticatedPrincipal::new(
                identity,
                role,
                Profile { username },
            )),
            signed_out: false,
        })
    }

    /// Best effort: a failure here leaves the caller anonymous anyway.
    async fn force_reauthentication(&self, creds: &Credentials, id: &str) {
        info!(user_id = id, "role claim is stale; forcing sign-out");

        if let Err(e) = self.provider.mark_claim_fresh(creds, id).await {
            warn!(user_id = id, error = %e, "failed to reset stale-claim flag");
        }
        if let Err(e) = self.provider.sign_out(creds).await {
            warn!(user_id = id, error = %e, "forced sign-out failed");
        }
    }
}
