//! In-memory [`SessionProvider`] test double.
//!
//! Ignores the presented credentials and answers from its configured state,
//! recording every call so tests can assert what the gate asked for.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, Utc};

use crate::auth::credentials::Credentials;
use crate::auth::jwt::{SessionClaims, sign_claims};
use crate::auth::principal::Identity;
use crate::provider::port::{ProfileRow, ProviderError, Session, SessionProvider};

pub(crate) const TEST_SECRET: &str = "fake-provider-secret";
pub(crate) const TEST_PASSWORD: &str = "Passw0rd!";

#[derive(Default)]
pub(crate) struct FakeProvider {
    pub identity: Option<Identity>,
    pub session: Option<Session>,
    pub profile: Option<ProfileRow>,
    pub profile_fails: bool,
    pub user_fails: bool,
    /// What `refresh_session` answers; `None` means "still valid".
    pub refresh: Option<Result<Session, ()>>,
    pub calls: Mutex<Vec<&'static str>>,
}

impl FakeProvider {
    /// Nobody is signed in.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A consistent signed-in account whose token carries `role_claim`.
    pub fn signed_in(id: &str, role_claim: Option<&str>, username: &str) -> Self {
        let claims = SessionClaims {
            sub: Some(id.to_string()),
            user_role: role_claim.map(String::from),
            exp: Some((Utc::now() + Duration::hours(1)).timestamp()),
            email: Some(format!("{username}@example.com")),
        };

        Self {
            identity: Some(Identity::new(id).with_email(format!("{username}@example.com"))),
            session: Some(Session::new(sign_claims(&claims, TEST_SECRET))),
            profile: Some(ProfileRow {
                id: Some(id.to_string()),
                username: Some(username.to_string()),
                role: role_claim.map(String::from),
                jwt_valid: Some(true),
            }),
            ..Self::default()
        }
    }

    pub fn user(username: &str) -> Self {
        Self::signed_in(&format!("id-{username}"), Some("user"), username)
    }

    pub fn admin(username: &str) -> Self {
        Self::signed_in(&format!("id-{username}"), Some("admin"), username)
    }

    pub fn without_session(mut self) -> Self {
        self.session = None;
        self
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.session = Some(Session::new(token));
        self
    }

    pub fn with_profile(mut self, profile: Option<ProfileRow>) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_failing_profile(mut self) -> Self {
        self.profile_fails = true;
        self
    }

    /// Identity lookup fails with a transport error.
    pub fn with_failing_user(mut self) -> Self {
        self.user_fails = true;
        self
    }

    /// The presented session is expired and refreshes into `session`.
    pub fn with_refreshed_session(mut self, session: Session) -> Self {
        self.refresh = Some(Ok(session));
        self
    }

    /// The presented session is expired and the refresh token is refused.
    pub fn with_unrefreshable_session(mut self) -> Self {
        self.refresh = Some(Err(()));
        self
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl SessionProvider for FakeProvider {
    async fn get_user(&self, _creds: &Credentials) -> Result<Identity, ProviderError> {
        self.record("get_user");
        if self.user_fails {
            return Err(ProviderError::Transport("connection reset by peer".into()));
        }
        self.identity.clone().ok_or(ProviderError::SessionMissing)
    }

    async fn get_session(&self, _creds: &Credentials) -> Result<Session, ProviderError> {
        self.record("get_session");
        self.session.clone().ok_or(ProviderError::SessionMissing)
    }

    async fn get_profile(
        &self,
        _creds: &Credentials,
        _id: &str,
    ) -> Result<Option<ProfileRow>, ProviderError> {
        self.record("get_profile");
        if self.profile_fails {
            return Err(ProviderError::Unexpected {
                status: 500,
                message: "relation \"profiles\" does not exist".into(),
            });
        }
        Ok(self.profile.clone())
    }

    async fn mark_claim_fresh(&self, _creds: &Credentials, _id: &str) -> Result<(), ProviderError> {
        self.record("mark_claim_fresh");
        Ok(())
    }

    async fn sign_out(&self, _creds: &Credentials) -> Result<(), ProviderError> {
        self.record("sign_out");
        Ok(())
    }

    async fn refresh_session(&self, _creds: &Credentials) -> Result<Option<Session>, ProviderError> {
        self.record("refresh_session");
        match &self.refresh {
            None => Ok(None),
            Some(Ok(session)) => Ok(Some(session.clone())),
            Some(Err(())) => Err(ProviderError::SessionExpired),
        }
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, ProviderError> {
        self.record("sign_in_with_password");
        let known = self.identity.as_ref().and_then(|i| i.email.as_deref()) == Some(email);
        match (&self.session, known && password == TEST_PASSWORD) {
            (Some(session), true) => Ok(session.clone()),
            _ => Err(ProviderError::InvalidLogin),
        }
    }
}
