//! # HTTP Session Provider
//!
//! [`SessionProvider`] adapter for a hosted backend exposing a GoTrue-style
//! auth API (`/auth/v1/...`) and a PostgREST-style table API (`/rest/v1/...`).
//!
//! Every request carries the project's `apikey` header. Calls made on behalf
//! of a caller also carry the caller's access token as a bearer token, so the
//! backend's row-level security sees the caller, not this service.
//!
//! Expired sessions are renewed through the refresh-token grant
//! ([`SessionProvider::refresh_session`]); the edge middleware writes the
//! renewed session back to the auth cookie.
//!
//! # Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use rbac_gate::config::provider::ProviderConfig;
//! use rbac_gate::provider::http::HttpSessionProvider;
//!
//! let cfg = ProviderConfig::from_env();
//! let provider = Arc::new(HttpSessionProvider::new(&cfg).expect("provider"));
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::json;
use tracing::debug;

use crate::auth::credentials::Credentials;
use crate::auth::jwt::{SessionClaims, decode_claims, decode_verified};
use crate::auth::principal::Identity;
use crate::config::provider::ProviderConfig;
use crate::provider::port::{ProfileRow, ProviderError, Session, SessionProvider};
use crate::time::clock::Clock;
use crate::time::system_clock::SystemClock;

const PROFILES_TABLE: &str = "profiles";

/// Upper bound on how much of an error body ends up in an error message.
const MAX_ERROR_BODY: usize = 256;

pub struct HttpSessionProvider {
    base_url: String,
    anon_key: String,
    jwt_secret: Option<String>,
    client: Client,
    clock: Arc<dyn Clock>,
}

impl HttpSessionProvider {
    /// Builds a provider from configuration.
    ///
    /// # Errors
    /// - `PROVIDER_URL` or `PROVIDER_ANON_KEY` is missing
    /// - the HTTP client cannot be built
    pub fn new(cfg: &ProviderConfig) -> anyhow::Result<Self> {
        let base_url = cfg
            .url
            .clone()
            .ok_or_else(|| anyhow::anyhow!("PROVIDER_URL is not set"))?;
        let anon_key = cfg
            .anon_key
            .clone()
            .ok_or_else(|| anyhow::anyhow!("PROVIDER_ANON_KEY is not set"))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key,
            jwt_secret: cfg.jwt_secret.clone(),
            client,
            clock: Arc::new(SystemClock),
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.base_url)
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    fn is_expired(&self, session: &Session) -> bool {
        session
            .expires_at
            .is_some_and(|expires_at| expires_at <= self.clock.now().timestamp())
    }

    /// Attaches `apikey` and, when present, the caller's bearer token.
    fn authorized(&self, req: RequestBuilder, creds: &Credentials) -> RequestBuilder {
        let req = req.header("apikey", &self.anon_key);
        match creds.access_token() {
            Some(token) => req.bearer_auth(token),
            None => req.bearer_auth(&self.anon_key),
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        ProviderError::Transport(e.to_string())
    }
}

async fn unexpected(resp: Response) -> ProviderError {
    let status = resp.status().as_u16();
    let mut message = resp.text().await.unwrap_or_default();
    if message.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !message.is_char_boundary(cut) {
            cut -= 1;
        }
        message.truncate(cut);
    }
    ProviderError::Unexpected { status, message }
}

fn is_auth_rejection(status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN
}

#[async_trait]
impl SessionProvider for HttpSessionProvider {
    async fn get_user(&self, creds: &Credentials) -> Result<Identity, ProviderError> {
        if creds.access_token().is_none() {
            return Err(ProviderError::SessionMissing);
        }

        let resp = self
            .authorized(self.client.get(self.auth_url("user")), creds)
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            Ok(resp.json::<Identity>().await?)
        } else if is_auth_rejection(status) {
            Err(ProviderError::Unauthorized(status.as_u16()))
        } else {
            Err(unexpected(resp).await)
        }
    }

    async fn get_session(&self, creds: &Credentials) -> Result<Session, ProviderError> {
        let session = creds.session().ok_or(ProviderError::SessionMissing)?;

        if self.is_expired(session) {
            return Err(ProviderError::SessionExpired);
        }

        Ok(session.clone())
    }

    fn decode_token(&self, access_token: &str) -> Result<SessionClaims, ProviderError> {
        let claims = match self.jwt_secret.as_deref() {
            Some(secret) => decode_verified(access_token, secret)?,
            None => decode_claims(access_token)?,
        };
        Ok(claims)
    }

    async fn get_profile(
        &self,
        creds: &Credentials,
        id: &str,
    ) -> Result<Option<ProfileRow>, ProviderError> {
        let resp = self
            .authorized(self.client.get(self.rest_url(PROFILES_TABLE)), creds)
            .query(&[("id", format!("eq.{id}")), ("select", "*".to_string())])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(unexpected(resp).await);
        }

        let rows = resp.json::<Vec<ProfileRow>>().await?;
        if rows.len() > 1 {
            debug!(user_id = id, rows = rows.len(), "multiple profile rows; using the first");
        }
        Ok(rows.into_iter().next())
    }

    async fn mark_claim_fresh(&self, creds: &Credentials, id: &str) -> Result<(), ProviderError> {
        let resp = self
            .authorized(self.client.patch(self.rest_url(PROFILES_TABLE)), creds)
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=minimal")
            .json(&json!({ "jwtValid": true }))
            .send()
            .await?;

        if resp.status().is_success() {
            Ok(())
        } else {
            Err(unexpected(resp).await)
        }
    }

    async fn sign_out(&self, creds: &Credentials) -> Result<(), ProviderError> {
        if creds.access_token().is_none() {
            return Ok(());
        }

        let resp = self
            .authorized(self.client.post(self.auth_url("logout")), creds)
            .send()
            .await?;

        let status = resp.status();
        // A session the backend no longer knows about is already signed out.
        if status.is_success() || is_auth_rejection(status) || status == StatusCode::NOT_FOUND {
            Ok(())
        } else {
            Err(unexpected(resp).await)
        }
    }

    async fn refresh_session(&self, creds: &Credentials) -> Result<Option<Session>, ProviderError> {
        let Some(session) = creds.session() else {
            return Ok(None);
        };
        if !self.is_expired(session) {
            return Ok(None);
        }
        let Some(refresh_token) = session.refresh_token.as_deref() else {
            return Err(ProviderError::SessionExpired);
        };

        let resp = self
            .authorized(self.client.post(self.auth_url("token")), &Credentials::anonymous())
            .query(&[("grant_type", "refresh_token")])
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            Ok(Some(resp.json::<Session>().await?))
        } else if status == StatusCode::BAD_REQUEST || is_auth_rejection(status) {
            Err(ProviderError::SessionExpired)
        } else {
            Err(unexpected(resp).await)
        }
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, ProviderError> {
        let resp = self
            .authorized(self.client.post(self.auth_url("token")), &Credentials::anonymous())
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            Ok(resp.json::<Session>().await?)
        } else if status == StatusCode::BAD_REQUEST || is_auth_rejection(status) {
            Err(ProviderError::InvalidLogin)
        } else {
            Err(unexpected(resp).await)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use axum::{
        Json, Router,
        extract::Query,
        http::{HeaderMap, StatusCode as AxumStatus},
        response::IntoResponse,
        routing::{get, post},
    };
    use chrono::{TimeZone, Utc};
    use serde_json::Value;

    use crate::time::clock::FixedClock;

    const ANON: &str = "anon-key";
    const GOOD_TOKEN: &str = "good-token";

    fn bearer_is(headers: &HeaderMap, token: &str) -> bool {
        headers.get("apikey").and_then(|v| v.to_str().ok()) == Some(ANON)
            && headers.get("authorization").and_then(|v| v.to_str().ok())
                == Some(format!("Bearer {token}").as_str())
    }

    async fn user(headers: HeaderMap) -> impl IntoResponse {
        if bearer_is(&headers, GOOD_TOKEN) {
            (AxumStatus::OK, Json(json!({ "id": "u1", "email": "alice@example.com", "aud": "authenticated" })))
        } else if bearer_is(&headers, "explode") {
            (AxumStatus::BAD_GATEWAY, Json(json!({ "msg": "upstream down" })))
        } else {
            (AxumStatus::UNAUTHORIZED, Json(json!({ "msg": "invalid JWT" })))
        }
    }

    async fn profiles(
        headers: HeaderMap,
        Query(q): Query<HashMap<String, String>>,
    ) -> impl IntoResponse {
        if !bearer_is(&headers, GOOD_TOKEN) {
            return (AxumStatus::OK, Json(json!([])));
        }
        match q.get("id").map(String::as_str) {
            Some("eq.u1") => (
                AxumStatus::OK,
                Json(json!([{ "id": "u1", "username": "alice", "jwtValid": false }])),
            ),
            Some("eq.broken") => (AxumStatus::INTERNAL_SERVER_ERROR, Json(json!({ "message": "boom" }))),
            _ => (AxumStatus::OK, Json(json!([]))),
        }
    }

    async fn patch_profile(
        headers: HeaderMap,
        Query(q): Query<HashMap<String, String>>,
        Json(body): Json<Value>,
    ) -> AxumStatus {
        if bearer_is(&headers, GOOD_TOKEN)
            && q.get("id").map(String::as_str) == Some("eq.u1")
            && body == json!({ "jwtValid": true })
        {
            AxumStatus::NO_CONTENT
        } else {
            AxumStatus::BAD_REQUEST
        }
    }

    async fn logout(headers: HeaderMap) -> AxumStatus {
        if bearer_is(&headers, GOOD_TOKEN) {
            AxumStatus::NO_CONTENT
        } else if bearer_is(&headers, "explode") {
            AxumStatus::INTERNAL_SERVER_ERROR
        } else {
            AxumStatus::UNAUTHORIZED
        }
    }

    async fn token(
        Query(q): Query<HashMap<String, String>>,
        Json(body): Json<Value>,
    ) -> impl IntoResponse {
        if q.get("grant_type").map(String::as_str) == Some("refresh_token") {
            return if body["refresh_token"] == "refresh-1" {
                (
                    AxumStatus::OK,
                    Json(json!({
                        "access_token": GOOD_TOKEN,
                        "token_type": "bearer",
                        "expires_at": 4_102_444_800i64,
                        "refresh_token": "refresh-2"
                    })),
                )
            } else {
                (AxumStatus::BAD_REQUEST, Json(json!({ "error": "invalid_grant" })))
            };
        }

        let ok = q.get("grant_type").map(String::as_str) == Some("password")
            && body["email"] == "alice@example.com"
            && body["password"] == "Passw0rd!";
        if ok {
            (
                AxumStatus::OK,
                Json(json!({
                    "access_token": GOOD_TOKEN,
                    "token_type": "bearer",
                    "expires_in": 3600,
                    "expires_at": 4_102_444_800i64,
                    "refresh_token": "refresh-1",
                    "user": { "id": "u1" }
                })),
            )
        } else {
            (AxumStatus::BAD_REQUEST, Json(json!({ "error": "invalid_grant" })))
        }
    }

    async fn spawn_backend() -> String {
        let app = Router::new()
            .route("/auth/v1/user", get(user))
            .route("/auth/v1/logout", post(logout))
            .route("/auth/v1/token", post(token))
            .route("/rest/v1/profiles", get(profiles).patch(patch_profile));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    async fn provider() -> HttpSessionProvider {
        let cfg = ProviderConfig {
            url: Some(spawn_backend().await),
            anon_key: Some(ANON.into()),
            jwt_secret: None,
            timeout_secs: 5,
        };
        HttpSessionProvider::new(&cfg).unwrap()
    }

    fn creds(token: &str) -> Credentials {
        Credentials::from_session(Session::new(token))
    }

    #[test]
    fn new_requires_url_and_key() {
        let cfg = ProviderConfig {
            url: None,
            anon_key: Some(ANON.into()),
            jwt_secret: None,
            timeout_secs: 1,
        };
        let err = HttpSessionProvider::new(&cfg).err().expect("missing url");
        assert!(err.to_string().contains("PROVIDER_URL"));

        let cfg = ProviderConfig {
            url: Some("http://localhost".into()),
            anon_key: None,
            ..cfg
        };
        let err = HttpSessionProvider::new(&cfg).err().expect("missing key");
        assert!(err.to_string().contains("PROVIDER_ANON_KEY"));
    }

    #[tokio::test]
    async fn get_user_returns_identity_for_valid_token() {
        let p = provider().await;

        let identity = p.get_user(&creds(GOOD_TOKEN)).await.unwrap();

        assert_eq!(identity, Identity::new("u1").with_email("alice@example.com"));
    }

    #[tokio::test]
    async fn get_user_without_credentials_is_session_missing() {
        let p = provider().await;

        let err = p.get_user(&Credentials::anonymous()).await.unwrap_err();

        assert!(matches!(err, ProviderError::SessionMissing));
    }

    #[tokio::test]
    async fn get_user_maps_rejection_and_failures() {
        let p = provider().await;

        let err = p.get_user(&creds("stale-token")).await.unwrap_err();
        assert!(matches!(err, ProviderError::Unauthorized(401)));

        let err = p.get_user(&creds("explode")).await.unwrap_err();
        assert!(matches!(err, ProviderError::Unexpected { status: 502, .. }));
    }

    #[tokio::test]
    async fn get_session_checks_expiry_against_clock() {
        let now = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        let p = provider().await.with_clock(Arc::new(FixedClock(now)));

        let mut session = Session::new(GOOD_TOKEN);
        session.expires_at = Some(now.timestamp() + 60);
        let live = p.get_session(&Credentials::from_session(session.clone())).await.unwrap();
        assert_eq!(live, session);

        session.expires_at = Some(now.timestamp());
        let err = p.get_session(&Credentials::from_session(session)).await.unwrap_err();
        assert!(matches!(err, ProviderError::SessionExpired));

        let err = p.get_session(&Credentials::anonymous()).await.unwrap_err();
        assert!(matches!(err, ProviderError::SessionMissing));
    }

    #[tokio::test]
    async fn refresh_session_exchanges_refresh_token_once_expired() {
        let now = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        let p = provider().await.with_clock(Arc::new(FixedClock(now)));

        let mut session = Session::new("expired-token");
        session.refresh_token = Some("refresh-1".into());
        session.expires_at = Some(now.timestamp() - 1);

        let renewed = p
            .refresh_session(&Credentials::from_session(session.clone()))
            .await
            .unwrap()
            .expect("renewed session");
        assert_eq!(renewed.access_token, GOOD_TOKEN);
        assert_eq!(renewed.refresh_token.as_deref(), Some("refresh-2"));

        session.refresh_token = Some("revoked".into());
        let err = p
            .refresh_session(&Credentials::from_session(session.clone()))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::SessionExpired));

        session.refresh_token = None;
        let err = p
            .refresh_session(&Credentials::from_session(session))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::SessionExpired));
    }

    #[tokio::test]
    async fn refresh_session_leaves_live_and_missing_sessions_alone() {
        let now = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        let p = provider().await.with_clock(Arc::new(FixedClock(now)));

        let mut live = Session::new(GOOD_TOKEN);
        live.refresh_token = Some("refresh-1".into());
        live.expires_at = Some(now.timestamp() + 60);

        assert!(p.refresh_session(&Credentials::from_session(live)).await.unwrap().is_none());
        assert!(p.refresh_session(&Credentials::anonymous()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn get_profile_reads_row_level_secured_row() {
        let p = provider().await;

        let row = p.get_profile(&creds(GOOD_TOKEN), "u1").await.unwrap().expect("row");
        assert_eq!(row.username.as_deref(), Some("alice"));
        assert_eq!(row.jwt_valid, Some(false));

        assert!(p.get_profile(&creds(GOOD_TOKEN), "u2").await.unwrap().is_none());
        assert!(p.get_profile(&creds("someone-else"), "u1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn get_profile_surfaces_backend_errors() {
        let p = provider().await;

        let err = p.get_profile(&creds(GOOD_TOKEN), "broken").await.unwrap_err();

        assert!(matches!(err, ProviderError::Unexpected { status: 500, ref message } if message.contains("boom")));
    }

    #[tokio::test]
    async fn mark_claim_fresh_patches_flag() {
        let p = provider().await;

        p.mark_claim_fresh(&creds(GOOD_TOKEN), "u1").await.unwrap();

        let err = p.mark_claim_fresh(&creds(GOOD_TOKEN), "u2").await.unwrap_err();
        assert!(matches!(err, ProviderError::Unexpected { status: 400, .. }));
    }

    #[tokio::test]
    async fn sign_out_tolerates_already_invalid_sessions() {
        let p = provider().await;

        p.sign_out(&creds(GOOD_TOKEN)).await.unwrap();
        p.sign_out(&creds("stale-token")).await.unwrap();
        p.sign_out(&Credentials::anonymous()).await.unwrap();

        assert!(p.sign_out(&creds("explode")).await.is_err());
    }

    #[tokio::test]
    async fn sign_in_with_password_returns_session() {
        let p = provider().await;

        let session = p
            .sign_in_with_password("alice@example.com", "Passw0rd!")
            .await
            .unwrap();
        assert_eq!(session.access_token, GOOD_TOKEN);
        assert_eq!(session.refresh_token.as_deref(), Some("refresh-1"));

        let err = p
            .sign_in_with_password("alice@example.com", "wrong")
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::InvalidLogin));
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_transport_error() {
        let cfg = ProviderConfig {
            url: Some("http://127.0.0.1:1".into()),
            anon_key: Some(ANON.into()),
            jwt_secret: None,
            timeout_secs: 2,
        };
        let p = HttpSessionProvider::new(&cfg).unwrap();

        let err = p.get_user(&creds(GOOD_TOKEN)).await.unwrap_err();

        assert!(matches!(err, ProviderError::Transport(_)));
    }

    #[test]
    fn decode_token_verifies_when_secret_configured() {
        use crate::auth::jwt::sign_claims;

        let claims = SessionClaims {
            sub: Some("u1".into()),
            user_role: Some("admin".into()),
            exp: Some(Utc::now().timestamp() + 600),
            email: None,
        };
        let token = sign_claims(&claims, "right-secret");

        let mut cfg = ProviderConfig {
            url: Some("http://localhost".into()),
            anon_key: Some(ANON.into()),
            jwt_secret: Some("right-secret".into()),
            timeout_secs: 1,
        };
        let verifying = HttpSessionProvider::new(&cfg).unwrap();
        assert_eq!(verifying.decode_token(&token).unwrap(), claims);

        cfg.jwt_secret = Some("other-secret".into());
        let wrong = HttpSessionProvider::new(&cfg).unwrap();
        assert!(matches!(wrong.decode_token(&token), Err(ProviderError::Token(_))));

        cfg.jwt_secret = None;
        let unverified = HttpSessionProvider::new(&cfg).unwrap();
        assert_eq!(unverified.decode_token(&token).unwrap(), claims);
    }
}
