use axum::http::HeaderMap;
use axum_extra::extract::cookie::CookieJar;

use crate::auth::credentials::Credentials;
use crate::auth::resolver::SessionResolver;
use crate::gate::decision::RouteTargets;

/// Shared, read-only state for both gate layers.
///
/// Cloned per request by axum; holds no per-request data and no cache of
/// earlier resolutions.
#[derive(Clone)]
pub struct GateState {
    pub resolver: SessionResolver,
    pub targets: RouteTargets,
    /// Name of the cookie carrying the provider session.
    pub cookie_name: String,
    /// `Secure` flag used when the edge gate rewrites the auth cookie.
    pub cookie_secure: bool,
}

impl GateState {
    pub fn new(resolver: SessionResolver, cookie_name: impl Into<String>) -> Self {
        Self {
            resolver,
            targets: RouteTargets::default(),
            cookie_name: cookie_name.into(),
            cookie_secure: true,
        }
    }

    pub fn with_secure_cookie(mut self, secure: bool) -> Self {
        self.cookie_secure = secure;
        self
    }

    /// Reads the request's credentials from its `Cookie` headers.
    pub fn credentials(&self, headers: &HeaderMap) -> Credentials {
        Credentials::from_cookies(&CookieJar::from_headers(headers), &self.cookie_name)
    }
}
