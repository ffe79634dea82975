//! # Edge middleware (gate layer A)
//!
//! Runs in front of every route, including the fallback.
//!
//! Public paths are let through without touching the provider. Everything
//! else is resolved and checked with [`decide`]. An allowed request is
//! forwarded with its headers and cookies as presented, with one exception:
//! an expired session is refreshed first, and the renewed session replaces
//! the auth cookie both on the forwarded request and on the response.
//!
//! When the session cannot be refreshed, or the resolver signs it out, the
//! auth cookie is cleared on the response.
//!
//! ```rust,ignore
//! let app = Router::new()
//!     .route("/protected", get(protected_page))
//!     .layer(axum::middleware::from_fn_with_state(gate.clone(), route_gate))
//!     .with_state(app_state);
//! ```

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{debug, info, warn};

use crate::auth::credentials::{
    Credentials, clear_session_cookie, replace_session_in_headers, set_session_cookie,
};
use crate::gate::decision::{Decision, Enforcement, decide};
use crate::gate::path::PathClass;
use crate::gate::state::GateState;
use crate::provider::port::{ProviderError, Session};

/// What the response must do with the auth cookie.
enum CookieUpdate {
    Keep,
    Replace(Session),
    Clear,
}

/// Edge gate for every request.
///
/// ## Arguments
/// - `gate`: resolver, redirect targets and auth cookie settings
/// - `req`: the incoming request
/// - `next`: the rest of the router
///
/// ## Returns
/// - the downstream response when [`decide`] allows the request
/// - `307 Temporary Redirect` to the login page or protected home otherwise
/// - `500 Internal Server Error` when resolution fails
///
/// Any `Set-Cookie` for a refreshed or dropped session is attached to all
/// three.
///
/// ## Errors
/// Never fails as a service. A [`ResolveError`](crate::error::resolve::ResolveError)
/// is rendered as the 500 above. A refresh failure other than an expired
/// session is logged and the request continues with the stored cookie.
pub async fn route_gate(State(gate): State<GateState>, mut req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    let class = PathClass::of(&path);

    if class.is_public() {
        return next.run(req).await;
    }

    let jar = CookieJar::from_headers(req.headers());
    let mut creds = gate.credentials(req.headers());
    let mut update = CookieUpdate::Keep;

    match gate.resolver.provider().refresh_session(&creds).await {
        Ok(None) => {}
        Ok(Some(session)) => {
            debug!(path = %path, "refreshed expired session");
            if let Err(e) = replace_session_in_headers(req.headers_mut(), &gate.cookie_name, &session) {
                warn!(error = %e, "could not forward refreshed session");
            }
            creds = Credentials::from_session(session.clone());
            update = CookieUpdate::Replace(session);
        }
        Err(ProviderError::SessionExpired) => {
            info!(path = %path, "session expired and could not be refreshed");
            creds = Credentials::anonymous();
            update = CookieUpdate::Clear;
        }
        Err(e) => warn!(error = %e, "session refresh failed"),
    }

    let response = match gate.resolver.resolve_outcome(&creds).await {
        Ok(resolution) => {
            if resolution.signed_out {
                update = CookieUpdate::Clear;
            }
            let principal = resolution.principal;

            match decide(Enforcement::Middleware, class, principal.as_ref(), &gate.targets) {
                Decision::Allow => next.run(req).await,
                Decision::Redirect(to) => {
                    info!(
                        path = %path,
                        to = %to,
                        authenticated = principal.is_some(),
                        "route gate redirect"
                    );
                    Redirect::temporary(&to).into_response()
                }
            }
        }
        Err(e) => e.into_response(),
    };

    apply_cookie_update(&gate, jar, update, response)
}

fn apply_cookie_update(
    gate: &GateState,
    jar: CookieJar,
    update: CookieUpdate,
    response: Response,
) -> Response {
    let jar = match update {
        CookieUpdate::Keep => return response,
        CookieUpdate::Replace(session) => {
            match set_session_cookie(jar, &gate.cookie_name, &session, gate.cookie_secure) {
                Ok(jar) => jar,
                Err(e) => {
                    warn!(error = %e, "could not write refreshed session cookie");
                    return response;
                }
            }
        }
        CookieUpdate::Clear => clear_session_cookie(jar, &gate.cookie_name),
    };

    (jar, response).into_response()
}
