//! Sign-in and sign-out handlers.
//!
//! Both live under `/auth/*`, which the edge gate treats as public, so they
//! never trigger a session resolution of their own.

use askama::Template;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::auth::credentials::{Credentials, clear_session_cookie, set_session_cookie};
use crate::gate::decision::{LOGIN_PATH, PROTECTED_HOME_PATH};
use crate::provider::port::ProviderError;
use crate::web::state::AppState;
use crate::web::template::{render_template, render_template_with_status};

#[derive(Template)]
#[template(
    source = r#"<!doctype html>
<html><head><title>Sign in</title></head>
<body>
<h2>Sign in</h2>
{% if let Some(message) = error %}<p role="alert">{{ message }}</p>{% endif %}
<form method="post" action="/auth/login">
  <label>Email <input type="email" name="email" value="{{ email }}" required></label>
  <label>Password <input type="password" name="password" required></label>
  <button type="submit">Sign in</button>
</form>
</body></html>"#,
    ext = "html"
)]
struct LoginTemplate<'a> {
    email: &'a str,
    error: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

pub async fn login_page() -> Response {
    render_template(LoginTemplate {
        email: "",
        error: None,
    })
}

/// `POST /auth/login`
///
/// Stores the new session in the auth cookie and sends the browser to the
/// protected home. Bad credentials re-render the form with `401`.
pub async fn sign_in(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    let email = form.email.trim();

    let session = match state
        .provider()
        .sign_in_with_password(email, &form.password)
        .await
    {
        Ok(session) => session,
        Err(ProviderError::InvalidLogin) => {
            info!(email = %email, "sign-in rejected");
            return login_failed(email, "Invalid login credentials", StatusCode::UNAUTHORIZED);
        }
        Err(e) => {
            warn!(error = %e, "sign-in failed");
            return login_failed(
                email,
                "Sign-in is unavailable, please try again",
                StatusCode::BAD_GATEWAY,
            );
        }
    };

    match set_session_cookie(jar, state.cookie_name(), &session, state.cookie_secure()) {
        Ok(jar) => {
            info!(email = %email, "signed in");
            (jar, Redirect::to(PROTECTED_HOME_PATH)).into_response()
        }
        Err(e) => {
            error!(error = %e, "failed to write auth cookie");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// `POST /auth/logout`
///
/// The cookie is cleared even if the provider call fails; a session the
/// browser no longer presents is as good as gone for this app.
pub async fn sign_out(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Redirect) {
    let creds = Credentials::from_cookies(&jar, state.cookie_name());

    if creds.session().is_some() {
        match state.provider().sign_out(&creds).await {
            Ok(()) => info!("signed out"),
            Err(e) => warn!(error = %e, "provider sign-out failed"),
        }
    }

    (clear_session_cookie(jar, state.cookie_name()), Redirect::to(LOGIN_PATH))
}

fn login_failed(email: &str, message: &str, status: StatusCode) -> Response {
    render_template_with_status(
        LoginTemplate {
            email,
            error: Some(message),
        },
        status,
    )
}
