use askama::Template;
use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
};

use crate::error::resolve::ResolveError;
use crate::gate::decision::LOGIN_PATH;
use crate::web::state::AppState;
use crate::web::template::render_template;

#[derive(Template)]
#[template(
    source = r#"<!doctype html>
<html><head><title>Home</title></head>
<body>
<h2>Welcome</h2>
<ul>
  <li><a href="/auth/login">Sign in</a></li>
  <li><a href="/protected">Protected page</a></li>
  <li><a href="/admin">Admin dashboard</a></li>
</ul>
</body></html>"#,
    ext = "html"
)]
struct HomeTemplate;

#[derive(Template)]
#[template(
    source = r#"<!doctype html>
<html><head><title>Protected</title></head>
<body>
<h2>Hello, {{ username }}</h2>
<p>Signed in as <strong>{{ role }}</strong>{% if let Some(email) = email %} ({{ email }}){% endif %}.</p>
{% if is_admin %}<p><a href="/admin">Admin dashboard</a></p>{% endif %}
<form method="post" action="/auth/logout"><button type="submit">Sign out</button></form>
</body></html>"#,
    ext = "html"
)]
struct ProtectedTemplate<'a> {
    username: &'a str,
    role: &'a str,
    email: Option<&'a str>,
    is_admin: bool,
}

#[derive(Template)]
#[template(
    source = r#"<!doctype html>
<html><head><title>Admin</title></head>
<body>
<h2>Admin Dashboard</h2>
<p>Only administrators can see this page.</p>
<p><a href="/protected">Back</a></p>
</body></html>"#,
    ext = "html"
)]
struct AdminTemplate;

pub async fn home() -> Response {
    render_template(HomeTemplate)
}

/// `GET /protected`
///
/// The edge gate has already turned anonymous callers away; the principal is
/// resolved again here only to greet it.
pub async fn protected_home(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, ResolveError> {
    let creds = state.gate.credentials(&headers);

    let Some(principal) = state.gate.resolver.resolve(&creds).await? else {
        return Ok(Redirect::temporary(LOGIN_PATH).into_response());
    };

    Ok(render_template(ProtectedTemplate {
        username: principal.username(),
        role: principal.role.as_str(),
        email: principal.email.as_deref(),
        is_admin: principal.is_admin(),
    }))
}

pub async fn admin_dashboard() -> Response {
    render_template(AdminTemplate)
}
