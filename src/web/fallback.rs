use askama::Template;
use axum::{http::StatusCode, response::Response};

use crate::web::template::render_template_with_status;

#[derive(Template)]
#[template(
    source = r#"<!doctype html>
<html><head><title>Not found</title></head>
<body><h2>Page not found</h2><p><a href="/">Back to home</a></p></body></html>"#,
    ext = "html"
)]
struct NotFoundTemplate;

/// Final fallback of the router.
///
/// Only reached after the edge gate has let the request through, so an
/// anonymous caller probing unknown protected paths is sent to login rather
/// than learning which paths exist.
pub async fn not_found() -> Response {
    render_template_with_status(NotFoundTemplate, StatusCode::NOT_FOUND)
}
