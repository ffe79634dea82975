//! # Askama Template Rendering Helpers
//!
//! Turns [Askama](https://crates.io/crates/askama) templates into `text/html`
//! responses. A render failure becomes a plain `500 Internal Server Error`.
//!
//! # Examples
//! ```rust
//! use askama::Template;
//! use axum::http::StatusCode;
//! use rbac_gate::web::template::render_template_with_status;
//!
//! #[derive(Template)]
//! #[template(source = "<p>Hello {{ username }}</p>", ext = "html")]
//! struct Hello<'a> {
//!     username: &'a str,
//! }
//!
//! let resp = render_template_with_status(Hello { username: "alice" }, StatusCode::UNAUTHORIZED);
//! assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
//! ```

use askama::Template;
use axum::{
    http::{StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use tracing::error;

pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Renders a template with status `200 OK`.
pub fn render_template<T: Template>(template: T) -> Response {
    render_template_with_status(template, StatusCode::OK)
}

/// Renders a template with a custom status code.
pub fn render_template_with_status<T: Template>(template: T, status: StatusCode) -> Response {
    match template.render() {
        Ok(html) => (status, [(CONTENT_TYPE, HTML_CONTENT_TYPE)], html).into_response(),
        Err(e) => {
            error!(error = %e, "template render failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[derive(Template)]
    #[template(source = "<p>{{ username }} ({{ role }})</p>", ext = "html")]
    struct Greeting<'a> {
        username: &'a str,
        role: &'a str,
    }

    async fn body(resp: Response) -> String {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn renders_html_with_ok_status() {
        let resp = render_template(Greeting { username: "alice", role: "user" });

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[CONTENT_TYPE], HTML_CONTENT_TYPE);
        assert_eq!(body(resp).await, "<p>alice (user)</p>");
    }

    #[tokio::test]
    async fn escapes_interpolated_values() {
        let resp = render_template(Greeting { username: "<b>eve</b>", role: "user" });

        let html = body(resp).await;
        assert!(!html.contains("<b>"));
        assert!(html.contains("&#60;b&#62;eve"));
    }

    #[tokio::test]
    async fn keeps_requested_status() {
        let resp = render_template_with_status(
            Greeting { username: "bob", role: "admin" },
            StatusCode::UNAUTHORIZED,
        );

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert!(body(resp).await.contains("bob (admin)"));
    }
}
