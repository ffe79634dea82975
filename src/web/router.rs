//! # Application Router
//!
//! Assembles the pages, the sign-in/out handlers and both gate layers:
//!
//! - `route_gate` wraps the whole router, fallback included.
//! - `admin_layout` is a `route_layer` on the `/admin` subtree only.
//! - `TraceLayer` sits outermost so redirects and 500s are traced too.

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::gate::{layout::admin_layout, middleware::route_gate};
use crate::web::{auth, fallback, pages, state::AppState};

pub fn build_router(state: AppState) -> Router {
    let admin = Router::new()
        .route("/", get(pages::admin_dashboard))
        .route_layer(from_fn_with_state(state.gate.clone(), admin_layout));

    Router::new()
        .route("/", get(pages::home))
        .route("/auth/login", get(auth::login_page).post(auth::sign_in))
        .route("/auth/logout", post(auth::sign_out))
        .route("/protected", get(pages::protected_home))
        .nest("/admin", admin)
        .fallback(fallback::not_found)
        .layer(from_fn_with_state(state.gate.clone(), route_gate))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
