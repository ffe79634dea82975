//! # Admin layout guard (gate layer B)
//!
//! Wraps the admin subtree as a `route_layer`, so it only runs for requests
//! that actually render an admin page.
//!
//! It resolves the principal again on its own instead of trusting anything
//! the edge middleware may have decided. If the middleware is misconfigured
//! or its matcher misses a path, this guard still holds.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::info;

use crate::gate::decision::{Decision, Enforcement, decide};
use crate::gate::path::PathClass;
use crate::gate::state::GateState;

pub async fn admin_layout(State(gate): State<GateState>, req: Request, next: Next) -> Response {
    let creds = gate.credentials(req.headers());
    let principal = match gate.resolver.resolve(&creds).await {
        Ok(principal) => principal,
        Err(e) => return e.into_response(),
    };

    match decide(
        Enforcement::AdminLayout,
        PathClass::Admin,
        principal.as_ref(),
        &gate.targets,
    ) {
        Decision::Allow => next.run(req).await,
        Decision::Redirect(to) => {
            info!(
                has_user = principal.is_some(),
                role = principal.as_ref().map(|p| p.role.as_str()),
                "admin access denied"
            );
            Redirect::temporary(&to).into_response()
        }
    }
}
