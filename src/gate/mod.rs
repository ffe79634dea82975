//! Route gating: a pure decision table plus the two axum layers that
//! enforce it.

pub mod decision;
pub mod layout;
pub mod middleware;
pub mod path;
pub mod state;
