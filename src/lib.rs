//! # rbac_gate
//!
//! Session-to-role resolution and route gating for an axum web app backed by
//! a hosted auth/database provider.
//!
//! - `auth` resolves request credentials into an [`AuthenticatedPrincipal`]
//!   (identity + role claim + profile).
//! - `gate` decides, per path class, whether a request is let through or
//!   redirected, and enforces that decision twice: an edge middleware and an
//!   admin layout guard.
//! - `provider` is the port to the identity/database backend, with an HTTP
//!   adapter.
//!
//! ## Example usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use rbac_gate::config::app::AppConfig;
//! use rbac_gate::provider::http::HttpSessionProvider;
//! use rbac_gate::web::{router::build_router, state::AppState};
//!
//! # fn main() -> rbac_gate::anyhow::Result<()> {
//! let cfg = AppConfig::from_env();
//! let provider = HttpSessionProvider::new(&cfg.provider)?;
//! let app = build_router(AppState::new(Arc::new(provider), &cfg));
//! # Ok(())
//! # }
//! ```
//!
//! [`AuthenticatedPrincipal`]: auth::principal::AuthenticatedPrincipal

// ===============================
// Re-exports of external crates
// ===============================

pub use anyhow;
pub use askama;
pub use axum;
pub use axum_extra;
pub use base64;
pub use chrono;
pub use dotenvy;
pub use jsonwebtoken;
pub use reqwest;
pub use serde;
pub use serde_json;
pub use tokio;
pub use tower;
pub use tower_http;

// ===============================
// Public modules
// ===============================
pub mod auth;
pub mod config;
pub mod error;
pub mod gate;
pub mod provider;
pub mod time;
pub mod web;
