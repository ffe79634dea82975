use std::sync::Arc;

use anyhow::{Context, bail};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use rbac_gate::config::app::AppConfig;
use rbac_gate::provider::http::HttpSessionProvider;
use rbac_gate::web::{router::build_router, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;
    fmt().with_env_filter(filter).init();

    let cfg = AppConfig::from_env();
    if !cfg.provider.is_valid() {
        bail!("PROVIDER_URL and PROVIDER_ANON_KEY must be set");
    }
    info!(
        app_env = %cfg.app_env,
        provider = ?cfg.provider,
        stale_claims = ?cfg.stale_claims,
        "rbac-gate starting"
    );
    if cfg.is_production() && !cfg.cookie.secure {
        warn!("AUTH_COOKIE_SECURE is off in production; session cookies will travel over plain HTTP");
    }

    let provider = HttpSessionProvider::new(&cfg.provider)?;
    let app = build_router(AppState::new(Arc::new(provider), &cfg));

    let listener = tokio::net::TcpListener::bind(&cfg.http.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", cfg.http.bind_addr))?;
    info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
