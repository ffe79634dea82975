use std::sync::Arc;

use crate::auth::resolver::SessionResolver;
use crate::config::app::AppConfig;
use crate::gate::state::GateState;
use crate::provider::port::SessionProvider;

/// State shared by the page handlers.
#[derive(Clone)]
pub struct AppState {
    pub gate: GateState,
}

impl AppState {
    /// Wires a provider into the resolver and both gate layers, following
    /// the cookie and stale-claim settings of `cfg`.
    pub fn new(provider: Arc<dyn SessionProvider>, cfg: &AppConfig) -> Self {
        let resolver = SessionResolver::new(provider).with_stale_claim_policy(cfg.stale_claims);

        Self {
            gate: GateState::new(resolver, cfg.cookie.name.clone())
                .with_secure_cookie(cfg.cookie.secure),
        }
    }

    pub fn provider(&self) -> &Arc<dyn SessionProvider> {
        self.gate.resolver.provider()
    }

    pub fn cookie_name(&self) -> &str {
        &self.gate.cookie_name
    }

    pub fn cookie_secure(&self) -> bool {
        self.gate.cookie_secure
    }
}
