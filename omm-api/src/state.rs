use omm_booking::WizardDeps;

use crate::sessions::SessionRegistry;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub deps: WizardDeps,
    pub sessions: SessionRegistry,
    pub auth: AuthConfig,
}

impl AppState {
    pub fn new(deps: WizardDeps, auth: AuthConfig) -> Self {
        Self {
            deps,
            sessions: SessionRegistry::default(),
            auth,
        }
    }
}
