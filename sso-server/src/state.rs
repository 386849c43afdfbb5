use auth_identity::{LoginStateService, SessionTokenService};
use auth_oidc::ProviderRegistry;
use crypto::Encryptor;
use database_layer::ProviderStore;
use std::sync::Arc;

/// Shared handler state. Every field is immutable or internally synchronised.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ProviderRegistry>,
    pub sessions: Arc<SessionTokenService>,
    pub login_states: Arc<LoginStateService>,
    pub cipher: Arc<dyn Encryptor>,
    pub store: Arc<dyn ProviderStore>,
}

impl AppState {
    pub fn new(
        registry: ProviderRegistry,
        sessions: SessionTokenService,
        login_states: LoginStateService,
        cipher: Arc<dyn Encryptor>,
        store: Arc<dyn ProviderStore>,
    ) -> Self {
        Self {
            registry: Arc::new(registry),
            sessions: Arc::new(sessions),
            login_states: Arc::new(login_states),
            cipher,
            store,
        }
    }
}
