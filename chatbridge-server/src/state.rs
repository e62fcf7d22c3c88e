use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use chatbridge_auth::{InMemoryUserStore, TwoFactorService, UserStore};
use chatbridge_core::ChatbridgeError;
use chatbridge_llm::ProviderRegistry;

use crate::ServerConfig;

#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub registry: Arc<ProviderRegistry>,
    pub two_factor: TwoFactorService,
    /// Cancelled on shutdown; in-flight chat streams stop with it.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(config: ServerConfig, registry: ProviderRegistry, users: Arc<dyn UserStore>) -> Self {
        Self {
            config: Arc::new(config),
            registry: Arc::new(registry),
            two_factor: TwoFactorService::new(users),
            shutdown: CancellationToken::new(),
        }
    }

    /// Providers from `config`, users kept in memory.
    pub fn from_config(config: ServerConfig) -> Result<Self, ChatbridgeError> {
        let registry = config.build_registry()?;
        Ok(Self::new(config, registry, Arc::new(InMemoryUserStore::new())))
    }

    pub fn with_two_factor(mut self, service: TwoFactorService) -> Self {
        self.two_factor = service;
        self
    }
}
