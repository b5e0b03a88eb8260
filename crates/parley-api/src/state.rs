//! Application state shared by the HTTP handlers.
//!
//! Handlers are generic over the store so router tests can run against
//! `InMemoryChatStore`; the binary pins the state to `SqliteChatStore`.

use std::sync::Arc;

use parley_core::repository::store::ChatStore;
use parley_core::service::messenger::{MessengerService, ServiceConfig};
use parley_infra::sqlite::pool::DatabasePool;
use parley_infra::sqlite::store::SqliteChatStore;
use parley_types::config::AppConfig;

pub type ConcreteMessengerService = MessengerService<SqliteChatStore>;

pub struct AppState<S: ChatStore> {
    pub service: Arc<MessengerService<S>>,
}

impl<S: ChatStore> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
        }
    }
}

impl<S: ChatStore> AppState<S> {
    pub fn new(service: MessengerService<S>) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

impl AppState<SqliteChatStore> {
    /// Open the configured database and wire the messenger service.
    pub async fn init(config: &AppConfig) -> anyhow::Result<Self> {
        let pool = DatabasePool::connect(&config.sqlite).await?;
        tracing::info!(path = %config.sqlite.path, "database ready");

        let service: ConcreteMessengerService = MessengerService::new(
            SqliteChatStore::new(pool),
            ServiceConfig::from(&config.server),
        );
        Ok(Self::new(service))
    }
}
