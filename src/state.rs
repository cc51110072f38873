use std::sync::Arc;

use super::{
    config::Config,
    database::{DocumentStore, MongoStore},
};

/// Shared per-process state: the environment snapshot and the one store
/// handle, never reassigned after startup.
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn DocumentStore>,
}

impl AppState {
    pub async fn new() -> Arc<Self> {
        let config = Config::load();

        let store = Arc::new(MongoStore::init(&config).await);

        Arc::new(Self { config, store })
    }

    #[cfg(test)]
    pub fn with_store(config: Config, store: Arc<dyn DocumentStore>) -> Arc<Self> {
        Arc::new(Self { config, store })
    }
}
