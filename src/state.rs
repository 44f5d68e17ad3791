use crate::config::Config;
use crate::store::AnyStore;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<AnyStore>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: impl Into<AnyStore>, config: Config) -> Self {
        Self {
            store: Arc::new(store.into()),
            config: Arc::new(config),
        }
    }
}
