use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::Store;

/// Shared by every handler: immutable configuration plus repository handles
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Store,
}

impl AppState {
    pub fn new(config: AppConfig, store: Store) -> Self {
        Self {
            config: Arc::new(config),
            store,
        }
    }
}
