use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use shared_config::{AppConfig, StoreBackend};

use crate::memory::MemoryStore;
use crate::store::DocumentStore;
use crate::supabase::SupabaseClient;

/// Router state shared by every cell.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn DocumentStore>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            config: Arc::new(config),
            store,
        }
    }
}

/// Opens the store selected by `config.store_backend`.
pub async fn connect_store(config: &AppConfig) -> Result<Arc<dyn DocumentStore>> {
    match config.store_backend {
        StoreBackend::Supabase => {
            info!("Connecting to Supabase store at {}", config.supabase_url);
            Ok(Arc::new(SupabaseClient::connect(config).await?))
        }
        StoreBackend::Memory => {
            info!("Using in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
