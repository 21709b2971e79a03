use std::env;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Which `DocumentStore` implementation the API should connect to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Supabase,
    Memory,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_service_key: String,
    pub supabase_jwt_secret: String,
    pub store_backend: StoreBackend,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let mut config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_service_key: env::var("SUPABASE_SERVICE_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_SERVICE_KEY not set, using empty value");
                    String::new()
                }),
            supabase_jwt_secret: env::var("SUPABASE_JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_JWT_SECRET not set, using empty value");
                    String::new()
                }),
            store_backend: StoreBackend::Memory,
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
        };

        config.store_backend = match env::var("DATA_STORE").ok().as_deref() {
            Some("supabase") => StoreBackend::Supabase,
            Some("memory") => StoreBackend::Memory,
            Some(other) => {
                warn!("Unknown DATA_STORE '{}', falling back to default", other);
                config.default_backend()
            }
            None => config.default_backend(),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_jwt_secret.is_empty() && match self.store_backend {
            StoreBackend::Supabase => self.is_store_configured(),
            StoreBackend::Memory => true,
        }
    }

    pub fn is_store_configured(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_service_key.is_empty()
    }

    fn default_backend(&self) -> StoreBackend {
        if self.is_store_configured() {
            StoreBackend::Supabase
        } else {
            StoreBackend::Memory
        }
    }
}
