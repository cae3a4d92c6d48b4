//! Storage configuration
//!
//! Two values select the backend: the hosted project URL and its API key.
//! When both are present the hosted store is used, otherwise the local
//! key-value store. The choice is made once and passed to constructors
//! explicitly.

use serde::{Deserialize, Serialize};
use std::{fmt::Display, path::PathBuf, sync::Arc};

use crate::hosted::HostedStore;
use crate::local::LocalStore;
use crate::memory::InMemoryStore;
use crate::traits::{StorageBackend, StorageResult};

pub const BACKEND_URL_ENV: &str = "VITRINE_BACKEND_URL";
pub const BACKEND_KEY_ENV: &str = "VITRINE_BACKEND_KEY";
pub const DATA_DIR_ENV: &str = "VITRINE_DATA_DIR";
pub const PROVIDER_ENV: &str = "VITRINE_STORAGE_PROVIDER";

const DEFAULT_DATA_DIR: &str = "./data";

/// Storage provider type
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageProvider {
    Hosted,
    Local,
    Memory,
}

impl Display for StorageProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageProvider::Hosted => write!(f, "hosted"),
            StorageProvider::Local => write!(f, "local"),
            StorageProvider::Memory => write!(f, "memory"),
        }
    }
}

impl std::str::FromStr for StorageProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hosted" | "remote" | "supabase" => Ok(StorageProvider::Hosted),
            "local" | "file" | "localstorage" => Ok(StorageProvider::Local),
            "memory" | "mem" => Ok(StorageProvider::Memory),
            _ => Err(format!("Unknown storage provider: {}", s)),
        }
    }
}

/// Hosted backend-as-a-service project
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HostedConfig {
    pub url: String,
    pub api_key: String,
}

impl HostedConfig {
    /// `None` unless both the URL and the key are set and non-empty
    pub fn from_env() -> Option<Self> {
        let url = non_empty_var(BACKEND_URL_ENV)?;
        let api_key = non_empty_var(BACKEND_KEY_ENV)?;
        Some(HostedConfig { url, api_key })
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LocalConfig {
    pub dir: PathBuf,
}

impl LocalConfig {
    pub fn from_env() -> Self {
        LocalConfig {
            dir: non_empty_var(DATA_DIR_ENV)
                .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string())
                .into(),
        }
    }
}

/// Unified storage configuration
#[derive(Clone, Debug)]
pub enum StorageConfig {
    Hosted(HostedConfig),
    Local(LocalConfig),
    Memory,
}

impl StorageConfig {
    /// Hosted when both backend values are present, local otherwise.
    /// `VITRINE_STORAGE_PROVIDER` forces a provider.
    pub fn from_env() -> Result<Self, String> {
        match non_empty_var(PROVIDER_ENV) {
            Some(provider) => Self::from_env_with_provider(provider.parse()?),
            None => Ok(match HostedConfig::from_env() {
                Some(hosted) => StorageConfig::Hosted(hosted),
                None => StorageConfig::Local(LocalConfig::from_env()),
            }),
        }
    }

    /// Load storage config from environment with explicit provider
    pub fn from_env_with_provider(provider: StorageProvider) -> Result<Self, String> {
        match provider {
            StorageProvider::Hosted => HostedConfig::from_env()
                .map(StorageConfig::Hosted)
                .ok_or_else(|| {
                    format!("{BACKEND_URL_ENV} and {BACKEND_KEY_ENV} must be set for hosted storage")
                }),
            StorageProvider::Local => Ok(StorageConfig::Local(LocalConfig::from_env())),
            StorageProvider::Memory => Ok(StorageConfig::Memory),
        }
    }

    /// Get the provider type
    pub fn provider(&self) -> StorageProvider {
        match self {
            StorageConfig::Hosted(_) => StorageProvider::Hosted,
            StorageConfig::Local(_) => StorageProvider::Local,
            StorageConfig::Memory => StorageProvider::Memory,
        }
    }

    pub fn hosted(&self) -> Option<&HostedConfig> {
        match self {
            StorageConfig::Hosted(hosted) => Some(hosted),
            _ => None,
        }
    }
}

/// Build the storage backend for a configuration
pub fn create_backend(config: &StorageConfig) -> StorageResult<Arc<dyn StorageBackend>> {
    let backend: Arc<dyn StorageBackend> = match config {
        StorageConfig::Hosted(hosted) => Arc::new(HostedStore::new(hosted)),
        StorageConfig::Local(local) => Arc::new(LocalStore::new(&local.dir)?),
        StorageConfig::Memory => Arc::new(InMemoryStore::new()),
    };
    tracing::info!(backend = backend.name(), "Storage backend ready");
    Ok(backend)
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
