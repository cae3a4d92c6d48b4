use std::env;
use std::time::Duration;
use vitrine_storage::{StorageConfig, StorageProvider};

const DEFAULT_PORT: &str = "8080";
const DEFAULT_SESSION_TTL_HOURS: u64 = 12;

#[derive(Clone, Debug)]
pub struct AdminSeed {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub storage_config: StorageConfig,
    /// Signs local session tokens; a random per-process secret when unset
    pub session_secret: Option<String>,
    pub session_ttl: Duration,
    pub admin_seed: Option<AdminSeed>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let storage_config = StorageConfig::from_env().map_err(ConfigError::Storage)?;

        let port = env::var("PORT")
            .unwrap_or_else(|_| DEFAULT_PORT.to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("PORT".to_string()))?;

        let session_ttl_hours = match non_empty("VITRINE_SESSION_TTL_HOURS") {
            Some(hours) => hours
                .parse::<u64>()
                .ok()
                .filter(|h| *h > 0)
                .ok_or_else(|| ConfigError::InvalidValue("VITRINE_SESSION_TTL_HOURS".to_string()))?,
            None => DEFAULT_SESSION_TTL_HOURS,
        };

        let admin_seed = match (
            non_empty("VITRINE_ADMIN_EMAIL"),
            non_empty("VITRINE_ADMIN_PASSWORD"),
        ) {
            (Some(email), Some(password)) => Some(AdminSeed { email, password }),
            (Some(_), None) => return Err(ConfigError::MissingVar("VITRINE_ADMIN_PASSWORD")),
            _ => None,
        };

        Ok(Config {
            port,
            storage_config,
            session_secret: non_empty("VITRINE_SESSION_SECRET"),
            session_ttl: Duration::from_secs(session_ttl_hours * 60 * 60),
            admin_seed,
        })
    }

    pub fn provider(&self) -> StorageProvider {
        self.storage_config.provider()
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[derive(Debug)]
pub enum ConfigError {
    MissingVar(&'static str),
    InvalidValue(String),
    Storage(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::MissingVar(var) => write!(f, "Missing environment variable: {}", var),
            ConfigError::InvalidValue(var) => write!(f, "Invalid value for: {}", var),
            ConfigError::Storage(msg) => write!(f, "Storage config error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
